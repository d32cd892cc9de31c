//! HTTP-level integration tests for user marks, watch intents and the admin
//! feedback summary.

mod common;

use axum::http::StatusCode;
use common::{
    admin_token, body_json, build_test_app, get, get_auth, post_json_auth, put_json_auth,
    user_token,
};
use serde_json::json;
use sqlx::PgPool;

async fn mark(app: axum::Router, token: &str, key: &str, mark_type: &str) {
    let response = post_json_auth(
        app,
        "/api/v1/user/marks",
        json!({ "media_item_key": key, "media_type": "MOVIE", "mark_type": mark_type }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_mark_defaults_source(pool: PgPool) {
    let app = build_test_app(pool);
    let token = user_token();

    let response = post_json_auth(
        app.clone(),
        "/api/v1/user/marks",
        json!({
            "media_item_key": "movie-1",
            "media_type": "MOVIE",
            "mark_type": "NOT_INTERESTED",
            "note": "Saw the trailer"
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["user_id"], common::USER_ID);
    assert_eq!(json["data"]["marked_via"], "web");
    assert_eq!(json["data"]["mark_type"], "NOT_INTERESTED");

    let response = get_auth(app, "/api/v1/user/marks", &token).await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_marks_are_listed_per_user(pool: PgPool) {
    let app = build_test_app(pool);
    mark(app.clone(), &user_token(), "movie-1", "POOR_QUALITY").await;
    mark(app.clone(), &admin_token(), "movie-2", "WRONG_VERSION").await;

    let response = get_auth(app, "/api/v1/user/marks", &user_token()).await;
    let json = body_json(response).await;
    let marks = json["data"].as_array().unwrap();
    assert_eq!(marks.len(), 1);
    assert_eq!(marks[0]["media_item_key"], "movie-1");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_marks_are_rejected(pool: PgPool) {
    let app = build_test_app(pool);
    let token = user_token();

    let bad_source = json!({
        "media_item_key": "movie-1", "media_type": "MOVIE",
        "mark_type": "NOT_INTERESTED", "marked_via": "carrier-pigeon"
    });
    let long_note = json!({
        "media_item_key": "movie-1", "media_type": "MOVIE",
        "mark_type": "NOT_INTERESTED", "note": "x".repeat(2_001)
    });
    let empty_key = json!({
        "media_item_key": "", "media_type": "MOVIE", "mark_type": "NOT_INTERESTED"
    });

    for body in [bad_source, long_note, empty_key] {
        let response = post_json_auth(app.clone(), "/api/v1/user/marks", body, &token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }

    // Unknown enum values are rejected by the JSON extractor.
    let response = post_json_auth(
        app,
        "/api/v1/user/marks",
        json!({ "media_item_key": "m", "media_type": "MOVIE", "mark_type": "MEH" }),
        &token,
    )
    .await;
    assert!(response.status().is_client_error());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_routes_require_token(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get(app.clone(), "/api/v1/user/marks").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let response = get(app, "/api/v1/user/intents").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_intent_upsert_replaces_existing(pool: PgPool) {
    let app = build_test_app(pool);
    let token = user_token();

    let response = put_json_auth(
        app.clone(),
        "/api/v1/user/intents",
        json!({
            "media_item_key": "show-1", "media_type": "TV_SERIES",
            "intent_type": "PLAN_TO_WATCH", "priority": 3
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let first = body_json(response).await;

    let response = put_json_auth(
        app.clone(),
        "/api/v1/user/intents",
        json!({
            "media_item_key": "show-1", "media_type": "TV_SERIES",
            "intent_type": "WATCHING", "current_season": 2, "current_episode": 5
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let second = body_json(response).await;
    assert_eq!(second["data"]["id"], first["data"]["id"]);
    assert_eq!(second["data"]["intent_type"], "WATCHING");
    assert_eq!(second["data"]["current_season"], 2);

    let response = get_auth(app, "/api/v1/user/intents", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_intents_are_rejected(pool: PgPool) {
    let app = build_test_app(pool);
    let token = user_token();

    for body in [
        json!({
            "media_item_key": "show-1", "media_type": "TV_SERIES",
            "intent_type": "WATCHING", "priority": 11
        }),
        json!({
            "media_item_key": "show-1", "media_type": "TV_SERIES",
            "intent_type": "WATCHING", "priority": -11
        }),
        json!({
            "media_item_key": "show-1", "media_type": "TV_SERIES",
            "intent_type": "WATCHING", "current_episode": -1
        }),
    ] {
        let response = put_json_auth(app.clone(), "/api/v1/user/intents", body, &token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

/// Weighted marks put an item up for review until someone asks to keep it.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_summary_scores_and_keep_forever(pool: PgPool) {
    let app = build_test_app(pool);
    let user = user_token();
    let admin = admin_token();

    mark(app.clone(), &user, "movie-1", "NOT_INTERESTED").await;
    mark(app.clone(), &admin, "movie-1", "POOR_QUALITY").await;
    mark(app.clone(), &user, "movie-2", "REWATCH_CANDIDATE").await;

    let response = get_auth(app.clone(), "/api/v1/admin/feedback/summary", &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let summaries = json["data"].as_array().unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0]["media_item_key"], "movie-1");
    assert_eq!(summaries[0]["deletion_score"], 9);
    assert_eq!(summaries[0]["tier"], "review_needed");
    assert_eq!(summaries[0]["total_marks"], 2);
    assert_eq!(summaries[0]["mark_counts"]["NOT_INTERESTED"], 1);
    assert_eq!(summaries[1]["deletion_score"], -3);

    mark(app.clone(), &user, "movie-1", "KEEP_FOREVER").await;

    let response = get_auth(app, "/api/v1/admin/feedback/summary", &admin).await;
    let json = body_json(response).await;
    let movie_1 = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["media_item_key"] == "movie-1")
        .unwrap()
        .clone();
    assert_eq!(movie_1["deletion_score"], "NEVER_DELETE");
    assert_eq!(movie_1["tier"], "keep");
    // Never-delete items sort last.
    assert_eq!(json["data"][1]["media_item_key"], "movie-1");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_media_details_count_active_intents(pool: PgPool) {
    let app = build_test_app(pool);
    let user = user_token();
    let admin = admin_token();

    mark(app.clone(), &user, "movie-1", "FINISHED_WATCHING").await;
    for (token, intent) in [(&user, "PLAN_TO_WATCH"), (&admin, "DROPPED")] {
        let response = put_json_auth(
            app.clone(),
            "/api/v1/user/intents",
            json!({ "media_item_key": "movie-1", "media_type": "MOVIE", "intent_type": intent }),
            token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = get_auth(app.clone(), "/api/v1/admin/feedback/media/movie-1", &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["marks"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"]["intents"].as_array().unwrap().len(), 2);
    assert_eq!(json["data"]["summary"]["active_intent_count"], 1);
    assert_eq!(json["data"]["summary"]["deletion_score"], 0);

    // An item nobody touched still gets an empty summary.
    let response = get_auth(app.clone(), "/api/v1/admin/feedback/media/unknown", &admin).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["summary"]["total_marks"], 0);
    assert_eq!(json["data"]["summary"]["tier"], "keep");

    let response = get_auth(app, "/api/v1/admin/feedback/summary", &user).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
