//! Conventions every migration must follow. Each query selects the
//! violations, so a passing test returns no rows.

use curator_core::status::{ReviewStatus, ScanStatus};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn ids_are_bigint_or_smallint(pool: PgPool) {
    let offenders: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name::TEXT, data_type::TEXT
         FROM information_schema.columns
         WHERE table_schema = 'public'
           AND column_name = 'id'
           AND table_name <> '_sqlx_migrations'
           AND data_type NOT IN ('bigint', 'smallint')",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(offenders.is_empty(), "non-integer ids: {offenders:?}");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn every_table_has_timestamptz_audit_columns(pool: PgPool) {
    let missing: Vec<(String, String)> = sqlx::query_as(
        "SELECT t.table_name::TEXT, wanted.col
         FROM information_schema.tables t
         CROSS JOIN (VALUES ('created_at'), ('updated_at')) AS wanted(col)
         LEFT JOIN information_schema.columns c
           ON c.table_schema = t.table_schema
          AND c.table_name = t.table_name
          AND c.column_name = wanted.col
          AND c.data_type = 'timestamp with time zone'
         WHERE t.table_schema = 'public'
           AND t.table_type = 'BASE TABLE'
           AND t.table_name <> '_sqlx_migrations'
           AND c.column_name IS NULL",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(missing.is_empty(), "missing audit columns: {missing:?}");
}

/// A foreign key column must lead some index on its table.
#[sqlx::test(migrations = "../../db/migrations")]
async fn foreign_keys_are_indexed(pool: PgPool) {
    let unindexed: Vec<(String, String)> = sqlx::query_as(
        "SELECT DISTINCT kcu.table_name::TEXT, kcu.column_name::TEXT
         FROM information_schema.table_constraints tc
         JOIN information_schema.key_column_usage kcu
           ON kcu.constraint_name = tc.constraint_name
          AND kcu.table_schema = tc.table_schema
         WHERE tc.constraint_type = 'FOREIGN KEY'
           AND tc.table_schema = 'public'
           AND NOT EXISTS (
               SELECT 1 FROM pg_indexes i
               WHERE i.schemaname = 'public'
                 AND i.tablename = kcu.table_name
                 AND i.indexdef LIKE '%(' || kcu.column_name || '%'
           )",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(unindexed.is_empty(), "unindexed foreign keys: {unindexed:?}");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn status_lookups_match_core_enums(pool: PgPool) {
    let scans: Vec<(i16, String)> =
        sqlx::query_as("SELECT id, name FROM maintenance_scan_statuses ORDER BY id")
            .fetch_all(&pool)
            .await
            .unwrap();
    let expected: Vec<(i16, String)> = ScanStatus::ALL
        .iter()
        .map(|s| (s.id(), s.as_str().to_string()))
        .collect();
    assert_eq!(scans, expected);

    let reviews: Vec<(i16, String)> =
        sqlx::query_as("SELECT id, name FROM candidate_review_statuses ORDER BY id")
            .fetch_all(&pool)
            .await
            .unwrap();
    let expected: Vec<(i16, String)> = ReviewStatus::ALL
        .iter()
        .map(|s| (s.id(), s.as_str().to_string()))
        .collect();
    assert_eq!(reviews, expected);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_check_succeeds(pool: PgPool) {
    curator_db::health_check(&pool).await.unwrap();
}
