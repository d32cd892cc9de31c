//! Scan executor.
//!
//! A scan moves PENDING -> RUNNING -> {COMPLETED, FAILED, CANCELLED}. The
//! executor pages through the catalog for the rule's media type, evaluates
//! each page on a bounded pool of blocking tasks, then records the page's
//! candidates and counters in one transaction. Recording only succeeds while
//! the scan is RUNNING, so a cancelled scan stops at the next page boundary
//! and keeps no candidates from the page in flight. A completed AUTO_DELETE
//! scan sends its approved candidates to the deletion executor.

use std::sync::Arc;

use chrono::Utc;
use curator_core::catalog::{AdapterError, MediaItemSnapshot};
use curator_core::criteria::{evaluate::evaluate, Criteria};
use curator_core::error::CoreError;
use curator_core::media::ActionType;
use curator_core::review::initial_status;
use curator_core::scan::{truncate_error_message, FlaggedItem, ScanTally};
use curator_core::status::ScanStatus;
use curator_core::types::{DbId, Timestamp};
use curator_db::models::maintenance_candidate::NewCandidate;
use curator_db::models::maintenance_rule::MaintenanceRule;
use curator_db::models::maintenance_scan::MaintenanceScan;
use curator_db::repositories::maintenance_scan_repo::ACTIVE_SCAN_CONSTRAINT;
use curator_db::repositories::{MaintenanceRuleRepo, MaintenanceScanRepo};
use futures::{StreamExt, TryStreamExt};

use crate::engine::review;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Reasons a running scan ends in FAILED. The display text is stored on the
/// scan row.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Rule cannot be evaluated: {0}")]
    Rule(#[from] CoreError),

    #[error("Catalog request failed: {0}")]
    Catalog(#[from] AdapterError),

    #[error("Catalog request timed out after {0}s")]
    CatalogTimeout(u64),

    #[error("Evaluation worker failed: {0}")]
    Worker(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create a PENDING scan for the rule, unless it already has an active one.
///
/// Returns the rule alongside the new scan so callers can hand both to
/// [`run_scan`].
pub async fn trigger_scan(
    state: &AppState,
    rule_id: DbId,
    triggered_by: Option<DbId>,
) -> AppResult<(MaintenanceRule, MaintenanceScan)> {
    let rule = MaintenanceRuleRepo::find_by_id(&state.pool, rule_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "MaintenanceRule",
            id: rule_id,
        })?;

    if !rule.enabled {
        return Err(CoreError::Validation(format!(
            "Rule {rule_id} is disabled and cannot be scanned"
        ))
        .into());
    }

    let scan = match MaintenanceScanRepo::create_if_idle(&state.pool, rule_id, triggered_by).await
    {
        Ok(Some(scan)) => scan,
        Ok(None) => return Err(already_active(rule_id)),
        // Lost the race against a concurrent insert.
        Err(sqlx::Error::Database(ref db_err))
            if db_err.constraint() == Some(ACTIVE_SCAN_CONSTRAINT) =>
        {
            return Err(already_active(rule_id));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(rule_id, scan_id = scan.id, ?triggered_by, "Scan created");
    Ok((rule, scan))
}

fn already_active(rule_id: DbId) -> AppError {
    CoreError::Conflict(format!("Rule {rule_id} already has an active scan")).into()
}

/// Run a triggered scan on the shared task tracker and return immediately.
pub fn spawn_scan(state: &AppState, rule: MaintenanceRule, scan_id: DbId) {
    let task_state = state.clone();
    state.scan_tasks.spawn(async move {
        if let Err(e) = run_scan(&task_state, &rule, scan_id).await {
            tracing::error!(error = %e, rule_id = rule.id, scan_id, "Scan task failed");
        }
    });
}

/// Drive a PENDING scan to a terminal state and return the final row.
///
/// Evaluation failures are recorded on the scan as FAILED; only errors while
/// recording that outcome are returned. When an AUTO_DELETE scan completes,
/// its approved candidates are deleted before this returns.
pub async fn run_scan(
    state: &AppState,
    rule: &MaintenanceRule,
    scan_id: DbId,
) -> AppResult<MaintenanceScan> {
    match scan_pages(state, rule, scan_id).await {
        Ok(Some(progress)) => {
            let completed = MaintenanceScanRepo::complete(
                &state.pool,
                scan_id,
                progress.items_scanned,
                progress.items_flagged,
            )
            .await?;
            if completed.is_some() {
                tracing::info!(
                    rule_id = rule.id,
                    scan_id,
                    items_scanned = progress.items_scanned,
                    items_flagged = progress.items_flagged,
                    "Scan completed",
                );
            } else {
                tracing::info!(rule_id = rule.id, scan_id, "Scan stopped before completion");
            }
        }
        Ok(None) => {
            tracing::info!(rule_id = rule.id, scan_id, "Scan no longer running, stopped");
        }
        Err(e) => {
            tracing::error!(error = %e, rule_id = rule.id, scan_id, "Scan failed");
            let message = truncate_error_message(&e.to_string());
            MaintenanceScanRepo::fail(&state.pool, scan_id, &message).await?;
        }
    }

    let finished = MaintenanceScanRepo::find_by_id(&state.pool, scan_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "MaintenanceScan",
            id: scan_id,
        })?;

    if finished.status() == Some(ScanStatus::Completed)
        && rule.action()? == ActionType::AutoDelete
    {
        if let Err(e) = review::delete_approved_for_scan(state, scan_id).await {
            tracing::error!(error = %e, rule_id = rule.id, scan_id, "Auto-delete pass failed");
        }
    }
    Ok(finished)
}

/// Page through the catalog. Returns the scan row after its last page, or
/// `None` when the scan left RUNNING (cancelled) before that.
async fn scan_pages(
    state: &AppState,
    rule: &MaintenanceRule,
    scan_id: DbId,
) -> Result<Option<MaintenanceScan>, ScanError> {
    let media_type = rule.target()?;
    let review_status = initial_status(rule.action()?);
    let criteria = Arc::new(rule.parsed_criteria()?);

    if MaintenanceScanRepo::mark_running(&state.pool, scan_id)
        .await?
        .is_none()
    {
        return Ok(None);
    }
    tracing::debug!(rule_id = rule.id, scan_id, %media_type, "Scan running");

    let config = &state.config.scan;
    let now = Utc::now();
    let mut page_token: Option<String> = None;

    loop {
        let page = tokio::time::timeout(
            config.catalog_timeout(),
            state.catalog.list_items(media_type, page_token.as_deref()),
        )
        .await
        .map_err(|_| ScanError::CatalogTimeout(config.catalog_timeout_secs))??;

        let tally = evaluate_page(
            Arc::clone(&criteria),
            page.items,
            now,
            config.workers,
            config.chunk_size,
        )
        .await?;

        let candidates: Vec<NewCandidate> = tally
            .flagged
            .into_iter()
            .map(|item| NewCandidate {
                scan_id,
                rule_id: rule.id,
                media_type,
                media_item_key: item.key,
                title: item.title,
                review_status,
            })
            .collect();

        let Some(progress) =
            MaintenanceScanRepo::record_page(&state.pool, scan_id, tally.scanned, &candidates)
                .await?
        else {
            return Ok(None);
        };
        tracing::debug!(
            scan_id,
            items_scanned = progress.items_scanned,
            items_flagged = progress.items_flagged,
            "Page recorded",
        );

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => return Ok(Some(progress)),
        }
    }
}

/// Evaluate one catalog page in chunks on the blocking pool, at most
/// `workers` chunks at a time.
pub async fn evaluate_page(
    criteria: Arc<Criteria>,
    items: Vec<MediaItemSnapshot>,
    now: Timestamp,
    workers: usize,
    chunk_size: usize,
) -> Result<ScanTally, ScanError> {
    let chunk_size = chunk_size.max(1);
    let mut chunks = Vec::with_capacity(items.len().div_ceil(chunk_size));
    let mut remaining = items.into_iter();
    loop {
        let chunk: Vec<MediaItemSnapshot> = remaining.by_ref().take(chunk_size).collect();
        if chunk.is_empty() {
            break;
        }
        chunks.push(chunk);
    }

    let tallies: Vec<ScanTally> = futures::stream::iter(chunks)
        .map(|chunk| {
            let criteria = Arc::clone(&criteria);
            tokio::task::spawn_blocking(move || evaluate_chunk(&criteria, &chunk, now))
        })
        .buffered(workers.max(1))
        .try_collect()
        .await
        .map_err(|e| ScanError::Worker(e.to_string()))?;

    Ok(tallies.into_iter().sum())
}

/// Evaluate a chunk and collect the matches in input order.
pub fn evaluate_chunk(
    criteria: &Criteria,
    items: &[MediaItemSnapshot],
    now: Timestamp,
) -> ScanTally {
    let flagged = items
        .iter()
        .filter(|item| evaluate(criteria, item, now))
        .map(|item| FlaggedItem {
            key: item.key.clone(),
            title: item.title.clone(),
        })
        .collect();
    ScanTally {
        scanned: items.len() as i64,
        flagged,
    }
}

/// Move a PENDING or RUNNING scan to CANCELLED.
pub async fn cancel_scan(state: &AppState, scan_id: DbId) -> AppResult<MaintenanceScan> {
    if let Some(scan) = MaintenanceScanRepo::cancel(&state.pool, scan_id).await? {
        tracing::info!(scan_id, rule_id = scan.rule_id, "Scan cancelled");
        return Ok(scan);
    }

    let existing = MaintenanceScanRepo::find_by_id(&state.pool, scan_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "MaintenanceScan",
            id: scan_id,
        })?;
    let status = existing
        .status()
        .map_or_else(|| existing.status_id.to_string(), |s| s.to_string());
    Err(CoreError::Conflict(format!("Scan {scan_id} is already {status}")).into())
}
