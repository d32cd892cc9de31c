//! Periodic execution of scheduled maintenance rules.
//!
//! Every tick, each enabled rule with a `schedule` whose latest scan started
//! at least one interval ago (or that never ran) is scanned. Scans run one
//! after another inside the tick; a rule that already has an active scan is
//! skipped. The executor handles AUTO_DELETE follow-up deletions.

use chrono::Utc;
use curator_core::error::CoreError;
use curator_core::schedule::{is_due, parse_schedule};
use curator_db::models::maintenance_rule::MaintenanceRule;
use curator_db::repositories::{MaintenanceRuleRepo, MaintenanceScanRepo};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::engine::scan_executor;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Run the scheduler loop until `cancel` is triggered.
pub async fn run(state: AppState, cancel: CancellationToken) {
    let tick = state.config.scan.scheduler_tick();
    tracing::info!(interval_secs = tick.as_secs(), "Rule scheduler started");

    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Rule scheduler stopping");
                break;
            }
            _ = interval.tick() => {
                match run_due_rules(&state).await {
                    Ok(0) => tracing::debug!("Rule scheduler: nothing due"),
                    Ok(scanned) => tracing::info!(scanned, "Rule scheduler: scans finished"),
                    Err(e) => tracing::error!(error = %e, "Rule scheduler: tick failed"),
                }
            }
        }
    }
}

/// Scan every scheduled rule that is due. Returns how many scans ran.
pub async fn run_due_rules(state: &AppState) -> AppResult<usize> {
    let rules = MaintenanceRuleRepo::list_scheduled(&state.pool).await?;
    let now = Utc::now();

    let mut scanned = 0;
    for rule in rules {
        let Some(expr) = rule.schedule.as_deref() else {
            continue;
        };
        let interval = match parse_schedule(expr) {
            Ok(interval) => interval,
            Err(e) => {
                tracing::warn!(rule_id = rule.id, error = %e, "Skipping rule with bad schedule");
                continue;
            }
        };

        let last_started = MaintenanceScanRepo::latest_for_rule(&state.pool, rule.id)
            .await?
            .map(|scan| scan.started_at);
        if !is_due(interval, last_started, now) {
            continue;
        }

        match run_rule(state, &rule).await {
            Ok(()) => scanned += 1,
            Err(AppError::Core(CoreError::Conflict(msg))) => {
                tracing::debug!(rule_id = rule.id, reason = %msg, "Scheduled scan skipped");
            }
            Err(e) => {
                tracing::error!(rule_id = rule.id, error = %e, "Scheduled scan failed");
            }
        }
    }
    Ok(scanned)
}

async fn run_rule(state: &AppState, rule: &MaintenanceRule) -> AppResult<()> {
    let (rule, scan) = scan_executor::trigger_scan(state, rule.id, None).await?;
    let finished = scan_executor::run_scan(state, &rule, scan.id).await?;
    tracing::debug!(
        rule_id = rule.id,
        scan_id = scan.id,
        status = ?finished.status(),
        "Scheduled scan finished",
    );
    Ok(())
}
