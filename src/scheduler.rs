//! Periodic reconciliation scheduler.
//!
//! Time-driven status transitions need something to notice that a party's
//! scheduled end has passed. Instead of piggybacking on read traffic, a
//! dedicated tick runs the batch reconciliation pass on a fixed interval,
//! which bounds the staleness of any party status by the interval length.
//! Payment-driven transitions do not wait for the tick - they are applied
//! immediately by the payment event path in `core::reconcile`.

use crate::{
    core::reconcile::{self, ReconcileOutcome},
    errors::Result,
};
use chrono::Local;
use sea_orm::DatabaseConnection;
use std::time::Duration;
use tracing::{debug, error, info};

/// Runs one reconciliation pass against the current wall-clock time.
pub async fn tick(db: &DatabaseConnection) -> Result<ReconcileOutcome> {
    let now = Local::now().naive_local();
    reconcile::auto_update_statuses(db, now).await
}

/// Loops forever, running a reconciliation pass every `interval_secs`.
///
/// A failed pass is logged and the loop keeps going - one bad tick must
/// not stop future ones. Never returns under normal operation.
pub async fn run_scheduler(db: DatabaseConnection, interval_secs: u64) -> Result<()> {
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    info!(interval_secs, "Reconciliation scheduler started");

    loop {
        ticker.tick().await;
        match tick(&db).await {
            Ok(outcome) => {
                if outcome.updated.is_empty() && outcome.skipped == 0 && outcome.failed == 0 {
                    debug!(examined = outcome.examined, "Reconciliation tick - nothing to do");
                } else {
                    info!(
                        examined = outcome.examined,
                        updated = outcome.updated.len(),
                        skipped = outcome.skipped,
                        failed = outcome.failed,
                        "Reconciliation tick finished"
                    );
                }
            }
            Err(e) => {
                error!(error = %e, "Reconciliation tick failed");
            }
        }
    }
}
