//! Auto-cancellation sweeper.
//!
//! Runs on a slow external timer (daily). Orders stuck in
//! `awaiting_payment` past the configured timeout are cancelled through
//! the same engine path a human cancellation takes, so the audit trail is
//! structurally identical and the conditioned write settles races: a
//! customer payment landing mid-sweep wins or loses atomically, never
//! both.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use forkline_types::{ForklineError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::LifecycleEngine;
use crate::store::OrderStore;

/// Outcome of one sweep run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Stale orders the scan surfaced.
    pub scanned: usize,
    /// Orders this run actually cancelled.
    pub cancelled: usize,
    /// Orders that moved on before we got to them (paid or already
    /// cancelled) — harmless no-ops.
    pub skipped: usize,
}

pub struct AutoCancelSweeper {
    engine: LifecycleEngine,
    orders: Arc<dyn OrderStore>,
    timeout: Duration,
}

impl AutoCancelSweeper {
    #[must_use]
    pub fn new(engine: LifecycleEngine, orders: Arc<dyn OrderStore>, timeout: Duration) -> Self {
        Self {
            engine,
            orders,
            timeout,
        }
    }

    /// One sweep. Idempotent and safe to double-run: a repeated sweep over
    /// an already-cancelled order fails the table check harmlessly.
    pub async fn run(&self) -> Result<SweepReport> {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(self.timeout)
                .map_err(|_| ForklineError::Configuration("auto-cancel timeout overflow".into()))?;
        let stale = self.orders.stale_awaiting_payment(cutoff).await?;

        let mut report = SweepReport {
            scanned: stale.len(),
            cancelled: 0,
            skipped: 0,
        };
        for id in stale {
            match self.engine.auto_cancel(id).await {
                Ok(_) => report.cancelled += 1,
                Err(
                    ForklineError::InvalidTransition { .. }
                    | ForklineError::TransitionConflict(_)
                    | ForklineError::OrderNotFound(_),
                ) => {
                    debug!(order = %id, "sweep skipped order that moved on");
                    report.skipped += 1;
                }
                Err(other) => return Err(other),
            }
        }
        info!(
            scanned = report.scanned,
            cancelled = report.cancelled,
            skipped = report.skipped,
            "auto-cancel sweep finished"
        );
        Ok(report)
    }
}
