//! Anomaly monitor.
//!
//! Runs on an external five-minute trigger. Each run pulls the recent
//! audit window, derives a per-action count, and appends the summary back
//! into the trail as a `security_monitor_check` entry — a durable,
//! queryable history of anomaly snapshots without a separate store. The
//! monitor produces signal only; paging on thresholds belongs to the
//! external alerting system.

use std::collections::BTreeMap;

use chrono::Duration;
use forkline_types::{Actor, AuditAction, AuditEntry, Result, constants};
use serde::{Deserialize, Serialize};

use crate::pipeline::AuditPipeline;

/// One monitor snapshot: per-action counts over the lookback window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorSummary {
    pub window_minutes: i64,
    /// Count per action tag. The tags the alerting system keys on
    /// (`payment_confirmed`, `order_auto_cancelled`) are always present,
    /// even at zero, so a silent period is distinguishable from a gap.
    pub counts: BTreeMap<String, u64>,
}

impl MonitorSummary {
    #[must_use]
    pub fn count(&self, action: AuditAction) -> u64 {
        self.counts.get(action.as_str()).copied().unwrap_or(0)
    }
}

/// Periodic scanner over the audit pipeline's recent window.
#[derive(Clone)]
pub struct SecurityMonitor {
    pipeline: AuditPipeline,
    window: Duration,
}

impl SecurityMonitor {
    #[must_use]
    pub fn new(pipeline: AuditPipeline) -> Self {
        Self {
            pipeline,
            window: Duration::minutes(constants::MONITOR_WINDOW_MINUTES),
        }
    }

    /// Run one scan: count the recent window per action and append the
    /// summary as a system audit entry.
    pub async fn run(&self) -> Result<MonitorSummary> {
        let recent = self.pipeline.recent_window(self.window).await?;

        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        counts.insert(AuditAction::PaymentConfirmed.as_str().to_string(), 0);
        counts.insert(AuditAction::OrderAutoCancelled.as_str().to_string(), 0);
        for entry in &recent {
            *counts.entry(entry.action.as_str().to_string()).or_insert(0) += 1;
        }

        let summary = MonitorSummary {
            window_minutes: self.window.num_minutes(),
            counts,
        };

        self.pipeline
            .record(AuditEntry::new(
                AuditAction::SecurityMonitorCheck,
                &Actor::System,
                "audit_log",
                "recent_window",
                None,
                serde_json::to_value(&summary).unwrap_or_default(),
            ))
            .await;

        Ok(summary)
    }
}
