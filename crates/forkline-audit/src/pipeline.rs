//! Audit pipeline: append and recent-window reads.

use std::sync::Arc;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use forkline_types::{AuditEntry, ForklineError, Result};
use tracing::error;

/// The audit trail backend. Append-only; entries are immutable once
/// written and ids are time-ordered.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn append(&self, entry: AuditEntry) -> Result<()>;

    /// All entries with `created_at` within `window` of now, newest-first.
    async fn recent_window(&self, window: Duration) -> Result<Vec<AuditEntry>>;
}

/// Caller-facing audit surface.
///
/// [`record`](Self::record) is fire-and-forget from the caller's
/// perspective: the append is attempted synchronously, and any failure is
/// logged for operators instead of propagated — retrying the original
/// user-facing mutation would be worse than a missing log line.
#[derive(Clone)]
pub struct AuditPipeline {
    store: Arc<dyn AuditStore>,
}

impl AuditPipeline {
    #[must_use]
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Append an entry. Never fails the caller.
    pub async fn record(&self, entry: AuditEntry) {
        let action = entry.action;
        let target = entry.target_id.clone();
        if let Err(err) = self.store.append(entry).await {
            error!(
                action = %action,
                target = %target,
                error = %err,
                "audit append failed; mutation already committed, trail has a gap"
            );
        }
    }

    /// Recent entries, newest-first. Used by the anomaly monitor.
    pub async fn recent_window(&self, window: Duration) -> Result<Vec<AuditEntry>> {
        self.store.recent_window(window).await
    }
}

/// In-memory audit store for tests and local runs.
#[derive(Default)]
pub struct MemoryAuditStore {
    entries: RwLock<Vec<AuditEntry>>,
}

impl MemoryAuditStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every entry, oldest-first. Test helper.
    pub fn all(&self) -> Vec<AuditEntry> {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn append(&self, entry: AuditEntry) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| ForklineError::Internal("audit store lock poisoned".into()))?;
        entries.push(entry);
        Ok(())
    }

    async fn recent_window(&self, window: Duration) -> Result<Vec<AuditEntry>> {
        let cutoff = Utc::now() - window;
        let entries = self
            .entries
            .read()
            .map_err(|_| ForklineError::Internal("audit store lock poisoned".into()))?;
        let mut recent: Vec<AuditEntry> = entries
            .iter()
            .filter(|entry| entry.created_at >= cutoff)
            .cloned()
            .collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(recent)
    }
}
