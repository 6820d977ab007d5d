//! Audit trail model.
//!
//! Every privileged mutation appends exactly one [`AuditEntry`], written
//! only after the underlying mutation is durably committed. Entries are
//! append-only and immutable once written.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Actor, AuditEntryId, UserId};

/// The closed set of audited actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    OrderStatusUpdated,
    PaymentConfirmed,
    OrderAutoCancelled,
    SecurityMonitorCheck,
    CustomerDataExported,
}

impl AuditAction {
    /// The snake_case tag, matching the serde representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OrderStatusUpdated => "order_status_updated",
            Self::PaymentConfirmed => "payment_confirmed",
            Self::OrderAutoCancelled => "order_auto_cancelled",
            Self::SecurityMonitorCheck => "security_monitor_check",
            Self::CustomerDataExported => "customer_data_exported",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One immutable record of a privileged action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Monotonically ordered identity (UUIDv7).
    pub id: AuditEntryId,
    pub action: AuditAction,
    /// `None` for system-triggered actions.
    pub actor_id: Option<UserId>,
    pub target_type: String,
    pub target_id: String,
    pub ip_address: Option<IpAddr>,
    /// Open, action-specific key/value map.
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Build an entry for the given action and actor, stamped now.
    #[must_use]
    pub fn new(
        action: AuditAction,
        actor: &Actor,
        target_type: impl Into<String>,
        target_id: impl Into<String>,
        ip_address: Option<IpAddr>,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            id: AuditEntryId::new(),
            action,
            actor_id: actor.audit_id(),
            target_type: target_type.into(),
            target_id: target_id.into(),
            ip_address,
            metadata,
            created_at: Utc::now(),
        }
    }
}
