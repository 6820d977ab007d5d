//! # forkline-audit
//!
//! The audit pipeline: an append-only, immutable record of every
//! privileged mutation, plus the anomaly monitor that periodically
//! summarizes the recent window back into the trail itself.
//!
//! An audit append is attempted synchronously after the triggering
//! mutation commits, but a failed append never unwinds the committed
//! mutation — an audit gap is a monitoring concern, not a rollback
//! trigger.

pub mod monitor;
pub mod pipeline;

pub use monitor::{MonitorSummary, SecurityMonitor};
pub use pipeline::{AuditPipeline, AuditStore, MemoryAuditStore};
