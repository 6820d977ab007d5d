//! # forkline-lifecycle
//!
//! The order state machine: every status mutation in the platform flows
//! through [`LifecycleEngine`], which re-reads persisted state, validates
//! the move against the transition table, commits it with a conditioned
//! (compare-and-swap) write, and appends the audit entry after the commit.
//!
//! There is no in-process lock coordinating order mutations. The
//! conditioned write is the **only** guard against concurrent conflicting
//! transitions: of two racing callers that both observed the same status,
//! exactly one commits and the other sees a conflict.

pub mod engine;
pub mod store;
pub mod sweeper;

pub use engine::LifecycleEngine;
pub use store::{MemoryOrderStore, OrderStore};
pub use sweeper::{AutoCancelSweeper, SweepReport};
