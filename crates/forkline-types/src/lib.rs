//! # forkline-types
//!
//! Shared types, errors, and configuration for the **Forkline** order
//! lifecycle and trust-boundary engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`OrderId`], [`UserId`], [`AuditEntryId`]
//! - **Order model**: [`Order`], [`OrderStatus`], [`TransitionPatch`]
//! - **Audit model**: [`AuditEntry`], [`AuditAction`]
//! - **Identity model**: [`Role`], [`Identity`], [`Actor`]
//! - **Configuration**: [`CoreConfig`]
//! - **Errors**: [`ForklineError`] with `FL_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod audit;
pub mod config;
pub mod constants;
pub mod error;
pub mod identity;
pub mod ids;
pub mod order;

// Re-export all primary types at crate root for ergonomic imports:
//   use forkline_types::{Order, OrderStatus, AuditEntry, ...};

pub use audit::*;
pub use config::*;
pub use error::*;
pub use identity::*;
pub use ids::*;
pub use order::*;

// Constants are accessed via `forkline_types::constants::FOO`
// (not re-exported to avoid name collisions).
