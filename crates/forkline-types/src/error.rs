//! Error types for the Forkline core.
//!
//! All errors use the `FL_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Trust boundary errors (session, role, rate limit)
//! - 2xx: Order lifecycle errors
//! - 3xx: Input validation errors
//! - 9xx: Upstream / internal errors
//!
//! The prefixed messages are operator-facing. The HTTP layer maps each
//! variant to a status code and a stable minimal client message — internal
//! detail never reaches the client.

use thiserror::Error;

use crate::{OrderId, OrderStatus, Role};

/// Central error enum for all Forkline core operations.
#[derive(Debug, Error)]
pub enum ForklineError {
    // =================================================================
    // Trust Boundary Errors (1xx)
    // =================================================================
    /// No identity could be resolved for the request. Deliberately carries
    /// no detail distinguishing "no token" from "bad token".
    #[error("FL_ERR_100: Unauthorized")]
    Unauthorized,

    /// An identity resolved, but its role does not match the requirement.
    #[error("FL_ERR_101: Forbidden: requires role {required}")]
    Forbidden { required: Role },

    /// The caller exhausted its attempt budget for a rate-limited route.
    #[error("FL_ERR_102: Rate limited on {scope}")]
    RateLimited { scope: &'static str },

    // =================================================================
    // Order Lifecycle Errors (2xx)
    // =================================================================
    /// The requested order does not exist.
    #[error("FL_ERR_200: Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The transition table forbids the requested move.
    #[error("FL_ERR_201: Invalid transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// The conditioned write affected zero rows — another caller
    /// transitioned the order between the read and the commit.
    #[error("FL_ERR_202: Transition conflict on order {0}")]
    TransitionConflict(OrderId),

    // =================================================================
    // Input Validation Errors (3xx)
    // =================================================================
    /// Malformed request input (bad status tag, missing field, etc.).
    #[error("FL_ERR_300: Invalid input: {reason}")]
    InvalidInput { reason: String },

    // =================================================================
    // Upstream / Internal (9xx)
    // =================================================================
    /// The backing store or identity provider failed.
    #[error("FL_ERR_900: Upstream failure: {source_detail}")]
    Upstream { source_detail: String },

    /// Unrecoverable internal error.
    #[error("FL_ERR_901: Internal error: {0}")]
    Internal(String),

    /// Configuration error (missing secret, invalid env value, etc.).
    #[error("FL_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

impl ForklineError {
    /// Shorthand for an upstream (store / provider) failure.
    pub fn upstream(detail: impl Into<String>) -> Self {
        Self::Upstream {
            source_detail: detail.into(),
        }
    }

    /// Shorthand for an input validation failure.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, ForklineError>;
