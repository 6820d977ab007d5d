//! Caller identity and role model.
//!
//! A caller has exactly one role from a closed set, resolved per request
//! from a session credential. Nothing in the core mutates identities.

use serde::{Deserialize, Serialize};

use crate::UserId;

/// Platform roles. Closed set; authorization is equality, not hierarchy —
/// an admin asking for a customer-only check still fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    RestaurantOwner,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::RestaurantOwner => write!(f, "restaurant_owner"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// A resolved, authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
    pub email: String,
}

/// Who performed a privileged action.
///
/// Timer-driven jobs act as [`Actor::System`]; their audit entries carry no
/// `actor_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    User(Identity),
    System,
}

impl Actor {
    /// The id recorded in audit entries; `None` for system actions.
    #[must_use]
    pub fn audit_id(&self) -> Option<UserId> {
        match self {
            Self::User(identity) => Some(identity.user_id),
            Self::System => None,
        }
    }
}
