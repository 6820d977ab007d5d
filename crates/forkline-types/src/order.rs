//! Order model for the Forkline lifecycle engine.
//!
//! The transition table lives here, on [`OrderStatus`], so that both the
//! lifecycle engine and any store implementation share one source of truth.
//! An order is **never** mutated except through a [`TransitionPatch`]
//! produced by the engine, and never physically deleted — terminal states
//! (`delivered`, `cancelled`) are the only exits.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ForklineError, OrderId, Result, UserId};

/// Lifecycle status of an order.
///
/// ```text
/// awaiting_payment -> confirmed -> preparing -> out_for_delivery -> delivered
///        \________________\____________\________________\--> cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    AwaitingPayment,
    Confirmed,
    Preparing,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order. Handy for exhaustive table checks.
    pub const ALL: [Self; 6] = [
        Self::AwaitingPayment,
        Self::Confirmed,
        Self::Preparing,
        Self::OutForDelivery,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// The allowed destinations from this status.
    #[must_use]
    pub fn allowed_destinations(self) -> &'static [Self] {
        match self {
            Self::AwaitingPayment => &[Self::Confirmed, Self::Cancelled],
            Self::Confirmed => &[Self::Preparing, Self::Cancelled],
            Self::Preparing => &[Self::OutForDelivery, Self::Cancelled],
            Self::OutForDelivery => &[Self::Delivered, Self::Cancelled],
            Self::Delivered | Self::Cancelled => &[],
        }
    }

    /// Pure transition predicate over the table above.
    #[must_use]
    pub fn can_transition_to(self, requested: Self) -> bool {
        self.allowed_destinations().contains(&requested)
    }

    /// Whether this status admits no outgoing transition.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self.allowed_destinations().is_empty()
    }

    /// The snake_case wire tag, matching the serde representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingPayment => "awaiting_payment",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse a wire tag. Fails with `FL_ERR_300` on anything outside the
    /// closed set.
    pub fn parse(tag: &str) -> Result<Self> {
        match tag {
            "awaiting_payment" => Ok(Self::AwaitingPayment),
            "confirmed" => Ok(Self::Confirmed),
            "preparing" => Ok(Self::Preparing),
            "out_for_delivery" => Ok(Self::OutForDelivery),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ForklineError::invalid_input(format!(
                "unknown order status: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A customer order.
///
/// Exactly the timestamp fields on the path to the current status are
/// populated; states never reached stay `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: UserId,
    pub status: OrderStatus,
    /// Monetary total in the platform currency.
    pub total: Decimal,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub preparing_at: Option<DateTime<Utc>>,
    pub out_for_delivery_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Present only when status is `cancelled` and a reason was supplied.
    pub cancellation_reason: Option<String>,
    /// Present only once payment is confirmed.
    pub payment_reference: Option<String>,
    /// The actor that confirmed payment. `None` before confirmation.
    pub payment_confirmed_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Create a fresh order in `awaiting_payment`.
    #[must_use]
    pub fn new(customer_id: UserId, total: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: OrderId::new(),
            customer_id,
            status: OrderStatus::AwaitingPayment,
            total,
            confirmed_at: None,
            preparing_at: None,
            out_for_delivery_at: None,
            delivered_at: None,
            cancelled_at: None,
            cancellation_reason: None,
            payment_reference: None,
            payment_confirmed_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a committed transition patch. Store implementations call this
    /// **after** their compare-and-swap succeeded, so every backend stamps
    /// the same fields the same way.
    pub fn apply_patch(&mut self, patch: &TransitionPatch) {
        self.status = patch.status;
        match patch.status {
            OrderStatus::Confirmed => self.confirmed_at = Some(patch.stamped_at),
            OrderStatus::Preparing => self.preparing_at = Some(patch.stamped_at),
            OrderStatus::OutForDelivery => self.out_for_delivery_at = Some(patch.stamped_at),
            OrderStatus::Delivered => self.delivered_at = Some(patch.stamped_at),
            OrderStatus::Cancelled => self.cancelled_at = Some(patch.stamped_at),
            OrderStatus::AwaitingPayment => {}
        }
        if let Some(reason) = &patch.cancellation_reason {
            self.cancellation_reason = Some(reason.clone());
        }
        if let Some(reference) = &patch.payment_reference {
            self.payment_reference = Some(reference.clone());
        }
        if let Some(confirmer) = patch.payment_confirmed_by {
            self.payment_confirmed_by = Some(confirmer);
        }
        self.updated_at = patch.stamped_at;
    }

    /// The timestamp recorded for a given status on this order, if reached.
    #[must_use]
    pub fn stamp_for(&self, status: OrderStatus) -> Option<DateTime<Utc>> {
        match status {
            OrderStatus::AwaitingPayment => Some(self.created_at),
            OrderStatus::Confirmed => self.confirmed_at,
            OrderStatus::Preparing => self.preparing_at,
            OrderStatus::OutForDelivery => self.out_for_delivery_at,
            OrderStatus::Delivered => self.delivered_at,
            OrderStatus::Cancelled => self.cancelled_at,
        }
    }
}

/// The write payload for a single order transition.
///
/// Built only by the lifecycle engine; carries everything a store needs to
/// commit the move conditionally on the previously observed status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionPatch {
    /// The destination status.
    pub status: OrderStatus,
    /// Wall-clock time stamped into the matching timestamp field.
    pub stamped_at: DateTime<Utc>,
    /// Caller-supplied reason; only meaningful when cancelling.
    pub cancellation_reason: Option<String>,
    /// Payment reference; only set by payment confirmation.
    pub payment_reference: Option<String>,
    /// Confirming actor; only set by payment confirmation.
    pub payment_confirmed_by: Option<UserId>,
}

impl TransitionPatch {
    /// A plain status move with the matching timestamp.
    #[must_use]
    pub fn to_status(status: OrderStatus, at: DateTime<Utc>) -> Self {
        Self {
            status,
            stamped_at: at,
            cancellation_reason: None,
            payment_reference: None,
            payment_confirmed_by: None,
        }
    }

    /// Attach a cancellation reason (ignored by stores unless cancelling).
    #[must_use]
    pub fn with_reason(mut self, reason: Option<String>) -> Self {
        self.cancellation_reason = reason;
        self
    }
}
