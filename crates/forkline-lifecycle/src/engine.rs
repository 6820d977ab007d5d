//! The lifecycle engine.
//!
//! Transition pipeline, in order:
//!
//! 1. **Re-read** the order's persisted status — never trust a status
//!    captured earlier in the request.
//! 2. Validate the move against the transition table.
//! 3. Build the write payload (destination status, matching timestamp,
//!    cancellation reason / payment fields where applicable).
//! 4. Commit conditioned on the status still equaling the re-read value.
//!    Zero rows affected means another caller won the race: `FL_ERR_202`,
//!    never a silent double-transition.
//! 5. Append the audit entry — only after the commit, and a failed append
//!    never unwinds it.

use std::net::IpAddr;
use std::sync::Arc;

use chrono::Utc;
use forkline_audit::AuditPipeline;
use forkline_types::{
    Actor, AuditAction, AuditEntry, ForklineError, Order, OrderId, OrderStatus, Result,
    TransitionPatch, constants,
};
use serde_json::json;
use tracing::info;

use crate::store::OrderStore;

/// Guarded, audited order mutations. Cheap to clone; share freely across
/// request handlers and the timer jobs.
#[derive(Clone)]
pub struct LifecycleEngine {
    orders: Arc<dyn OrderStore>,
    audit: AuditPipeline,
}

impl LifecycleEngine {
    #[must_use]
    pub fn new(orders: Arc<dyn OrderStore>, audit: AuditPipeline) -> Self {
        Self { orders, audit }
    }

    /// Fetch one order, mapping absence to `FL_ERR_200`.
    pub async fn fetch(&self, id: OrderId) -> Result<Order> {
        self.orders
            .fetch(id)
            .await?
            .ok_or(ForklineError::OrderNotFound(id))
    }

    /// Admin listing: newest-first, fixed page size.
    pub async fn list(&self, filter: Option<OrderStatus>, page: u32) -> Result<Vec<Order>> {
        self.orders
            .list(filter, page, constants::ORDER_PAGE_SIZE)
            .await
    }

    /// Move an order to `requested` on behalf of `actor`.
    ///
    /// `reason` is persisted only when cancelling.
    pub async fn apply_transition(
        &self,
        id: OrderId,
        requested: OrderStatus,
        actor: &Actor,
        ip: Option<IpAddr>,
        reason: Option<String>,
    ) -> Result<Order> {
        let reason = (requested == OrderStatus::Cancelled)
            .then_some(reason)
            .flatten();
        let patch = TransitionPatch::to_status(requested, Utc::now()).with_reason(reason);
        self.commit(id, requested, patch, actor, ip, AuditAction::OrderStatusUpdated)
            .await
    }

    /// Specialized transition: `awaiting_payment -> confirmed`, exactly.
    ///
    /// Not a generic transition target — the destination is fixed here,
    /// and the patch additionally persists the payment reference and the
    /// confirming actor's identity.
    pub async fn confirm_payment(
        &self,
        id: OrderId,
        payment_reference: Option<String>,
        actor: &Actor,
        ip: Option<IpAddr>,
    ) -> Result<Order> {
        let mut patch = TransitionPatch::to_status(OrderStatus::Confirmed, Utc::now());
        patch.payment_reference = payment_reference;
        patch.payment_confirmed_by = actor.audit_id();
        self.commit(id, OrderStatus::Confirmed, patch, actor, ip, AuditAction::PaymentConfirmed)
            .await
    }

    /// Timer-driven cancellation of a stale unpaid order. Same pipeline,
    /// system actor, fixed reason, distinct audit tag so the anomaly
    /// monitor can count it.
    pub async fn auto_cancel(&self, id: OrderId) -> Result<Order> {
        let patch = TransitionPatch::to_status(OrderStatus::Cancelled, Utc::now())
            .with_reason(Some(constants::AUTO_CANCEL_REASON.to_string()));
        self.commit(
            id,
            OrderStatus::Cancelled,
            patch,
            &Actor::System,
            None,
            AuditAction::OrderAutoCancelled,
        )
        .await
    }

    /// Steps 1–5 shared by every transition flavor.
    async fn commit(
        &self,
        id: OrderId,
        requested: OrderStatus,
        patch: TransitionPatch,
        actor: &Actor,
        ip: Option<IpAddr>,
        action: AuditAction,
    ) -> Result<Order> {
        // Step 1: re-read immediately before writing.
        let order = self.fetch(id).await?;
        let current = order.status;

        // Step 2: table check. Terminal states fall out here naturally.
        if !current.can_transition_to(requested) {
            return Err(ForklineError::InvalidTransition {
                from: current,
                to: requested,
            });
        }

        // Step 4: conditioned write. Commits only if the status is still
        // `current`; zero rows means we lost the race.
        let committed = self.orders.transition(id, current, patch.clone()).await?;
        if !committed {
            return Err(ForklineError::TransitionConflict(id));
        }

        // The CAS guarantees `order` was the committed-over state, so the
        // updated row is the fetched copy plus the patch.
        let mut updated = order;
        updated.apply_patch(&patch);

        info!(
            order = %id,
            from = %current,
            to = %requested,
            actor = ?updated.payment_confirmed_by.filter(|_| action == AuditAction::PaymentConfirmed),
            "order transitioned"
        );

        // Step 5: audit after the commit; never unwinds it.
        let mut metadata = json!({
            "from": current.as_str(),
            "to": requested.as_str(),
        });
        if action == AuditAction::PaymentConfirmed {
            metadata["payment_reference"] = json!(updated.payment_reference);
        }
        self.audit
            .record(AuditEntry::new(
                action,
                actor,
                "order",
                id.to_string(),
                ip,
                metadata,
            ))
            .await;

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::store::MemoryOrderStore;
    use async_trait::async_trait;
    use forkline_audit::MemoryAuditStore;
    use forkline_types::{Identity, Role, UserId};
    use rust_decimal::Decimal;

    struct Fixture {
        engine: LifecycleEngine,
        orders: Arc<MemoryOrderStore>,
        audit: Arc<MemoryAuditStore>,
        admin: Actor,
    }

    fn fixture() -> Fixture {
        let orders = Arc::new(MemoryOrderStore::new());
        let audit = Arc::new(MemoryAuditStore::new());
        let engine = LifecycleEngine::new(orders.clone(), AuditPipeline::new(audit.clone()));
        let admin = Actor::User(Identity {
            user_id: UserId::new(),
            role: Role::Admin,
            email: "ops@forkline.test".into(),
        });
        Fixture {
            engine,
            orders,
            audit,
            admin,
        }
    }

    async fn seeded_order(fx: &Fixture, total: i64) -> OrderId {
        let order = Order::new(UserId::new(), Decimal::new(total, 0));
        let id = order.id;
        fx.orders.insert(order).await.unwrap();
        id
    }

    #[tokio::test]
    async fn confirm_payment_happy_path() {
        let fx = fixture();
        let id = seeded_order(&fx, 5000).await;

        let updated = fx
            .engine
            .confirm_payment(id, Some("REF123".into()), &fx.admin, None)
            .await
            .unwrap();

        assert_eq!(updated.status, OrderStatus::Confirmed);
        assert_eq!(updated.payment_reference.as_deref(), Some("REF123"));
        assert_eq!(updated.payment_confirmed_by, fx.admin.audit_id());
        assert!(updated.confirmed_at.is_some());

        let trail = fx.audit.all();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].action, AuditAction::PaymentConfirmed);
        assert_eq!(trail[0].metadata["from"], "awaiting_payment");
        assert_eq!(trail[0].metadata["to"], "confirmed");
        assert_eq!(trail[0].metadata["payment_reference"], "REF123");
    }

    #[tokio::test]
    async fn double_confirm_is_invalid_transition() {
        let fx = fixture();
        let id = seeded_order(&fx, 5000).await;
        fx.engine
            .confirm_payment(id, Some("REF123".into()), &fx.admin, None)
            .await
            .unwrap();

        let err = fx
            .engine
            .confirm_payment(id, Some("REF456".into()), &fx.admin, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ForklineError::InvalidTransition {
                from: OrderStatus::Confirmed,
                to: OrderStatus::Confirmed,
            }
        ));
        // No audit entry for the rejected attempt.
        assert_eq!(fx.audit.all().len(), 1);
        // And the original reference survives.
        let persisted = fx.engine.fetch(id).await.unwrap();
        assert_eq!(persisted.payment_reference.as_deref(), Some("REF123"));
    }

    #[tokio::test]
    async fn backward_move_rejected() {
        let fx = fixture();
        let id = seeded_order(&fx, 1200).await;
        fx.engine
            .apply_transition(id, OrderStatus::Confirmed, &fx.admin, None, None)
            .await
            .unwrap();
        fx.engine
            .apply_transition(id, OrderStatus::Preparing, &fx.admin, None, None)
            .await
            .unwrap();

        let err = fx
            .engine
            .apply_transition(id, OrderStatus::Confirmed, &fx.admin, None, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ForklineError::InvalidTransition {
                from: OrderStatus::Preparing,
                to: OrderStatus::Confirmed,
            }
        ));
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let fx = fixture();
        let err = fx
            .engine
            .apply_transition(OrderId::new(), OrderStatus::Confirmed, &fx.admin, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ForklineError::OrderNotFound(_)));
        assert!(fx.audit.all().is_empty());
    }

    #[tokio::test]
    async fn cancellation_reason_only_applies_when_cancelling() {
        let fx = fixture();
        let id = seeded_order(&fx, 1200).await;
        // A reason on a non-cancel move is dropped.
        let updated = fx
            .engine
            .apply_transition(
                id,
                OrderStatus::Confirmed,
                &fx.admin,
                None,
                Some("should be ignored".into()),
            )
            .await
            .unwrap();
        assert!(updated.cancellation_reason.is_none());

        let updated = fx
            .engine
            .apply_transition(
                id,
                OrderStatus::Cancelled,
                &fx.admin,
                None,
                Some("out of stock".into()),
            )
            .await
            .unwrap();
        assert_eq!(updated.cancellation_reason.as_deref(), Some("out of stock"));
        assert!(updated.cancelled_at.is_some());
    }

    #[tokio::test]
    async fn lost_race_is_a_conflict_not_a_double_transition() {
        let fx = fixture();
        let id = seeded_order(&fx, 1200).await;

        // Simulate a raced caller: the store commits `confirmed` after our
        // engine call would have read `awaiting_payment`, by issuing the
        // competing CAS directly.
        let competing = TransitionPatch::to_status(OrderStatus::Confirmed, Utc::now());
        assert!(
            fx.orders
                .transition(id, OrderStatus::AwaitingPayment, competing)
                .await
                .unwrap()
        );

        // Second writer validated against the stale `awaiting_payment` read.
        let stale_patch = TransitionPatch::to_status(OrderStatus::Cancelled, Utc::now());
        let committed = fx
            .orders
            .transition(id, OrderStatus::AwaitingPayment, stale_patch)
            .await
            .unwrap();
        assert!(!committed, "stale CAS must affect zero rows");

        let persisted = fx.engine.fetch(id).await.unwrap();
        assert_eq!(persisted.status, OrderStatus::Confirmed);
        assert!(persisted.cancelled_at.is_none(), "loser must leave no stamp");
    }

    /// Delegates to a memory store, but lands one rival commit between
    /// the engine's re-read and its conditioned write — the wrapper's
    /// `transition` applies a competing patch before forwarding the call.
    struct ContendedOrderStore {
        inner: MemoryOrderStore,
        rival_fired: AtomicBool,
    }

    impl ContendedOrderStore {
        fn new() -> Self {
            Self {
                inner: MemoryOrderStore::new(),
                rival_fired: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl OrderStore for ContendedOrderStore {
        async fn insert(&self, order: Order) -> Result<()> {
            self.inner.insert(order).await
        }

        async fn fetch(&self, id: OrderId) -> Result<Option<Order>> {
            self.inner.fetch(id).await
        }

        async fn list(
            &self,
            filter: Option<OrderStatus>,
            page: u32,
            page_size: u32,
        ) -> Result<Vec<Order>> {
            self.inner.list(filter, page, page_size).await
        }

        async fn transition(
            &self,
            id: OrderId,
            expected: OrderStatus,
            patch: TransitionPatch,
        ) -> Result<bool> {
            if !self.rival_fired.swap(true, Ordering::SeqCst) {
                let rival = TransitionPatch::to_status(OrderStatus::Confirmed, Utc::now());
                self.inner.transition(id, expected, rival).await?;
            }
            self.inner.transition(id, expected, patch).await
        }

        async fn stale_awaiting_payment(
            &self,
            cutoff: chrono::DateTime<Utc>,
        ) -> Result<Vec<OrderId>> {
            self.inner.stale_awaiting_payment(cutoff).await
        }

        async fn for_customer(&self, customer: UserId) -> Result<Vec<Order>> {
            self.inner.for_customer(customer).await
        }
    }

    #[tokio::test]
    async fn rival_commit_between_read_and_write_is_a_conflict() {
        let orders = Arc::new(ContendedOrderStore::new());
        let audit = Arc::new(MemoryAuditStore::new());
        let engine = LifecycleEngine::new(orders.clone(), AuditPipeline::new(audit.clone()));
        let admin = Actor::User(Identity {
            user_id: UserId::new(),
            role: Role::Admin,
            email: "ops@forkline.test".into(),
        });

        let order = Order::new(UserId::new(), Decimal::new(5000, 0));
        let id = order.id;
        orders.insert(order).await.unwrap();

        // The table check passes against the re-read `awaiting_payment`,
        // but the rival lands first, so the conditioned write affects
        // zero rows.
        let err = engine
            .confirm_payment(id, Some("REF123".into()), &admin, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ForklineError::TransitionConflict(conflicted) if conflicted == id));

        // The rival's commit stands; the loser left no payment fields and
        // no audit entry.
        let persisted = orders.fetch(id).await.unwrap().unwrap();
        assert_eq!(persisted.status, OrderStatus::Confirmed);
        assert!(persisted.payment_reference.is_none());
        assert!(persisted.payment_confirmed_by.is_none());
        assert!(audit.all().is_empty());
    }

    #[tokio::test]
    async fn system_auto_cancel_records_system_entry() {
        let fx = fixture();
        let id = seeded_order(&fx, 800).await;
        let updated = fx.engine.auto_cancel(id).await.unwrap();

        assert_eq!(updated.status, OrderStatus::Cancelled);
        assert_eq!(
            updated.cancellation_reason.as_deref(),
            Some(constants::AUTO_CANCEL_REASON)
        );
        let trail = fx.audit.all();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].action, AuditAction::OrderAutoCancelled);
        assert!(trail[0].actor_id.is_none());
    }
}
