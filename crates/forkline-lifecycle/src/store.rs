//! Order persistence boundary.
//!
//! The platform's hosted relational store sits behind [`OrderStore`]; the
//! core never issues raw queries. The one non-obvious contract is
//! [`transition`](OrderStore::transition): the write commits **only if**
//! the order's status still equals the status the engine observed, and
//! reports `false` (zero rows) otherwise. That compare-and-swap is the
//! entire concurrency story for order mutations.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use forkline_types::{ForklineError, Order, OrderId, OrderStatus, Result, TransitionPatch, UserId};

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: Order) -> Result<()>;

    async fn fetch(&self, id: OrderId) -> Result<Option<Order>>;

    /// Orders newest-first, optionally filtered by status. `page` is
    /// 1-based; `page_size` rows per page.
    async fn list(
        &self,
        filter: Option<OrderStatus>,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Order>>;

    /// Conditioned write: apply `patch` only if the order's persisted
    /// status still equals `expected`. Returns `false` when zero rows
    /// matched — someone else transitioned the order first.
    async fn transition(
        &self,
        id: OrderId,
        expected: OrderStatus,
        patch: TransitionPatch,
    ) -> Result<bool>;

    /// Ids of `awaiting_payment` orders created at or before `cutoff`.
    async fn stale_awaiting_payment(&self, cutoff: DateTime<Utc>) -> Result<Vec<OrderId>>;

    /// All orders belonging to one customer, newest-first.
    async fn for_customer(&self, customer: UserId) -> Result<Vec<Order>>;
}

/// In-memory order store for tests and local runs. Implements the same
/// compare-and-swap semantics the hosted store provides via a conditioned
/// `UPDATE ... WHERE status = $expected`.
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl MemoryOrderStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryOrderStore {
    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<OrderId, Order>>> {
        self.orders
            .read()
            .map_err(|_| ForklineError::Internal("order store lock poisoned".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<OrderId, Order>>> {
        self.orders
            .write()
            .map_err(|_| ForklineError::Internal("order store lock poisoned".into()))
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<()> {
        self.write()?.insert(order.id, order);
        Ok(())
    }

    async fn fetch(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn list(
        &self,
        filter: Option<OrderStatus>,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Order>> {
        let orders = self.read()?;
        let mut rows: Vec<Order> = orders
            .values()
            .filter(|order| filter.is_none_or(|status| order.status == status))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let start = (page.max(1) - 1) as usize * page_size as usize;
        Ok(rows.into_iter().skip(start).take(page_size as usize).collect())
    }

    async fn transition(
        &self,
        id: OrderId,
        expected: OrderStatus,
        patch: TransitionPatch,
    ) -> Result<bool> {
        let mut orders = self.write()?;
        match orders.get_mut(&id) {
            Some(order) if order.status == expected => {
                order.apply_patch(&patch);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn stale_awaiting_payment(&self, cutoff: DateTime<Utc>) -> Result<Vec<OrderId>> {
        let orders = self.read()?;
        Ok(orders
            .values()
            .filter(|order| {
                order.status == OrderStatus::AwaitingPayment && order.created_at <= cutoff
            })
            .map(|order| order.id)
            .collect())
    }

    async fn for_customer(&self, customer: UserId) -> Result<Vec<Order>> {
        let orders = self.read()?;
        let mut rows: Vec<Order> = orders
            .values()
            .filter(|order| order.customer_id == customer)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }
}
