//! Shared application state.
//!
//! Dependencies are explicitly constructed and injected — no ambient
//! global store handle — so the guard, pipeline, and engine are each
//! testable against fakes.

use std::sync::Arc;

use forkline_audit::{AuditPipeline, AuditStore, MemoryAuditStore, SecurityMonitor};
use forkline_guard::{
    IdentityProvider, MemoryCounterStore, MemoryIdentityProvider, RateLimiter, SessionGuard,
};
use forkline_lifecycle::{AutoCancelSweeper, LifecycleEngine, MemoryOrderStore, OrderStore};
use forkline_types::CoreConfig;

pub struct AppState {
    pub config: CoreConfig,
    pub provider: Arc<dyn IdentityProvider>,
    pub guard: SessionGuard,
    pub limiter: RateLimiter,
    pub engine: LifecycleEngine,
    pub orders: Arc<dyn OrderStore>,
    pub audit: AuditPipeline,
    pub monitor: SecurityMonitor,
    pub sweeper: AutoCancelSweeper,
}

impl AppState {
    /// Wire the full dependency graph over caller-supplied backends.
    pub fn new(
        config: CoreConfig,
        provider: Arc<dyn IdentityProvider>,
        orders: Arc<dyn OrderStore>,
        audit_store: Arc<dyn AuditStore>,
        limiter: RateLimiter,
    ) -> Arc<Self> {
        let audit = AuditPipeline::new(audit_store);
        let engine = LifecycleEngine::new(orders.clone(), audit.clone());
        let monitor = SecurityMonitor::new(audit.clone());
        let sweeper = AutoCancelSweeper::new(engine.clone(), orders.clone(), config.auto_cancel_timeout());
        Arc::new(Self {
            guard: SessionGuard::new(provider.clone()),
            provider,
            limiter,
            engine,
            orders,
            audit,
            monitor,
            sweeper,
            config,
        })
    }
}

/// A fully in-memory application, with handles onto the backing fakes.
/// Used by tests and local runs.
pub struct InMemoryApp {
    pub state: Arc<AppState>,
    pub provider: Arc<MemoryIdentityProvider>,
    pub orders: Arc<MemoryOrderStore>,
    pub audit_store: Arc<MemoryAuditStore>,
}

impl InMemoryApp {
    #[must_use]
    pub fn new(config: CoreConfig) -> Self {
        let provider = Arc::new(MemoryIdentityProvider::new());
        let orders = Arc::new(MemoryOrderStore::new());
        let audit_store = Arc::new(MemoryAuditStore::new());
        let limiter = RateLimiter::new(Arc::new(MemoryCounterStore::new()));
        let state = AppState::new(
            config,
            provider.clone(),
            orders.clone(),
            audit_store.clone(),
            limiter,
        );
        Self {
            state,
            provider,
            orders,
            audit_store,
        }
    }
}
