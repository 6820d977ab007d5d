//! Authentication rate limiter (fixed window).
//!
//! Bounds attempts per (client key, route scope) pair. The counter lives
//! in a [`CounterStore`] shared across workers; when that store is
//! unreachable the check **fails open** — the caller proceeds as if under
//! budget and only the operator log records the outage. Rate limiting is
//! defense-in-depth here, not a correctness guard, so availability wins.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use forkline_types::{ForklineError, Result, constants};
use tracing::warn;

/// One rate-limited route class.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitRule {
    /// Scope tag, part of the counter key (e.g. `"login"`).
    pub scope: &'static str,
    /// Attempts permitted within one window.
    pub max_attempts: u32,
    /// Fixed window length.
    pub window: Duration,
}

impl RateLimitRule {
    /// Login: 5 attempts per 15 minutes.
    pub const LOGIN: Self = Self {
        scope: "login",
        max_attempts: constants::LOGIN_MAX_ATTEMPTS,
        window: Duration::from_secs(constants::LOGIN_WINDOW_SECS),
    };

    /// Signup: 3 attempts per hour.
    pub const SIGNUP: Self = Self {
        scope: "signup",
        max_attempts: constants::SIGNUP_MAX_ATTEMPTS,
        window: Duration::from_secs(constants::SIGNUP_WINDOW_SECS),
    };
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitVerdict {
    /// Within budget (or the backing store was down — fail open).
    Allowed,
    /// Budget exhausted for this window.
    Limited,
}

/// The shared counter backend.
///
/// `increment` bumps the counter for `key` within the current fixed
/// window and returns the new count, resetting when the window elapses.
#[async_trait]
pub trait CounterStore: Send + Sync {
    async fn increment(&self, key: &str, window: Duration) -> Result<u64>;
}

/// Bounds request rate per (client key, route scope).
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    /// Check whether `client_key` is within budget for `rule`.
    ///
    /// Never returns an error: a counter-store failure is logged and the
    /// caller is allowed through.
    pub async fn check(&self, rule: &RateLimitRule, client_key: &str) -> RateLimitVerdict {
        let key = format!("{}:{client_key}", rule.scope);
        match self.store.increment(&key, rule.window).await {
            Ok(count) if count <= u64::from(rule.max_attempts) => RateLimitVerdict::Allowed,
            Ok(count) => {
                warn!(
                    scope = rule.scope,
                    client = client_key,
                    count,
                    limit = rule.max_attempts,
                    "rate limit exceeded"
                );
                RateLimitVerdict::Limited
            }
            Err(err) => {
                // Silent disablement is an operational concern; make it loud.
                warn!(
                    scope = rule.scope,
                    error = %err,
                    "rate limit counter store unreachable, failing open"
                );
                RateLimitVerdict::Allowed
            }
        }
    }

    /// Like [`check`](Self::check) but surfaces `FL_ERR_102` when limited,
    /// for call sites that propagate errors.
    pub async fn enforce(&self, rule: &RateLimitRule, client_key: &str) -> Result<()> {
        match self.check(rule, client_key).await {
            RateLimitVerdict::Allowed => Ok(()),
            RateLimitVerdict::Limited => Err(ForklineError::RateLimited { scope: rule.scope }),
        }
    }
}

/// In-memory fixed-window counter store.
///
/// Window state is per-key: the first increment opens the window, and the
/// first increment after it elapses resets it.
#[derive(Default)]
pub struct MemoryCounterStore {
    windows: DashMap<String, WindowSlot>,
}

struct WindowSlot {
    opened: Instant,
    count: u64,
}

impl MemoryCounterStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn increment(&self, key: &str, window: Duration) -> Result<u64> {
        let mut slot = self.windows.entry(key.to_string()).or_insert(WindowSlot {
            opened: Instant::now(),
            count: 0,
        });
        if slot.opened.elapsed() >= window {
            slot.opened = Instant::now();
            slot.count = 0;
        }
        slot.count += 1;
        Ok(slot.count)
    }
}
