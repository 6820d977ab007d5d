//! # forkline-guard
//!
//! The trust boundary of the Forkline platform. Every privileged request
//! passes through here before any state is read or written:
//!
//! 1. [`RateLimiter`] — bounds authentication attempts per client; fails
//!    open if its backing store is unavailable.
//! 2. [`SessionGuard`] — resolves the caller's identity and role from an
//!    opaque session token; authorization is re-derived on every request,
//!    never cached.
//! 3. [`redirect::safe_redirect`] — validates caller-supplied post-auth
//!    redirect targets against a fixed allowlist.
//!
//! ## Design Principles
//!
//! - **No bypass**: there is no path from an inbound request to a
//!   privileged mutation that skips the guard.
//! - **Minimal disclosure**: authentication failures are indistinguishable
//!   from one another on the wire.
//! - **Fail open only where harmless**: the rate limiter is
//!   defense-in-depth, so a dead counter store degrades to "allow" (and is
//!   logged); the session guard has no such mode.

pub mod provider;
pub mod rate_limit;
pub mod redirect;
pub mod session;

pub use provider::MemoryIdentityProvider;
pub use rate_limit::{CounterStore, MemoryCounterStore, RateLimitRule, RateLimitVerdict, RateLimiter};
pub use redirect::safe_redirect;
pub use session::{CredentialError, IdentityProvider, Session, SessionGuard};
