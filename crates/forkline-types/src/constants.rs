//! System-wide constants for the Forkline core.

/// Fixed page size for admin order listings.
pub const ORDER_PAGE_SIZE: u32 = 20;

/// Login attempts permitted per client per window.
pub const LOGIN_MAX_ATTEMPTS: u32 = 5;

/// Login rate-limit window in seconds (15 minutes).
pub const LOGIN_WINDOW_SECS: u64 = 15 * 60;

/// Signup attempts permitted per client per window.
pub const SIGNUP_MAX_ATTEMPTS: u32 = 3;

/// Signup rate-limit window in seconds (1 hour).
pub const SIGNUP_WINDOW_SECS: u64 = 60 * 60;

/// Anomaly monitor lookback window in minutes.
pub const MONITOR_WINDOW_MINUTES: i64 = 5;

/// Default age, in hours, after which an unpaid order is auto-cancelled.
pub const DEFAULT_AUTO_CANCEL_HOURS: i64 = 24;

/// Fixed reason stamped onto auto-cancelled orders.
pub const AUTO_CANCEL_REASON: &str = "payment not received within the allowed window";

/// Default API listen port.
pub const DEFAULT_API_PORT: u16 = 8080;

/// Default post-authentication landing path.
pub const DEFAULT_REDIRECT_PATH: &str = "/";

/// Allowlisted top-level redirect paths. A candidate must equal one of
/// these or be a `/`-prefixed descendant of one.
pub const REDIRECT_ALLOWLIST: [&str; 5] = ["/account", "/orders", "/menu", "/checkout", "/admin"];
