//! Configuration for the Forkline core.
//!
//! Everything is overridable from the environment; defaults come from
//! [`crate::constants`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ForklineError, Result, constants};

/// Core runtime configuration, shared by the HTTP surface and the two
/// timer-driven jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// API listen port.
    pub port: u16,
    /// Static bearer secret guarding the timer-triggered endpoints.
    pub cron_secret: String,
    /// Age after which an unpaid order is auto-cancelled.
    pub auto_cancel_after_hours: i64,
}

impl CoreConfig {
    /// Load from the environment. `FORKLINE_CRON_SECRET` is mandatory —
    /// refusing to start beats running the timer endpoints unguarded.
    pub fn from_env() -> Result<Self> {
        let port = match std::env::var("FORKLINE_PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|_| {
                ForklineError::Configuration(format!("FORKLINE_PORT is not a port: {raw}"))
            })?,
            Err(_) => constants::DEFAULT_API_PORT,
        };
        let cron_secret = std::env::var("FORKLINE_CRON_SECRET")
            .map_err(|_| ForklineError::Configuration("FORKLINE_CRON_SECRET is not set".into()))?;
        if cron_secret.is_empty() {
            return Err(ForklineError::Configuration(
                "FORKLINE_CRON_SECRET is empty".into(),
            ));
        }
        let auto_cancel_after_hours = match std::env::var("FORKLINE_AUTO_CANCEL_HOURS") {
            Ok(raw) => raw.parse::<i64>().ok().filter(|h| *h > 0).ok_or_else(|| {
                ForklineError::Configuration(format!(
                    "FORKLINE_AUTO_CANCEL_HOURS must be a positive integer, got {raw}"
                ))
            })?,
            Err(_) => constants::DEFAULT_AUTO_CANCEL_HOURS,
        };
        Ok(Self {
            port,
            cron_secret,
            auto_cancel_after_hours,
        })
    }

    /// The auto-cancel cutoff as a duration.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn auto_cancel_timeout(&self) -> Duration {
        Duration::from_secs(self.auto_cancel_after_hours as u64 * 3600)
    }
}

/// A test-friendly default: local port, throwaway secret, stock timeout.
impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            port: constants::DEFAULT_API_PORT,
            cron_secret: "dev-secret".into(),
            auto_cancel_after_hours: constants::DEFAULT_AUTO_CANCEL_HOURS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_is_a_day() {
        let config = CoreConfig::default();
        assert_eq!(config.auto_cancel_timeout(), Duration::from_secs(86_400));
    }
}
