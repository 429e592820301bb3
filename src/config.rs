//! Validated runtime configuration.

use std::time::Duration;

use crate::adapters::telegram::DEFAULT_API_URL;
use crate::error::WatchError;
use crate::services::probe::parse_target;

/// Telegram bot credentials.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TelegramConfig {
    pub api_url: String,
    pub token: String,
    pub chat_id: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MonitorConfig {
    /// Probe target, `host` or `host:port`.
    pub server: String,
    /// Largest acceptable absolute offset, in seconds.
    pub threshold: f64,
    pub interval: Duration,
    /// Probe attempts per cycle before the server is declared unreachable.
    pub retries: u32,
    pub retry_delay: Duration,
    /// Bound applied to each NTP, DNS, ping and HTTP call.
    pub timeout: Duration,
    pub location: Option<String>,
    pub ipv6_only: bool,
    pub telegram: Option<TelegramConfig>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            server: "pool.ntp.org".to_string(),
            threshold: 0.5,
            interval: Duration::from_secs(60),
            retries: 1,
            retry_delay: Duration::from_secs(5),
            timeout: Duration::from_secs(5),
            location: None,
            ipv6_only: false,
            telegram: None,
        }
    }
}

fn seconds(name: &str, value: f64, allow_zero: bool) -> Result<Duration, WatchError> {
    let valid = value.is_finite() && if allow_zero { value >= 0.0 } else { value > 0.0 };
    if !valid {
        let bound = if allow_zero { ">= 0" } else { "> 0" };
        return Err(WatchError::Config(format!("{name} must be {bound} seconds, got {value}")));
    }
    Duration::try_from_secs_f64(value).map_err(|e| WatchError::Config(format!("{name}: {e}")))
}

impl MonitorConfig {
    /// Build a configuration from raw option values, rejecting anything the
    /// poll loop could not run with.
    #[allow(clippy::too_many_arguments)]
    pub fn from_raw(
        server: &str,
        threshold: f64,
        interval_secs: f64,
        retries: u32,
        retry_delay_secs: f64,
        timeout_secs: f64,
        location: Option<String>,
        ipv6_only: bool,
        telegram_token: Option<String>,
        telegram_chat_id: Option<String>,
        telegram_api: Option<String>,
    ) -> Result<Self, WatchError> {
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        let telegram = match (present(telegram_token), present(telegram_chat_id)) {
            (Some(token), Some(chat_id)) => Some(TelegramConfig {
                api_url: present(telegram_api).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
                token,
                chat_id,
            }),
            (None, None) => None,
            _ => {
                return Err(WatchError::Config(
                    "telegram token and chat id must be given together".into(),
                ));
            }
        };

        let cfg = Self {
            server: server.trim().to_string(),
            threshold,
            interval: seconds("interval", interval_secs, false)?,
            retries,
            retry_delay: seconds("retry delay", retry_delay_secs, true)?,
            timeout: seconds("timeout", timeout_secs, false)?,
            location: location.filter(|l| !l.trim().is_empty()),
            ipv6_only,
            telegram,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), WatchError> {
        parse_target(&self.server)?;
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(WatchError::Config(format!(
                "threshold must be > 0 seconds, got {}",
                self.threshold
            )));
        }
        if self.interval.is_zero() {
            return Err(WatchError::Config("interval must be > 0 seconds".into()));
        }
        if self.retries == 0 {
            return Err(WatchError::Config("retries must be at least 1".into()));
        }
        if self.timeout.is_zero() {
            return Err(WatchError::Config("timeout must be > 0 seconds".into()));
        }
        Ok(())
    }
}
