use std::future::Future;
use std::sync::Arc;

use tracing::warn;

use crate::adapters::telegram::TelegramNotifier;
use crate::config::MonitorConfig;
use crate::error::WatchError;
use crate::fmt::alert::Alert;

/// Delivery channel for operator alerts.
///
/// A failed delivery is reported to the caller, which only logs it.
pub trait Notifier {
    fn send(&self, alert: &Alert) -> impl Future<Output = Result<(), WatchError>> + Send;
}

impl<N: Notifier + Send + Sync> Notifier for Arc<N> {
    fn send(&self, alert: &Alert) -> impl Future<Output = Result<(), WatchError>> + Send {
        (**self).send(alert)
    }
}

/// Writes alerts to the log when no alerting endpoint is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn send(&self, alert: &Alert) -> Result<(), WatchError> {
        warn!(kind = ?alert.kind, "{}", alert.text);
        Ok(())
    }
}

/// Notifier selected from the runtime configuration.
#[derive(Clone, Debug)]
pub enum AlertSink {
    Telegram(TelegramNotifier),
    Log(LogNotifier),
}

impl AlertSink {
    pub fn from_config(config: &MonitorConfig) -> Result<Self, WatchError> {
        match &config.telegram {
            Some(tg) => Ok(AlertSink::Telegram(TelegramNotifier::new(
                &tg.api_url,
                &tg.token,
                &tg.chat_id,
                config.timeout,
            )?)),
            None => {
                warn!("no telegram credentials configured, alerts go to the log only");
                Ok(AlertSink::Log(LogNotifier))
            }
        }
    }
}

impl Notifier for AlertSink {
    async fn send(&self, alert: &Alert) -> Result<(), WatchError> {
        match self {
            AlertSink::Telegram(n) => n.send(alert).await,
            AlertSink::Log(n) => n.send(alert).await,
        }
    }
}
