//! ntpwatch library: edge-triggered NTP health monitoring.

pub mod adapters;
pub mod config;
pub mod domain;
mod error;
pub mod fmt;
pub mod services;

pub use config::{MonitorConfig, TelegramConfig};
pub use domain::health::{DiagnosticReport, Edge, HealthState, Measurement};
pub use error::WatchError;
pub use fmt::alert::{Alert, AlertComposer, AlertKind};
pub use services::diagnostics::{Diagnostics, SystemDiagnostics};
pub use services::monitor::{CycleOutcome, CycleReport, HealthMonitor};
pub use services::notify::{AlertSink, LogNotifier, Notifier};
pub use services::probe::{NtpProbe, OffsetProbe};
pub use services::retry::{Exhausted, RetryPolicy};
