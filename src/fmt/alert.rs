use chrono::{DateTime, Utc};

use crate::domain::health::{DiagnosticReport, Edge};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertKind {
    OffsetDegraded,
    OffsetRecovered,
    Unreachable,
    Reachable,
}

/// Fully rendered operator message, ready for a [`Notifier`](crate::services::notify::Notifier).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub text: String,
}

/// Builds alert texts for one monitored server.
#[derive(Clone, Debug)]
pub struct AlertComposer {
    host: String,
    location: Option<String>,
}

impl AlertComposer {
    pub fn new(host: impl Into<String>, location: Option<String>) -> Self {
        let location = location.filter(|l| !l.trim().is_empty());
        Self {
            host: host.into(),
            location,
        }
    }

    fn prefix(&self) -> String {
        match &self.location {
            Some(loc) => format!("[{}] ", loc.trim()),
            None => String::new(),
        }
    }

    fn footer(at: DateTime<Utc>) -> String {
        format!("\nObserved: {}", at.format("%Y-%m-%d %H:%M:%S UTC"))
    }

    /// Render an offset or recovery edge.
    ///
    /// `Edge::Unreachable` needs diagnostics and goes through [`Self::unreachable`].
    pub fn edge(&self, edge: &Edge, at: DateTime<Utc>) -> Option<Alert> {
        let (kind, body) = match *edge {
            Edge::OffsetDegraded { offset, threshold } => (
                AlertKind::OffsetDegraded,
                format!(
                    "⚠️ Alert: NTP server {} offset is out of range!\nOffset: {:.6} seconds\nThreshold: {} seconds",
                    self.host, offset, threshold
                ),
            ),
            Edge::OffsetRecovered { offset, threshold } => (
                AlertKind::OffsetRecovered,
                format!(
                    "✅ Recovery: NTP server {} offset is back within range.\nOffset: {:.6} seconds\nThreshold: {} seconds",
                    self.host, offset, threshold
                ),
            ),
            Edge::Reachable => (
                AlertKind::Reachable,
                format!("✅ Recovery: NTP server {} is back online.", self.host),
            ),
            Edge::Unreachable => return None,
        };
        Some(Alert {
            kind,
            text: format!("{}{}{}", self.prefix(), body, Self::footer(at)),
        })
    }

    pub fn unreachable(
        &self,
        attempts: u32,
        error: &str,
        report: &DiagnosticReport,
        at: DateTime<Utc>,
    ) -> Alert {
        let text = format!(
            "{prefix}🚨 Alert: Unable to reach NTP server {host} after {attempts} attempt{s}.\nError: {error}\n{dns}\n{ping}{footer}",
            prefix = self.prefix(),
            host = self.host,
            s = if attempts == 1 { "" } else { "s" },
            dns = report.dns_line(),
            ping = report.ping_line(),
            footer = Self::footer(at),
        );
        Alert {
            kind: AlertKind::Unreachable,
            text,
        }
    }
}
