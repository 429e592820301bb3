//! Edge-triggered health evaluation of a single NTP server.
//!
//! One call to [`HealthMonitor::evaluate`] is one poll cycle:
//!
//! 1. measure the offset, retrying per the [`RetryPolicy`];
//! 2. on success, compare against the threshold and flip the offset and
//!    reachability flags of [`HealthState`] where they changed;
//! 3. when every attempt failed, flip `reachable` to false once per outage,
//!    gathering DNS and ping diagnostics for the alert.
//!
//! Alerts are produced only for flag flips. Flags are committed before any
//! delivery is attempted, and a failed delivery is logged and dropped.

use chrono::Utc;
use tracing::{error, info, instrument};

use crate::config::MonitorConfig;
use crate::domain::health::{Edge, HealthState};
use crate::fmt::alert::{Alert, AlertComposer};
use crate::services::diagnostics::Diagnostics;
use crate::services::notify::Notifier;
use crate::services::probe::OffsetProbe;
use crate::services::retry::{Exhausted, RetryPolicy};

/// What the probe loop concluded this cycle.
#[derive(Clone, Debug, PartialEq)]
pub enum CycleOutcome {
    Measured { offset: f64, attempts: u32 },
    Unreachable { attempts: u32, error: String },
}

/// Result of one poll cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct CycleReport {
    pub outcome: CycleOutcome,
    pub alerts: Vec<Alert>,
    pub failed_deliveries: usize,
}

pub struct HealthMonitor<P, D, N> {
    server: String,
    threshold: f64,
    retry: RetryPolicy,
    composer: AlertComposer,
    probe: P,
    diagnostics: D,
    notifier: N,
}

impl<P, D, N> HealthMonitor<P, D, N>
where
    P: OffsetProbe,
    D: Diagnostics,
    N: Notifier,
{
    pub fn new(config: &MonitorConfig, probe: P, diagnostics: D, notifier: N) -> Self {
        Self {
            server: config.server.clone(),
            threshold: config.threshold,
            retry: RetryPolicy::new(config.retries, config.retry_delay),
            composer: AlertComposer::new(config.server.clone(), config.location.clone()),
            probe,
            diagnostics,
            notifier,
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Run one poll cycle against `state`.
    #[instrument(skip_all, fields(server = %self.server))]
    pub async fn evaluate(&self, state: &mut HealthState) -> CycleReport {
        let measured = self
            .retry
            .run(move |_| async move { self.probe.measure(&self.server).await.into_result() })
            .await;
        let now = Utc::now();

        let (outcome, alerts) = match measured {
            Ok((offset, attempts)) => {
                info!("NTP Server: {}, Offset: {:.6} seconds", self.server, offset);
                let alerts: Vec<Alert> = state
                    .observe_offset(offset, self.threshold)
                    .iter()
                    .filter_map(|edge| self.composer.edge(edge, now))
                    .collect();
                (CycleOutcome::Measured { offset, attempts }, alerts)
            }
            Err(Exhausted {
                attempts,
                last_error,
            }) => {
                error!(attempts, error = %last_error, "server unreachable");
                let mut alerts = Vec::new();
                if let Some(Edge::Unreachable) = state.observe_unreachable() {
                    let report = self.diagnostics.report(&self.server).await;
                    info!(dns = %report.dns_line(), ping = %report.ping_line(), "diagnostics");
                    alerts.push(self.composer.unreachable(attempts, &last_error, &report, now));
                }
                (
                    CycleOutcome::Unreachable {
                        attempts,
                        error: last_error,
                    },
                    alerts,
                )
            }
        };

        let failed_deliveries = self.deliver(&alerts).await;
        CycleReport {
            outcome,
            alerts,
            failed_deliveries,
        }
    }

    async fn deliver(&self, alerts: &[Alert]) -> usize {
        let mut failed = 0;
        for alert in alerts {
            info!(kind = ?alert.kind, "sending alert");
            if let Err(e) = self.notifier.send(alert).await {
                error!(kind = ?alert.kind, error = %e, "Failed to send alert");
                failed += 1;
            }
        }
        failed
    }
}
