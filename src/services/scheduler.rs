use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::domain::health::HealthState;
use crate::services::diagnostics::Diagnostics;
use crate::services::monitor::HealthMonitor;
use crate::services::notify::Notifier;
use crate::services::probe::OffsetProbe;

/// Evaluate `monitor`, then sleep `interval`, until `max_cycles` is reached
/// or a shutdown message arrives. Returns the number of completed cycles.
///
/// The first cycle runs immediately. The full `interval` is slept after every
/// cycle, however long the cycle took, so cycles never overlap.
pub async fn run<P, D, N>(
    monitor: &HealthMonitor<P, D, N>,
    state: &mut HealthState,
    interval: Duration,
    max_cycles: Option<u64>,
    mut shutdown: broadcast::Receiver<()>,
) -> u64
where
    P: OffsetProbe,
    D: Diagnostics,
    N: Notifier,
{
    let mut cycles = 0u64;
    info!(server = monitor.server(), ?interval, "monitoring started");
    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                info!("shutdown requested during a check");
                break;
            }
            report = monitor.evaluate(state) => {
                cycles += 1;
                debug!(
                    cycle = cycles,
                    outcome = ?report.outcome,
                    alerts = report.alerts.len(),
                    "cycle done"
                );
            }
        }
        if max_cycles.is_some_and(|max| cycles >= max) {
            break;
        }
        tokio::select! {
            _ = tokio::time::sleep(interval) => {},
            _ = shutdown.recv() => {
                info!("shutdown requested");
                break;
            }
        }
    }
    cycles
}
