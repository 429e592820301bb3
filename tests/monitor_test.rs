use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use ntpwatch::{
    Alert, AlertKind, CycleOutcome, Diagnostics, HealthMonitor, HealthState, Measurement,
    MonitorConfig, Notifier, OffsetProbe, WatchError,
};

/// Replays a fixed list of measurements, one per attempt.
#[derive(Default)]
struct ScriptedProbe {
    script: Mutex<VecDeque<Measurement>>,
    calls: AtomicU32,
}

impl ScriptedProbe {
    fn push(&self, m: Measurement) {
        self.script.lock().unwrap().push_back(m);
    }

    fn offset(&self, o: f64) {
        self.push(Measurement::Offset(o));
    }

    fn fail(&self, times: usize) {
        for i in 0..times {
            self.push(Measurement::Failed(format!("timeout #{i}")));
        }
    }
}

impl OffsetProbe for ScriptedProbe {
    async fn measure(&self, _host: &str) -> Measurement {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Measurement::Failed("script exhausted".into()))
    }
}

#[derive(Default)]
struct FakeDiagnostics {
    runs: AtomicU32,
}

impl Diagnostics for FakeDiagnostics {
    async fn resolve_name(&self, _host: &str) -> (bool, Option<String>) {
        self.runs.fetch_add(1, Ordering::SeqCst);
        (true, Some("192.0.2.123".into()))
    }

    async fn ping(&self, _host: &str) -> (bool, Option<String>) {
        (false, None)
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<Alert>>,
    broken: AtomicBool,
}

impl RecordingNotifier {
    fn kinds(&self) -> Vec<AlertKind> {
        self.sent.lock().unwrap().iter().map(|a| a.kind).collect()
    }

    fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Notifier for RecordingNotifier {
    async fn send(&self, alert: &Alert) -> Result<(), WatchError> {
        self.sent.lock().unwrap().push(alert.clone());
        if self.broken.load(Ordering::SeqCst) {
            return Err(WatchError::Notify("telegram answered 502 Bad Gateway".into()));
        }
        Ok(())
    }
}

type Monitor = HealthMonitor<ScriptedProbe, FakeDiagnostics, RecordingNotifier>;

fn monitor(retries: u32) -> Monitor {
    let config = MonitorConfig {
        server: "ntp.test".into(),
        threshold: 0.5,
        retries,
        retry_delay: Duration::ZERO,
        location: Some("lab".into()),
        ..MonitorConfig::default()
    };
    HealthMonitor::new(
        &config,
        ScriptedProbe::default(),
        FakeDiagnostics::default(),
        RecordingNotifier::default(),
    )
}

#[tokio::test]
async fn scenario_a_in_range_offset_is_silent() {
    let m = monitor(1);
    let mut state = HealthState::default();
    m.probe().offset(0.1);

    let report = m.evaluate(&mut state).await;

    assert_eq!(
        report.outcome,
        CycleOutcome::Measured {
            offset: 0.1,
            attempts: 1
        }
    );
    assert!(report.alerts.is_empty());
    assert_eq!(state, HealthState::default());
    assert_eq!(m.notifier().count(), 0);
}

#[tokio::test]
async fn scenario_b_offset_excursion_and_recovery() {
    let m = monitor(1);
    let mut state = HealthState::default();
    m.probe().offset(0.8);
    m.probe().offset(0.2);

    let first = m.evaluate(&mut state).await;
    assert_eq!(first.alerts.len(), 1);
    assert_eq!(first.alerts[0].kind, AlertKind::OffsetDegraded);
    assert!(first.alerts[0].text.contains("0.8"));
    assert!(first.alerts[0].text.contains("0.5"));
    assert!(first.alerts[0].text.starts_with("[lab] "));
    assert!(!state.offset_in_range);

    let second = m.evaluate(&mut state).await;
    assert_eq!(second.alerts.len(), 1);
    assert_eq!(second.alerts[0].kind, AlertKind::OffsetRecovered);
    assert!(state.offset_in_range);

    assert_eq!(
        m.notifier().kinds(),
        vec![AlertKind::OffsetDegraded, AlertKind::OffsetRecovered]
    );
}

#[tokio::test]
async fn scenario_c_outage_alerts_once_then_recovers_once() {
    let m = monitor(3);
    let mut state = HealthState::default();
    m.probe().fail(3);
    m.probe().fail(3);
    m.probe().offset(0.05);

    let first = m.evaluate(&mut state).await;
    assert_eq!(
        first.outcome,
        CycleOutcome::Unreachable {
            attempts: 3,
            error: "timeout #2".into()
        }
    );
    assert_eq!(first.alerts.len(), 1);
    let alert = &first.alerts[0];
    assert_eq!(alert.kind, AlertKind::Unreachable);
    assert!(alert.text.contains("after 3 attempts"));
    assert!(alert.text.contains("DNS: Resolved (192.0.2.123)"));
    assert!(alert.text.contains("Ping: Failed"));
    assert!(!state.reachable);

    let second = m.evaluate(&mut state).await;
    assert!(second.alerts.is_empty());
    assert!(!state.reachable);

    let third = m.evaluate(&mut state).await;
    assert_eq!(third.alerts.len(), 1);
    assert_eq!(third.alerts[0].kind, AlertKind::Reachable);
    assert!(state.reachable);

    assert_eq!(m.probe().calls.load(Ordering::SeqCst), 7);
    // diagnostics only on the first failed cycle
    assert_eq!(m.diagnostics().runs.load(Ordering::SeqCst), 1);
    assert_eq!(
        m.notifier().kinds(),
        vec![AlertKind::Unreachable, AlertKind::Reachable]
    );
}

#[tokio::test]
async fn scenario_d_state_commits_despite_delivery_failure() {
    let m = monitor(1);
    m.notifier().broken.store(true, Ordering::SeqCst);
    let mut state = HealthState::default();
    m.probe().offset(0.8);
    m.probe().offset(0.9);

    let report = m.evaluate(&mut state).await;
    assert_eq!(report.failed_deliveries, 1);
    assert_eq!(report.alerts[0].kind, AlertKind::OffsetDegraded);
    assert!(!state.offset_in_range);

    // no redelivery on the next cycle
    let report = m.evaluate(&mut state).await;
    assert!(report.alerts.is_empty());
    assert_eq!(report.failed_deliveries, 0);
    assert_eq!(m.notifier().count(), 1);
}

#[tokio::test]
async fn single_success_within_budget_keeps_reachable() {
    for retries in 1..=5u32 {
        let m = monitor(retries);
        let mut state = HealthState::default();
        m.probe().fail(retries as usize - 1);
        m.probe().offset(0.0);

        let report = m.evaluate(&mut state).await;

        assert_eq!(
            report.outcome,
            CycleOutcome::Measured {
                offset: 0.0,
                attempts: retries
            }
        );
        assert!(report.alerts.is_empty(), "retries={retries}");
        assert!(state.reachable);
        assert_eq!(m.diagnostics().runs.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn long_outage_is_one_alert_pair() {
    let m = monitor(2);
    let mut state = HealthState::default();
    let k = 6;
    for _ in 0..k {
        m.probe().fail(2);
    }
    m.probe().offset(0.01);

    for _ in 0..=k {
        m.evaluate(&mut state).await;
    }

    assert_eq!(
        m.notifier().kinds(),
        vec![AlertKind::Unreachable, AlertKind::Reachable]
    );
}

#[tokio::test]
async fn unchanged_stream_is_idempotent() {
    let m = monitor(1);
    let mut state = HealthState::default();
    for _ in 0..5 {
        m.probe().offset(1.5);
    }
    for _ in 0..5 {
        m.evaluate(&mut state).await;
    }
    assert_eq!(m.notifier().kinds(), vec![AlertKind::OffsetDegraded]);
}

#[tokio::test]
async fn outage_does_not_touch_offset_flag() {
    let m = monitor(1);
    let mut state = HealthState::default();
    m.probe().offset(2.0);
    m.probe().fail(1);
    m.probe().offset(0.1);

    m.evaluate(&mut state).await;
    m.evaluate(&mut state).await;
    assert!(!state.offset_in_range);
    assert!(!state.reachable);

    let report = m.evaluate(&mut state).await;
    let kinds: Vec<_> = report.alerts.iter().map(|a| a.kind).collect();
    assert_eq!(kinds, vec![AlertKind::OffsetRecovered, AlertKind::Reachable]);
    assert!(state.is_healthy());
}

#[tokio::test]
async fn restart_forgets_outage() {
    let m = monitor(1);
    let mut state = HealthState::default();
    m.probe().fail(1);
    m.evaluate(&mut state).await;
    assert!(!state.reachable);

    // a fresh process starts from the default state
    let mut state = HealthState::default();
    m.probe().offset(0.0);
    let report = m.evaluate(&mut state).await;
    assert!(report.alerts.is_empty());
}
