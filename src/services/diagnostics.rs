use std::future::Future;
use std::net::IpAddr;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::adapters::{ping, resolver};
use crate::domain::health::DiagnosticReport;
use crate::services::probe::parse_target;

/// Best-effort triage probes run once reachability is lost.
///
/// Implementations never fail: a failed check is reported as `(false, None)`.
pub trait Diagnostics: Sync {
    fn resolve_name(&self, host: &str) -> impl Future<Output = (bool, Option<String>)> + Send;

    fn ping(&self, host: &str) -> impl Future<Output = (bool, Option<String>)> + Send;

    /// Run both checks concurrently.
    fn report(&self, host: &str) -> impl Future<Output = DiagnosticReport> + Send {
        async move {
            let ((dns_resolved, resolved_address), (ping_reachable, ping_latency)) =
                futures::join!(self.resolve_name(host), self.ping(host));
            DiagnosticReport {
                dns_resolved,
                resolved_address,
                ping_reachable,
                ping_latency,
            }
        }
    }
}

/// Diagnostics against the system resolver and `ping` binary.
#[derive(Clone, Debug)]
pub struct SystemDiagnostics {
    pub timeout: Duration,
    pub ipv6_only: bool,
}

impl SystemDiagnostics {
    pub fn new(timeout: Duration, ipv6_only: bool) -> Self {
        Self { timeout, ipv6_only }
    }
}

fn host_part(target: &str) -> &str {
    parse_target(target).map(|t| t.host).unwrap_or(target)
}

/// Address as shown in the alert, flagging an IPv4 answer in IPv6-only mode.
fn describe_address(ip: IpAddr, ipv6_only: bool) -> String {
    if ipv6_only && ip.is_ipv4() {
        format!("{ip}, no IPv6 address")
    } else {
        ip.to_string()
    }
}

impl Diagnostics for SystemDiagnostics {
    #[instrument(skip(self))]
    async fn resolve_name(&self, host: &str) -> (bool, Option<String>) {
        let host = host_part(host);
        let mut resolved = resolver::resolve_ip(host, self.ipv6_only, self.timeout).await;
        if resolved.is_err() && self.ipv6_only {
            // the name may still exist with IPv4 addresses only
            resolved = resolver::resolve_ip(host, false, self.timeout).await;
        }
        match resolved {
            Ok(ip) => (true, Some(describe_address(ip, self.ipv6_only))),
            Err(e) => {
                debug!(error = %e, "name resolution failed");
                (false, None)
            }
        }
    }

    #[instrument(skip(self))]
    async fn ping(&self, host: &str) -> (bool, Option<String>) {
        match ping::ping_once(host_part(host), self.ipv6_only, self.timeout).await {
            Ok(ms) => (true, Some(format!("{ms:.3} ms"))),
            Err(e) => {
                debug!(error = %e, "ping failed");
                (false, None)
            }
        }
    }
}
