use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::error::WatchError;

/// Resolve the IP address for a host name, IPv4 first unless `ipv6_only`.
///
/// Literal addresses are returned without a lookup.
pub async fn resolve_ip(
    target: &str,
    ipv6_only: bool,
    timeout: Duration,
) -> Result<IpAddr, WatchError> {
    if let Ok(ip) = target.parse::<IpAddr>() {
        return Ok(ip);
    }

    let lookup = tokio::net::lookup_host((target, 123));
    let addrs: Vec<SocketAddr> = tokio::time::timeout(timeout, lookup)
        .await
        .map_err(|_| WatchError::Dns(format!("lookup of '{target}' timed out")))?
        .map_err(|e| WatchError::Dns(e.to_string()))?
        .collect();

    pick_address(&addrs, ipv6_only).ok_or_else(|| {
        if ipv6_only {
            WatchError::Dns(format!("No IPv6 address found for '{}'", target))
        } else {
            WatchError::Dns(format!("No IP address found for '{}'", target))
        }
    })
}

fn pick_address(addrs: &[SocketAddr], ipv6_only: bool) -> Option<IpAddr> {
    let ips = addrs.iter().map(|a| a.ip());
    if ipv6_only {
        return ips.filter(IpAddr::is_ipv6).next();
    }
    let (v4, v6): (Vec<IpAddr>, Vec<IpAddr>) = ips.partition(IpAddr::is_ipv4);
    v4.into_iter().chain(v6).next()
}
