use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use rsntp::{AsyncSntpClient, Config};

use crate::error::WatchError;

/// Query an NTP server once and return its clock offset in seconds.
pub async fn query_offset(ip: IpAddr, port: u16, timeout: Duration) -> Result<f64, WatchError> {
    let cfg = if ip.is_ipv6() {
        Config::default().bind_address((Ipv6Addr::UNSPECIFIED, 0).into())
    } else {
        Config::default().bind_address(([0, 0, 0, 0], 0).into())
    };
    let client = AsyncSntpClient::with_config(cfg);
    // rsntp does not expose explicit timeout; rely on tokio timeout
    let fut = client.synchronize(SocketAddr::new(ip, port).to_string());
    let res = tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| WatchError::Timeout(timeout))??;
    Ok(res.clock_offset().as_secs_f64())
}
