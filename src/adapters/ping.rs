//! ICMP reachability check through the system `ping` binary.

use std::process::Stdio;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use tokio::process::Command;

use crate::error::WatchError;

fn ping_args(host: &str, ipv6: bool, timeout: Duration) -> Vec<String> {
    let wait_secs = timeout.as_secs().max(1);
    let mut args = Vec::with_capacity(6);
    if ipv6 {
        args.push("-6".to_string());
    }
    args.extend(["-c".to_string(), "1".to_string(), "-W".to_string(), wait_secs.to_string()]);
    args.push(host.to_string());
    args
}

/// Send a single echo request and return the round trip time in milliseconds.
pub async fn ping_once(host: &str, ipv6: bool, timeout: Duration) -> Result<f64, WatchError> {
    let mut cmd = Command::new("ping");
    cmd.args(ping_args(host, ipv6, timeout))
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // -W is not honored everywhere, bound the whole run as well
    let output = tokio::time::timeout(timeout + Duration::from_secs(1), cmd.output())
        .await
        .map_err(|_| WatchError::Timeout(timeout))?
        .map_err(|e| WatchError::Other(format!("failed to execute ping: {}", e)))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !output.status.success() {
        if stdout.contains("100% packet loss") || stdout.contains("100.0% packet loss") {
            return Err(WatchError::Timeout(timeout));
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(WatchError::Network(format!("ping failed: {}", stderr.trim())));
    }

    parse_ping_output(&stdout)
}

/// Extract the latency in milliseconds from `ping` output.
fn parse_ping_output(output: &str) -> Result<f64, WatchError> {
    static PER_PACKET: OnceLock<Regex> = OnceLock::new();
    static SUMMARY: OnceLock<Regex> = OnceLock::new();

    let per_packet = PER_PACKET
        .get_or_init(|| Regex::new(r"time[=<](?P<val>[0-9.]+)\s*ms").expect("valid regex"));
    if let Some(ms) = per_packet
        .captures(output)
        .and_then(|c| c.name("val"))
        .and_then(|m| m.as_str().parse::<f64>().ok())
    {
        return Ok(ms);
    }

    // "rtt min/avg/max/mdev" on Linux, "round-trip min/avg/max/stddev" on macOS
    let summary = SUMMARY.get_or_init(|| {
        Regex::new(
            r"(?:rtt|round-trip)\s+min/avg/max/(?:mdev|stddev)\s*=\s*([0-9.]+)/([0-9.]+)/([0-9.]+)",
        )
        .expect("valid regex")
    });
    if let Some(ms) = summary
        .captures(output)
        .and_then(|c| c.get(2))
        .and_then(|m| m.as_str().parse::<f64>().ok())
    {
        return Ok(ms);
    }

    Err(WatchError::Other(format!(
        "failed to parse ping output: {}",
        output
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipv6_mode_passes_family_flag() {
        assert_eq!(
            ping_args("ntp.lab", true, Duration::from_secs(5)),
            ["-6", "-c", "1", "-W", "5", "ntp.lab"]
        );
        assert_eq!(
            ping_args("ntp.lab", false, Duration::from_millis(300)),
            ["-c", "1", "-W", "1", "ntp.lab"]
        );
    }

    #[test]
    fn parses_linux_reply_line() {
        let output = "64 bytes from 8.8.8.8: icmp_seq=1 ttl=117 time=12.345 ms";
        let ms = parse_ping_output(output).unwrap();
        assert!((ms - 12.345).abs() < 1e-9);
    }

    #[test]
    fn parses_sub_millisecond_reply() {
        let output = "64 bytes from 127.0.0.1: icmp_seq=1 ttl=64 time<1 ms";
        let ms = parse_ping_output(output).unwrap();
        assert!((ms - 1.0).abs() < 1e-9);
    }

    #[test]
    fn parses_macos_summary() {
        let output = r#"PING google.com (142.250.69.174): 56 data bytes

--- google.com ping statistics ---
1 packets transmitted, 1 packets received, 0.0% packet loss
round-trip min/avg/max/stddev = 17.906/17.906/17.906/0.000 ms"#;
        let ms = parse_ping_output(output).unwrap();
        assert!((ms - 17.906).abs() < 1e-9);
    }

    #[test]
    fn parses_linux_summary() {
        let output = r#"--- 8.8.8.8 ping statistics ---
1 packets transmitted, 1 received, 0% packet loss, time 0ms
rtt min/avg/max/mdev = 12.300/12.300/12.300/0.000 ms"#;
        let ms = parse_ping_output(output).unwrap();
        assert!((ms - 12.3).abs() < 1e-9);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_ping_output("ping: unknown host").is_err());
    }
}
