use std::future::Future;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::adapters::{ntp_client, resolver};
use crate::domain::health::Measurement;
use crate::error::WatchError;

pub const NTP_PORT: u16 = 123;

/// Source of clock offset measurements. One call is one attempt.
pub trait OffsetProbe {
    fn measure(&self, host: &str) -> impl Future<Output = Measurement> + Send;
}

/// Parsed view of a target string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTarget<'a> {
    pub host: &'a str,
    pub port: Option<u16>,
    pub is_ipv6_literal: bool,
}

fn parse_port(s: &str) -> Result<u16, WatchError> {
    match s.parse::<u16>() {
        Ok(0) | Err(_) => Err(WatchError::Config(format!("invalid port: '{s}'"))),
        Ok(p) => Ok(p),
    }
}

/// Split `host`, `host:port`, `[v6]`, `[v6]:port` or a bare IPv6 literal.
pub fn parse_target(input: &str) -> Result<ParsedTarget<'_>, WatchError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(WatchError::Config("empty target".into()));
    }

    if let Some(rest) = s.strip_prefix('[') {
        let Some((host, tail)) = rest.split_once(']') else {
            return Err(WatchError::Config(format!("missing closing ']' in '{s}'")));
        };
        let port = match tail {
            "" => None,
            _ => match tail.strip_prefix(':') {
                Some(p) => Some(parse_port(p)?),
                None => {
                    return Err(WatchError::Config(format!(
                        "unexpected trailing characters in '{s}'"
                    )));
                }
            },
        };
        return Ok(ParsedTarget {
            host,
            port,
            is_ipv6_literal: true,
        });
    }

    match s.matches(':').count() {
        0 => Ok(ParsedTarget {
            host: s,
            port: None,
            is_ipv6_literal: false,
        }),
        1 => {
            let (host, port) = s.split_once(':').unwrap_or((s, ""));
            if host.is_empty() {
                return Err(WatchError::Config(format!("missing host before port in '{s}'")));
            }
            Ok(ParsedTarget {
                host,
                port: Some(parse_port(port)?),
                is_ipv6_literal: false,
            })
        }
        _ => Ok(ParsedTarget {
            host: s,
            port: None,
            is_ipv6_literal: true,
        }),
    }
}

/// SNTP probe backed by rsntp.
#[derive(Clone, Debug)]
pub struct NtpProbe {
    pub timeout: Duration,
    pub ipv6_only: bool,
}

impl NtpProbe {
    pub fn new(timeout: Duration, ipv6_only: bool) -> Self {
        Self { timeout, ipv6_only }
    }

    async fn query(&self, target: &str) -> Result<f64, WatchError> {
        let parsed = parse_target(target)?;
        let ipv6 = self.ipv6_only || parsed.is_ipv6_literal;
        let ip = resolver::resolve_ip(parsed.host, ipv6, self.timeout).await?;
        let port = parsed.port.unwrap_or(NTP_PORT);
        debug!(%ip, port, "querying");
        ntp_client::query_offset(ip, port, self.timeout).await
    }
}

impl OffsetProbe for NtpProbe {
    #[instrument(skip(self))]
    async fn measure(&self, host: &str) -> Measurement {
        match self.query(host).await {
            Ok(offset) => Measurement::Offset(offset),
            Err(e) => Measurement::Failed(e.to_string()),
        }
    }
}
