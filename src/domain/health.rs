/// Outcome of a single offset probe attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum Measurement {
    /// Clock offset against the reference, in seconds.
    Offset(f64),
    /// Description of the transport, protocol or timeout failure.
    Failed(String),
}

impl Measurement {
    pub fn into_result(self) -> Result<f64, String> {
        match self {
            Measurement::Offset(o) => Ok(o),
            Measurement::Failed(e) => Err(e),
        }
    }
}

/// Diagnostic context gathered once reachability is lost.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiagnosticReport {
    pub dns_resolved: bool,
    pub resolved_address: Option<String>,
    pub ping_reachable: bool,
    pub ping_latency: Option<String>,
}

impl DiagnosticReport {
    pub fn dns_line(&self) -> String {
        match (self.dns_resolved, &self.resolved_address) {
            (true, Some(addr)) => format!("DNS: Resolved ({addr})"),
            (true, None) => "DNS: Resolved".to_string(),
            (false, _) => "DNS: Failed".to_string(),
        }
    }

    pub fn ping_line(&self) -> String {
        match (self.ping_reachable, &self.ping_latency) {
            (true, Some(latency)) => format!("Ping: Reachable ({latency})"),
            (true, None) => "Ping: Reachable".to_string(),
            (false, _) => "Ping: Failed".to_string(),
        }
    }
}

/// A flag flip observed during one cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Edge {
    OffsetDegraded { offset: f64, threshold: f64 },
    OffsetRecovered { offset: f64, threshold: f64 },
    Unreachable,
    Reachable,
}

/// Health flags of the monitored server.
///
/// Both flags start healthy: nothing is reported for a server that was never
/// seen unhealthy. State is kept in memory only, so a restart during an
/// outage forgets it and the matching recovery alert is never sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HealthState {
    pub reachable: bool,
    pub offset_in_range: bool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            reachable: true,
            offset_in_range: true,
        }
    }
}

impl HealthState {
    /// Apply a successful measurement and return the edges it caused.
    ///
    /// The offset edge (if any) comes first, then the reachability recovery.
    pub fn observe_offset(&mut self, offset: f64, threshold: f64) -> Vec<Edge> {
        let mut edges = Vec::with_capacity(2);
        let out_of_range = offset.abs() > threshold;

        if out_of_range && self.offset_in_range {
            self.offset_in_range = false;
            edges.push(Edge::OffsetDegraded { offset, threshold });
        } else if !out_of_range && !self.offset_in_range {
            self.offset_in_range = true;
            edges.push(Edge::OffsetRecovered { offset, threshold });
        }

        if !self.reachable {
            self.reachable = true;
            edges.push(Edge::Reachable);
        }
        edges
    }

    /// Record that every attempt of a cycle failed.
    ///
    /// Returns the `Unreachable` edge only on the first failed cycle of an
    /// outage. The offset flag is left alone.
    pub fn observe_unreachable(&mut self) -> Option<Edge> {
        if self.reachable {
            self.reachable = false;
            Some(Edge::Unreachable)
        } else {
            None
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.reachable && self.offset_in_range
    }
}
