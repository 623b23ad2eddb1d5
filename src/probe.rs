//! Single-shot reachability probes
//!
//! Unprivileged ICMP is not available everywhere, so reachability is
//! approximated with a timed TCP connect to a configurable port. A probe
//! always produces a `ProbeResult` value; failures are absorbed, never
//! raised past this boundary.

use crate::config::PingConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Outcome of one reachability probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub timestamp: DateTime<Utc>,
    pub host: String,
    pub success: bool,
    pub latency_ms: Option<u64>,
    pub message: String,
}

impl ProbeResult {
    fn reply(host: &str, latency_ms: u64) -> Self {
        Self {
            timestamp: Utc::now(),
            host: host.to_string(),
            success: true,
            latency_ms: Some(latency_ms),
            message: format!("Reply from {}: time={}ms", host, latency_ms),
        }
    }

    fn timed_out(host: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            host: host.to_string(),
            success: false,
            latency_ms: None,
            message: format!("Request timeout for {}", host),
        }
    }

    fn errored(host: &str, detail: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            host: host.to_string(),
            success: false,
            latency_ms: None,
            message: format!("Error: {}", detail),
        }
    }
}

/// Reachability prober with a fixed timeout and probe port
#[derive(Debug, Clone)]
pub struct Prober {
    timeout: Duration,
    port: u16,
}

impl Prober {
    pub fn new(timeout: Duration, port: u16) -> Self {
        Self { timeout, port }
    }

    pub fn from_config(config: &PingConfig) -> Self {
        Self::new(config.timeout(), config.probe_port)
    }

    /// Probe `host` once. Wall-clock elapsed time is recorded for
    /// successful attempts; a timeout or any resolution/transport error is
    /// reported in the result message.
    pub async fn probe(&self, host: &str) -> ProbeResult {
        let start = Instant::now();
        let connect = TcpStream::connect((host, self.port));
        match timeout(self.timeout, connect).await {
            Ok(Ok(_stream)) => {
                let elapsed = start.elapsed().as_millis() as u64;
                ProbeResult::reply(host, elapsed)
            }
            Ok(Err(e)) => ProbeResult::errored(host, &e.to_string()),
            Err(_) => ProbeResult::timed_out(host),
        }
    }
}
