//! Route tracing via the system traceroute utility
//!
//! The platform offers no unprivileged way to send TTL-limited probes, so
//! the primary strategy shells out to the system `traceroute` binary and
//! parses its output. When the binary cannot be invoked at all, a
//! degraded fallback resolves the destination and reports it as a single
//! synthetic hop.

use crate::config::TraceConfig;
use crate::error::{AppError, Result};
use crate::resolver::Resolver;
use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;
use std::process::Stdio;
use std::sync::OnceLock;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

/// One hop on the path to the destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TracerouteHop {
    pub hop: u32,
    pub address: String,
    pub hostname: Option<String>,
    /// Absent for a timed-out probe
    pub latency_ms: Option<u64>,
}

fn hop_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(\d+)\s+([\d.]+|\*)\s*(?:([\d.]+)\s*ms)?").expect("hop pattern is valid")
    })
}

/// Parse one line of traceroute output. Lines that do not look like a hop
/// (headers, unresolved name forms) yield `None` and are skipped. A `*`
/// address or a missing latency marks a timed-out probe.
pub fn parse_hop_line(line: &str) -> Option<TracerouteHop> {
    let captures = hop_pattern().captures(line)?;
    let hop: u32 = captures.get(1)?.as_str().parse().ok()?;
    let address = captures.get(2)?.as_str().to_string();
    let latency_ms = captures
        .get(3)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(|ms| ms as u64);
    Some(TracerouteHop {
        hop,
        address,
        hostname: None,
        latency_ms,
    })
}

/// Capability seam for hop tracing, so parsing and presentation can be
/// exercised without spawning processes.
#[async_trait]
pub trait HopTracer: Send + Sync {
    /// Begin a trace toward `host`; hops stream out in emission order.
    async fn trace(&self, host: &str) -> Result<mpsc::Receiver<TracerouteHop>>;
}

/// Hop tracer backed by the system `traceroute` binary
pub struct SystemTraceroute {
    max_hops: u32,
    wait_secs: u32,
}

impl SystemTraceroute {
    pub fn new(config: &TraceConfig) -> Self {
        Self {
            max_hops: config.max_hops,
            wait_secs: config.wait_secs,
        }
    }
}

#[async_trait]
impl HopTracer for SystemTraceroute {
    async fn trace(&self, host: &str) -> Result<mpsc::Receiver<TracerouteHop>> {
        let mut child = Command::new("traceroute")
            .arg("-m")
            .arg(self.max_hops.to_string())
            .arg("-w")
            .arg(self.wait_secs.to_string())
            .arg(host)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AppError::external_tool(format!("traceroute: {}", e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AppError::external_tool("traceroute: no stdout handle"))?;
        let stderr = child.stderr.take();

        let (tx, rx) = mpsc::channel(32);

        // Both output streams carry hop lines on some platforms; parse
        // whatever matches and ignore the rest.
        if let Some(stderr) = stderr {
            let tx = tx.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if let Some(hop) = parse_hop_line(&line) {
                        if tx.send(hop).await.is_err() {
                            break;
                        }
                    }
                }
            });
        }

        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(hop) = parse_hop_line(&line) {
                    if tx.send(hop).await.is_err() {
                        break;
                    }
                }
            }
            let _ = child.wait().await;
        });

        Ok(rx)
    }
}

/// Degraded-mode tracer used when the external utility is unavailable:
/// resolves the destination and emits it as a single synthetic hop, or a
/// single error hop when resolution fails too.
pub struct FallbackTracer {
    resolver: Resolver,
}

impl FallbackTracer {
    pub fn new(resolver: Resolver) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl HopTracer for FallbackTracer {
    async fn trace(&self, host: &str) -> Result<mpsc::Receiver<TracerouteHop>> {
        let (tx, rx) = mpsc::channel(1);
        let hop = match self.resolver.resolve_first(host).await {
            Ok(addr) => {
                let hostname = self.resolver.reverse(addr).await;
                TracerouteHop {
                    hop: 1,
                    address: addr.to_string(),
                    hostname,
                    latency_ms: None,
                }
            }
            Err(e) => TracerouteHop {
                hop: 1,
                address: format!("Error: {}", e),
                hostname: None,
                latency_ms: None,
            },
        };
        let _ = tx.send(hop).await;
        Ok(rx)
    }
}

/// Runner that prefers the system utility and degrades to the resolver
/// fallback when it cannot be invoked.
pub struct TracerouteRunner {
    system: SystemTraceroute,
    fallback: FallbackTracer,
}

impl TracerouteRunner {
    pub fn new(config: &TraceConfig) -> Result<Self> {
        Ok(Self {
            system: SystemTraceroute::new(config),
            fallback: FallbackTracer::new(Resolver::from_system_conf()?),
        })
    }

    /// Trace toward `host`, returning the hop stream and whether the
    /// degraded fallback was used.
    pub async fn run(&self, host: &str) -> Result<(mpsc::Receiver<TracerouteHop>, bool)> {
        match self.system.trace(host).await {
            Ok(rx) => Ok((rx, false)),
            Err(AppError::ExternalTool(_)) => {
                let rx = self.fallback.trace(host).await?;
                Ok((rx, true))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_regular_hop() {
        let hop = parse_hop_line("3  10.0.0.1  12.4 ms").unwrap();
        assert_eq!(hop.hop, 3);
        assert_eq!(hop.address, "10.0.0.1");
        assert_eq!(hop.hostname, None);
        assert_eq!(hop.latency_ms, Some(12));
    }

    #[test]
    fn test_parse_timed_out_hop() {
        let hop = parse_hop_line("4  *").unwrap();
        assert_eq!(hop.hop, 4);
        assert_eq!(hop.address, "*");
        assert_eq!(hop.latency_ms, None);
    }

    #[test]
    fn test_parse_leading_whitespace() {
        let hop = parse_hop_line(" 1  192.168.1.1  0.8 ms  0.7 ms  0.9 ms").unwrap();
        assert_eq!(hop.hop, 1);
        assert_eq!(hop.address, "192.168.1.1");
        assert_eq!(hop.latency_ms, Some(0));
    }

    #[test]
    fn test_parse_address_without_latency() {
        let hop = parse_hop_line("7  203.0.113.9").unwrap();
        assert_eq!(hop.hop, 7);
        assert_eq!(hop.address, "203.0.113.9");
        assert_eq!(hop.latency_ms, None);
    }

    #[test]
    fn test_non_hop_lines_ignored() {
        assert!(parse_hop_line("traceroute to example.com (93.184.216.34), 30 hops max").is_none());
        assert!(parse_hop_line("").is_none());
        assert!(parse_hop_line("garbage").is_none());
    }

    #[tokio::test]
    async fn test_fallback_emits_single_hop() {
        let tracer = FallbackTracer::new(Resolver::from_system_conf().unwrap());
        let mut rx = tracer.trace("localhost").await.unwrap();
        let hop = rx.recv().await.unwrap();
        assert_eq!(hop.hop, 1);
        assert_eq!(hop.latency_ms, None);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_fallback_reports_resolution_failure_in_address() {
        let tracer = FallbackTracer::new(Resolver::from_system_conf().unwrap());
        let mut rx = tracer.trace("definitely-not-a-real-host.invalid").await.unwrap();
        let hop = rx.recv().await.unwrap();
        assert_eq!(hop.hop, 1);
        assert!(hop.address.starts_with("Error: "));
        assert_eq!(hop.latency_ms, None);
    }
}
