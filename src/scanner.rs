//! Concurrent TCP connect port scanner
//!
//! Ports are issued in ascending order through a bounded worker pool;
//! each probe is a timed TCP connect. Only open ports are reported,
//! closed ports are counted for progress. The scan is cooperatively
//! cancellable between probes.

use crate::config::ScanConfig;
use crate::error::Result;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// Well-known service names for recognized ports
const WELL_KNOWN_SERVICES: &[(u16, &str)] = &[
    (21, "FTP"),
    (22, "SSH"),
    (23, "Telnet"),
    (25, "SMTP"),
    (53, "DNS"),
    (80, "HTTP"),
    (110, "POP3"),
    (143, "IMAP"),
    (443, "HTTPS"),
    (445, "SMB"),
    (3306, "MySQL"),
    (3389, "RDP"),
    (5432, "PostgreSQL"),
    (6379, "Redis"),
    (8080, "HTTP-Alt"),
    (8443, "HTTPS-Alt"),
    (27017, "MongoDB"),
];

/// Service name for a port, `"Unknown"` when unrecognized.
pub fn service_name(port: u16) -> &'static str {
    WELL_KNOWN_SERVICES
        .iter()
        .find(|(p, _)| *p == port)
        .map(|(_, name)| *name)
        .unwrap_or("Unknown")
}

/// One scanned port that turned out to be open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortResult {
    pub port: u16,
    pub open: bool,
    pub service: &'static str,
}

/// Events emitted while a scan is in progress
#[derive(Debug, Clone, Serialize)]
pub enum ScanEvent {
    /// An open port was found
    Open(PortResult),
    /// A probe completed (open or closed)
    Progress { scanned: u64, total: u64 },
}

/// Final outcome of a scan, open ports sorted ascending by port number
#[derive(Debug, Clone, Serialize)]
pub struct ScanSummary {
    pub host: String,
    pub open_ports: Vec<PortResult>,
    pub scanned: u64,
    pub total: u64,
}

/// Handle to a running scan
pub struct ScanHandle {
    running: Arc<AtomicBool>,
    task: JoinHandle<ScanSummary>,
}

impl ScanHandle {
    /// Request a cooperative stop; probes already issued complete and are
    /// still counted.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Wait for the scan to finish (or drain after a stop) and take the
    /// summary.
    pub async fn join(self) -> ScanSummary {
        self.task.await.unwrap_or(ScanSummary {
            host: String::new(),
            open_ports: Vec::new(),
            scanned: 0,
            total: 0,
        })
    }
}

/// Clamp a requested range to 1..=65535 and normalize its order.
fn normalize_range(start: u16, end: u16) -> (u16, u16) {
    let start = start.max(1);
    let end = end.max(1);
    if start <= end {
        (start, end)
    } else {
        (end, start)
    }
}

/// TCP connect port scanner
#[derive(Debug, Clone)]
pub struct PortScanner {
    timeout: Duration,
    concurrency: usize,
}

impl PortScanner {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            timeout: config.timeout(),
            concurrency: config.concurrency.max(1),
        }
    }

    /// Scan `host` over the inclusive port range, emitting `ScanEvent`s as
    /// probes complete. Completion order may differ from port order under
    /// concurrency; the final summary is sorted by port number.
    pub fn scan(&self, host: &str, start: u16, end: u16) -> (ScanHandle, mpsc::Receiver<ScanEvent>) {
        let (start, end) = normalize_range(start, end);
        let total = (end - start) as u64 + 1;
        let host: Arc<str> = Arc::from(host);
        let connect_timeout = self.timeout;
        let concurrency = self.concurrency;
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        let (tx, rx) = mpsc::channel(128);

        let task = tokio::spawn(async move {
            let mut open_ports: Vec<PortResult> = Vec::new();
            let mut scanned: u64 = 0;

            let probes = stream::iter(start..=end)
                .map(|port| {
                    let host = host.clone();
                    let flag = flag.clone();
                    async move {
                        if !flag.load(Ordering::Acquire) {
                            return None;
                        }
                        let open = matches!(
                            timeout(connect_timeout, TcpStream::connect((host.as_ref(), port))).await,
                            Ok(Ok(_))
                        );
                        Some((port, open))
                    }
                })
                .buffer_unordered(concurrency);

            futures::pin_mut!(probes);
            while let Some(outcome) = probes.next().await {
                let Some((port, open)) = outcome else {
                    continue; // cancelled before this probe was issued
                };
                scanned += 1;
                if open {
                    let result = PortResult {
                        port,
                        open: true,
                        service: service_name(port),
                    };
                    open_ports.push(result);
                    let _ = tx.send(ScanEvent::Open(result)).await;
                }
                let _ = tx.send(ScanEvent::Progress { scanned, total }).await;
            }

            open_ports.sort_by_key(|r| r.port);
            ScanSummary {
                host: host.to_string(),
                open_ports,
                scanned,
                total,
            }
        });

        (ScanHandle { running, task }, rx)
    }

    /// Run a scan to completion and return the sorted summary, discarding
    /// intermediate events.
    pub async fn scan_collect(&self, host: &str, start: u16, end: u16) -> Result<ScanSummary> {
        let (handle, mut rx) = self.scan(host, start, end);
        while rx.recv().await.is_some() {}
        Ok(handle.join().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn test_service_names() {
        assert_eq!(service_name(22), "SSH");
        assert_eq!(service_name(80), "HTTP");
        assert_eq!(service_name(443), "HTTPS");
        assert_eq!(service_name(3306), "MySQL");
        assert_eq!(service_name(6379), "Redis");
        assert_eq!(service_name(49152), "Unknown");
    }

    #[test]
    fn test_range_normalization() {
        assert_eq!(normalize_range(0, 1024), (1, 1024));
        assert_eq!(normalize_range(80, 80), (80, 80));
        assert_eq!(normalize_range(9000, 8000), (8000, 9000));
    }

    #[tokio::test]
    async fn test_scan_finds_only_open_ports() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open_port = listener.local_addr().unwrap().port();
        // Scan a window around the listening port.
        let start = open_port.saturating_sub(2).max(1);
        let end = open_port.saturating_add(2);

        let scanner = PortScanner::new(&ScanConfig {
            timeout_ms: 1000,
            concurrency: 4,
        });
        let summary = scanner.scan_collect("127.0.0.1", start, end).await.unwrap();

        assert_eq!(summary.total, (end - start) as u64 + 1);
        assert_eq!(summary.scanned, summary.total);
        assert!(summary.open_ports.iter().all(|r| r.open));
        assert!(summary.open_ports.iter().any(|r| r.port == open_port));
    }

    #[tokio::test]
    async fn test_progress_counts_every_probe() {
        let scanner = PortScanner::new(&ScanConfig {
            timeout_ms: 500,
            concurrency: 8,
        });
        // Ephemeral range on loopback; most ports will be closed, which is
        // exactly what progress accounting has to survive.
        let (handle, mut rx) = scanner.scan("127.0.0.1", 40000, 40019);

        let mut last_scanned = 0;
        let mut progress_events = 0;
        while let Some(event) = rx.recv().await {
            if let ScanEvent::Progress { scanned, total } = event {
                assert!(scanned > last_scanned, "progress must strictly increase");
                assert_eq!(total, 20);
                last_scanned = scanned;
                progress_events += 1;
            }
        }
        assert_eq!(progress_events, 20);
        assert_eq!(last_scanned, 20);

        let summary = handle.join().await;
        assert_eq!(summary.scanned, 20);
    }

    #[tokio::test]
    async fn test_results_sorted_without_duplicates() {
        let a = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let b = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let (pa, pb) = (a.local_addr().unwrap().port(), b.local_addr().unwrap().port());
        let (lo, hi) = (pa.min(pb), pa.max(pb));

        let scanner = PortScanner::new(&ScanConfig {
            timeout_ms: 1000,
            concurrency: 32,
        });
        let summary = scanner.scan_collect("127.0.0.1", lo, hi).await.unwrap();

        let ports: Vec<u16> = summary.open_ports.iter().map(|r| r.port).collect();
        let mut sorted = ports.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(ports, sorted, "reported ports must be ascending and unique");
        assert!(ports.contains(&pa));
        assert!(ports.contains(&pb));
    }

    #[tokio::test]
    async fn test_cancellation_stops_short() {
        let scanner = PortScanner::new(&ScanConfig {
            timeout_ms: 400,
            concurrency: 1,
        });
        let (handle, mut rx) = scanner.scan("127.0.0.1", 41000, 41999);

        // Let a few probes land, then stop.
        let mut seen = 0;
        while let Some(event) = rx.recv().await {
            if matches!(event, ScanEvent::Progress { .. }) {
                seen += 1;
                if seen == 3 {
                    handle.stop();
                }
            }
        }
        let summary = handle.join().await;
        assert!(summary.scanned >= 3);
        assert!(summary.scanned < summary.total, "stop must cut the scan short");
    }
}
