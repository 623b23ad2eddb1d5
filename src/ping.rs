//! Periodic ping session
//!
//! Schedules repeated probes at a fixed interval, accumulating a bounded
//! history and running counters. The session is owned by the loop's own
//! task; observers receive immutable snapshots over a channel.

use crate::config::PingConfig;
use crate::probe::{ProbeResult, Prober};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Upper bound on retained probe history; the oldest entry is evicted
/// first once exceeded.
pub const HISTORY_LIMIT: usize = 200;

/// Derived counters recomputed after each probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PingStats {
    pub sent: u64,
    pub received: u64,
    pub loss_percent: u64,
    pub avg_latency_ms: u64,
}

/// Ordered probe history plus running statistics for one ping run
#[derive(Debug, Clone, Default)]
pub struct PingSession {
    history: VecDeque<ProbeResult>,
    sent: u64,
    received: u64,
    latency_sum_ms: u64,
}

impl PingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one probe outcome: bump counters, prepend to history and
    /// evict beyond the bound.
    pub fn record(&mut self, result: ProbeResult) {
        self.sent += 1;
        if result.success {
            self.received += 1;
            self.latency_sum_ms += result.latency_ms.unwrap_or(0);
        }
        self.history.push_front(result);
        if self.history.len() > HISTORY_LIMIT {
            self.history.pop_back();
        }
    }

    /// Most-recent-first probe history
    pub fn history(&self) -> impl Iterator<Item = &ProbeResult> {
        self.history.iter()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Current counters. Loss percent is defined as 0 before any probe
    /// has been sent.
    pub fn stats(&self) -> PingStats {
        let loss_percent = if self.sent == 0 {
            0
        } else {
            (self.sent - self.received) * 100 / self.sent
        };
        let avg_latency_ms = if self.received == 0 {
            0
        } else {
            self.latency_sum_ms / self.received
        };
        PingStats {
            sent: self.sent,
            received: self.received,
            loss_percent,
            avg_latency_ms,
        }
    }
}

/// One emitted update: the probe that just completed plus the counters
/// as of that probe.
#[derive(Debug, Clone, Serialize)]
pub struct PingUpdate {
    pub result: ProbeResult,
    pub stats: PingStats,
}

/// Handle to a running ping loop
pub struct PingHandle {
    running: Arc<AtomicBool>,
    task: JoinHandle<PingSession>,
}

impl PingHandle {
    /// Request a cooperative stop. No new probes are issued after the
    /// flag is observed; an in-flight probe completes and its result is
    /// still recorded.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Wait for the loop to finish and take ownership of the session.
    pub async fn join(self) -> PingSession {
        self.task.await.unwrap_or_default()
    }
}

/// Periodic probe scheduler
pub struct PingLoop;

impl PingLoop {
    /// Start pinging `host`, capturing the interval, timeout and probe
    /// port from `config` as of start time. Returns a control handle and
    /// a stream of per-probe updates.
    pub fn start(host: &str, config: &PingConfig) -> (PingHandle, mpsc::Receiver<PingUpdate>) {
        let host = host.to_string();
        let interval = config.interval();
        let prober = Prober::from_config(config);
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        let (tx, rx) = mpsc::channel(64);

        let task = tokio::spawn(async move {
            let mut session = PingSession::new();
            loop {
                let result = prober.probe(&host).await;
                session.record(result.clone());
                // Observer may have gone away; the loop keeps running
                // until stopped regardless.
                let _ = tx
                    .send(PingUpdate {
                        result,
                        stats: session.stats(),
                    })
                    .await;
                tokio::time::sleep(interval).await;
                if !flag.load(Ordering::Acquire) {
                    break;
                }
            }
            session
        });

        (PingHandle { running, task }, rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;
    use tokio::net::TcpListener;

    fn synthetic(success: bool, latency_ms: Option<u64>) -> ProbeResult {
        ProbeResult {
            timestamp: Utc::now(),
            host: "10.0.0.1".to_string(),
            success,
            latency_ms,
            message: String::new(),
        }
    }

    #[test]
    fn test_loss_percent_zero_before_first_probe() {
        let session = PingSession::new();
        let stats = session.stats();
        assert_eq!(stats.sent, 0);
        assert_eq!(stats.loss_percent, 0);
        assert_eq!(stats.avg_latency_ms, 0);
    }

    #[test]
    fn test_loss_percent_formula() {
        let mut session = PingSession::new();
        for _ in 0..3 {
            session.record(synthetic(true, Some(10)));
        }
        session.record(synthetic(false, None));
        let stats = session.stats();
        assert_eq!(stats.sent, 4);
        assert_eq!(stats.received, 3);
        assert_eq!(stats.loss_percent, 25);
        assert_eq!(stats.avg_latency_ms, 10);
    }

    #[test]
    fn test_average_over_successful_probes_only() {
        let mut session = PingSession::new();
        session.record(synthetic(true, Some(10)));
        session.record(synthetic(false, None));
        session.record(synthetic(true, Some(30)));
        assert_eq!(session.stats().avg_latency_ms, 20);
    }

    #[test]
    fn test_history_bounded_and_newest_first() {
        let mut session = PingSession::new();
        for i in 0..(HISTORY_LIMIT as u64 + 50) {
            session.record(synthetic(true, Some(i)));
        }
        assert_eq!(session.len(), HISTORY_LIMIT);
        // Newest entry first, oldest evicted.
        let latencies: Vec<u64> = session.history().map(|r| r.latency_ms.unwrap()).collect();
        assert_eq!(latencies[0], HISTORY_LIMIT as u64 + 49);
        assert_eq!(*latencies.last().unwrap(), 50);
        // Counters keep counting past the eviction bound.
        assert_eq!(session.stats().sent, HISTORY_LIMIT as u64 + 50);
    }

    #[tokio::test]
    async fn test_loop_runs_and_stops_cooperatively() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let config = PingConfig {
            interval_secs: 1,
            timeout_ms: 1000,
            probe_port: port,
        };
        let (handle, mut rx) = PingLoop::start("127.0.0.1", &config);

        let first = rx.recv().await.expect("loop should emit an update");
        assert!(first.result.success);
        assert_eq!(first.stats.sent, 1);
        assert_eq!(first.stats.loss_percent, 0);

        assert!(handle.is_running());
        handle.stop();
        assert!(!handle.is_running());

        let session = handle.join().await;
        assert!(session.stats().sent >= 1);
        assert_eq!(session.len() as u64, session.stats().sent.min(HISTORY_LIMIT as u64));
    }
}
