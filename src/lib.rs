//! Network Toolbox
//!
//! A collection of on-device network-diagnostic utilities: ping loop,
//! port scanner, DNS lookup, HTTP status checker, traceroute and subnet
//! calculator. The engine components perform the network I/O and
//! computation and return typed results; the CLI layer renders them.

pub mod cli;
pub mod config;
pub mod error;
pub mod http_check;
pub mod logging;
pub mod output;
pub mod ping;
pub mod probe;
pub mod resolver;
pub mod scanner;
pub mod subnet;
pub mod traceroute;

// Re-export commonly used types
pub use config::{HttpConfig, PingConfig, ScanConfig, ToolConfig, TraceConfig};
pub use error::{AppError, Result};
pub use http_check::{HttpCheckResult, HttpChecker};
pub use ping::{PingHandle, PingLoop, PingSession, PingStats, PingUpdate};
pub use probe::{ProbeResult, Prober};
pub use resolver::{DnsRecord, RecordType, Resolver};
pub use scanner::{PortResult, PortScanner, ScanEvent, ScanSummary};
pub use subnet::{compute_subnet, SubnetResult};
pub use traceroute::{HopTracer, TracerouteHop, TracerouteRunner};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(1);
    pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_millis(2000);
    pub const DEFAULT_PROBE_PORT: u16 = 80;
    pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_millis(500);
    pub const DEFAULT_SCAN_START_PORT: u16 = 1;
    pub const DEFAULT_SCAN_END_PORT: u16 = 1024;
    pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_TRACE_MAX_HOPS: u32 = 30;
    pub const DEFAULT_TRACE_WAIT: Duration = Duration::from_secs(2);
}
