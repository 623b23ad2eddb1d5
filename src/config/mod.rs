//! Tool configuration: defaults, environment overrides and validation
//!
//! Configuration is an explicit value object handed to each engine
//! component at invocation time. There is no global mutable state; the
//! settings captured by a running ping loop or scan are snapshotted when
//! the operation starts.

use crate::defaults;
use crate::error::{AppError, Result};
use std::env;
use std::time::Duration;

/// Settings for the ping loop and single probes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingConfig {
    /// Seconds between consecutive probes
    pub interval_secs: u64,
    /// Per-probe timeout in milliseconds
    pub timeout_ms: u64,
    /// TCP port used for reachability probes
    pub probe_port: u16,
}

/// Settings for the port scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Per-port connect timeout in milliseconds
    pub timeout_ms: u64,
    /// Maximum number of in-flight port probes
    pub concurrency: usize,
}

/// Settings for the HTTP checker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Connect and read timeout in seconds (applied as one bound)
    pub timeout_secs: u64,
    /// Follow redirects instead of reporting the Location header
    pub follow_redirects: bool,
    /// Include response headers in rendered output
    pub show_headers: bool,
}

/// Settings for the traceroute runner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceConfig {
    /// Hop count ceiling passed to the external tool
    pub max_hops: u32,
    /// Per-probe wait in seconds passed to the external tool
    pub wait_secs: u32,
}

/// Complete toolbox configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolConfig {
    pub ping: PingConfig,
    pub scan: ScanConfig,
    pub http: HttpConfig,
    pub trace: TraceConfig,
}

fn default_ping_interval() -> u64 {
    defaults::DEFAULT_PING_INTERVAL.as_secs()
}
fn default_ping_timeout() -> u64 {
    defaults::DEFAULT_PING_TIMEOUT.as_millis() as u64
}
fn default_probe_port() -> u16 {
    defaults::DEFAULT_PROBE_PORT
}
fn default_scan_timeout() -> u64 {
    defaults::DEFAULT_SCAN_TIMEOUT.as_millis() as u64
}
fn default_scan_concurrency() -> usize {
    (num_cpus::get() * 16).clamp(16, 256)
}
fn default_http_timeout() -> u64 {
    defaults::DEFAULT_HTTP_TIMEOUT.as_secs()
}
fn default_trace_max_hops() -> u32 {
    defaults::DEFAULT_TRACE_MAX_HOPS
}
fn default_trace_wait() -> u32 {
    defaults::DEFAULT_TRACE_WAIT.as_secs() as u32
}

impl Default for PingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_ping_interval(),
            timeout_ms: default_ping_timeout(),
            probe_port: default_probe_port(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_scan_timeout(),
            concurrency: default_scan_concurrency(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_http_timeout(),
            follow_redirects: false,
            show_headers: true,
        }
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            max_hops: default_trace_max_hops(),
            wait_secs: default_trace_wait(),
        }
    }
}

impl PingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl ScanConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ToolConfig {
    /// Build a configuration from defaults overlaid with `NTB_*`
    /// environment variables. A `.env` file in the working directory is
    /// honored when present.
    pub fn from_env() -> Result<Self> {
        // Missing .env is the normal case, not an error.
        let _ = dotenv::dotenv();

        let mut config = Self::default();
        if let Some(v) = read_env_u64("NTB_PING_INTERVAL_SECS")? {
            config.ping.interval_secs = v;
        }
        if let Some(v) = read_env_u64("NTB_PING_TIMEOUT_MS")? {
            config.ping.timeout_ms = v;
        }
        if let Some(v) = read_env_u64("NTB_PROBE_PORT")? {
            config.ping.probe_port = u16::try_from(v).map_err(|_| {
                AppError::invalid_input(format!("NTB_PROBE_PORT {} is out of range 1-65535", v))
            })?;
        }
        if let Some(v) = read_env_u64("NTB_SCAN_TIMEOUT_MS")? {
            config.scan.timeout_ms = v;
        }
        if let Some(v) = read_env_u64("NTB_SCAN_CONCURRENCY")? {
            config.scan.concurrency = v as usize;
        }
        if let Some(v) = read_env_u64("NTB_HTTP_TIMEOUT_SECS")? {
            config.http.timeout_secs = v;
        }
        if let Some(v) = read_env_bool("NTB_HTTP_FOLLOW_REDIRECTS")? {
            config.http.follow_redirects = v;
        }
        if let Some(v) = read_env_bool("NTB_HTTP_SHOW_HEADERS")? {
            config.http.show_headers = v;
        }
        if let Some(v) = read_env_u64("NTB_TRACE_MAX_HOPS")? {
            config.trace.max_hops = v as u32;
        }
        if let Some(v) = read_env_u64("NTB_TRACE_WAIT_SECS")? {
            config.trace.wait_secs = v as u32;
        }

        config.validate()?;
        Ok(config)
    }

    /// Fail fast on values that would make an engine call meaningless,
    /// naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.ping.interval_secs == 0 {
            return Err(AppError::invalid_input("ping interval must be at least 1 second"));
        }
        if self.ping.timeout_ms == 0 {
            return Err(AppError::invalid_input("ping timeout must be at least 1 ms"));
        }
        if self.ping.probe_port == 0 {
            return Err(AppError::invalid_input("probe port must be in 1-65535"));
        }
        if self.scan.timeout_ms == 0 {
            return Err(AppError::invalid_input("scan timeout must be at least 1 ms"));
        }
        if self.scan.concurrency == 0 {
            return Err(AppError::invalid_input("scan concurrency must be at least 1"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::invalid_input("http timeout must be at least 1 second"));
        }
        if self.trace.max_hops == 0 || self.trace.max_hops > 255 {
            return Err(AppError::invalid_input("trace max hops must be in 1-255"));
        }
        if self.trace.wait_secs == 0 {
            return Err(AppError::invalid_input("trace wait must be at least 1 second"));
        }
        Ok(())
    }
}

fn read_env_u64(name: &str) -> Result<Option<u64>> {
    match env::var(name) {
        Ok(raw) => {
            let value = raw.trim().parse::<u64>().map_err(|_| {
                AppError::invalid_input(format!("{} must be a non-negative integer, got '{}'", name, raw))
            })?;
            Ok(Some(value))
        }
        Err(_) => Ok(None),
    }
}

fn read_env_bool(name: &str) -> Result<Option<bool>> {
    match env::var(name) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(AppError::invalid_input(format!(
                "{} must be a boolean, got '{}'",
                name, raw
            ))),
        },
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ToolConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ping.probe_port, 80);
        assert!(config.scan.concurrency >= 16);
        assert!(!config.http.follow_redirects);
        assert!(config.http.show_headers);
    }

    #[test]
    fn test_duration_accessors() {
        let config = ToolConfig::default();
        assert_eq!(config.ping.interval(), Duration::from_secs(config.ping.interval_secs));
        assert_eq!(config.scan.timeout(), Duration::from_millis(config.scan.timeout_ms));
        assert_eq!(config.http.timeout(), Duration::from_secs(config.http.timeout_secs));
    }

    #[test]
    fn test_zero_values_rejected() {
        let mut config = ToolConfig::default();
        config.ping.interval_secs = 0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.category(), "INPUT");
        assert!(err.to_string().contains("interval"));

        let mut config = ToolConfig::default();
        config.scan.timeout_ms = 0;
        assert!(config.validate().unwrap_err().to_string().contains("scan timeout"));

        let mut config = ToolConfig::default();
        config.trace.max_hops = 0;
        assert!(config.validate().unwrap_err().to_string().contains("max hops"));
    }

    #[test]
    fn test_env_bool_parsing() {
        assert_eq!(read_env_bool("NTB_TEST_UNSET_BOOL").unwrap(), None);
        env::set_var("NTB_TEST_BOOL", "yes");
        assert_eq!(read_env_bool("NTB_TEST_BOOL").unwrap(), Some(true));
        env::set_var("NTB_TEST_BOOL", "off");
        assert_eq!(read_env_bool("NTB_TEST_BOOL").unwrap(), Some(false));
        env::set_var("NTB_TEST_BOOL", "maybe");
        assert!(read_env_bool("NTB_TEST_BOOL").is_err());
        env::remove_var("NTB_TEST_BOOL");
    }

    #[test]
    fn test_env_u64_parsing() {
        env::set_var("NTB_TEST_U64", "250");
        assert_eq!(read_env_u64("NTB_TEST_U64").unwrap(), Some(250));
        env::set_var("NTB_TEST_U64", "not-a-number");
        assert!(read_env_u64("NTB_TEST_U64").is_err());
        env::remove_var("NTB_TEST_U64");
    }
}
