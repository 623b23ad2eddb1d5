//! Command-line interface definitions

use crate::config::ToolConfig;
use crate::defaults;
use crate::error::Result;
use clap::{Parser, Subcommand};

/// Network Toolbox - on-device network diagnostics
#[derive(Parser, Debug, Clone)]
#[command(name = "ntb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit results as JSON instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Calculate subnet details for an address and CIDR prefix
    Subnet {
        /// IPv4 address in dotted form
        ip: String,
        /// CIDR prefix length (0-32)
        prefix: u8,
    },

    /// Resolve a hostname to A/AAAA records plus a reverse PTR
    Dns {
        /// Hostname or domain to look up
        hostname: String,
    },

    /// Ping a host repeatedly until stopped
    Ping {
        /// Host or IP to probe
        host: String,
        /// Stop after this many probes (default: run until Ctrl-C)
        #[arg(short, long)]
        count: Option<u64>,
        /// Seconds between probes
        #[arg(short, long)]
        interval: Option<u64>,
        /// Per-probe timeout in milliseconds
        #[arg(short = 'W', long)]
        timeout_ms: Option<u64>,
        /// TCP port used for the reachability probe
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Scan a TCP port range on a host
    Scan {
        /// Target host or IP
        host: String,
        /// First port of the range
        #[arg(short, long, default_value_t = defaults::DEFAULT_SCAN_START_PORT)]
        start: u16,
        /// Last port of the range
        #[arg(short, long, default_value_t = defaults::DEFAULT_SCAN_END_PORT)]
        end: u16,
        /// Per-port connect timeout in milliseconds
        #[arg(short = 'W', long)]
        timeout_ms: Option<u64>,
        /// Maximum in-flight probes
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Check the HTTP(S) status of a URL
    Http {
        /// URL to check; https:// is assumed when no scheme is given
        url: String,
        /// Follow redirects instead of reporting the Location header
        #[arg(short = 'L', long)]
        follow_redirects: bool,
        /// Request timeout in seconds
        #[arg(short, long)]
        timeout: Option<u64>,
        /// Hide response headers
        #[arg(long)]
        no_headers: bool,
    },

    /// Trace the route to a host
    Trace {
        /// Target host or IP
        host: String,
        /// Hop count ceiling
        #[arg(short, long)]
        max_hops: Option<u32>,
    },
}

impl Cli {
    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.no_color {
            false
        } else {
            supports_color()
        }
    }

    /// Build the tool configuration: environment overlay first, then the
    /// flags given on this invocation.
    pub fn build_config(&self) -> Result<ToolConfig> {
        let mut config = ToolConfig::from_env()?;
        match &self.command {
            Command::Ping {
                interval,
                timeout_ms,
                port,
                ..
            } => {
                if let Some(v) = interval {
                    config.ping.interval_secs = *v;
                }
                if let Some(v) = timeout_ms {
                    config.ping.timeout_ms = *v;
                }
                if let Some(v) = port {
                    config.ping.probe_port = *v;
                }
            }
            Command::Scan {
                timeout_ms,
                concurrency,
                ..
            } => {
                if let Some(v) = timeout_ms {
                    config.scan.timeout_ms = *v;
                }
                if let Some(v) = concurrency {
                    config.scan.concurrency = *v;
                }
            }
            Command::Http {
                follow_redirects,
                timeout,
                no_headers,
                ..
            } => {
                config.http.follow_redirects = *follow_redirects;
                if let Some(v) = timeout {
                    config.http.timeout_secs = *v;
                }
                if *no_headers {
                    config.http.show_headers = false;
                }
            }
            Command::Trace { max_hops, .. } => {
                if let Some(v) = max_hops {
                    config.trace.max_hops = *v;
                }
            }
            Command::Subnet { .. } | Command::Dns { .. } => {}
        }
        config.validate()?;
        Ok(config)
    }
}

/// Detect whether the terminal wants colored output
fn supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    match std::env::var("TERM") {
        Ok(term) => term != "dumb",
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subnet_args_parse() {
        let cli = Cli::parse_from(["ntb", "subnet", "192.168.1.0", "24"]);
        match cli.command {
            Command::Subnet { ip, prefix } => {
                assert_eq!(ip, "192.168.1.0");
                assert_eq!(prefix, 24);
            }
            _ => panic!("expected subnet subcommand"),
        }
    }

    #[test]
    fn test_scan_defaults() {
        let cli = Cli::parse_from(["ntb", "scan", "example.com"]);
        match cli.command {
            Command::Scan { start, end, .. } => {
                assert_eq!(start, 1);
                assert_eq!(end, 1024);
            }
            _ => panic!("expected scan subcommand"),
        }
    }

    #[test]
    fn test_flag_overrides_reach_config() {
        let cli = Cli::parse_from(["ntb", "ping", "example.com", "-i", "5", "-W", "750", "-p", "443"]);
        let config = cli.build_config().unwrap();
        assert_eq!(config.ping.interval_secs, 5);
        assert_eq!(config.ping.timeout_ms, 750);
        assert_eq!(config.ping.probe_port, 443);
    }

    #[test]
    fn test_http_follow_redirects_flag() {
        let cli = Cli::parse_from(["ntb", "http", "example.com", "-L", "--no-headers"]);
        let config = cli.build_config().unwrap();
        assert!(config.http.follow_redirects);
        assert!(!config.http.show_headers);
    }

    #[test]
    fn test_no_color_flag() {
        let cli = Cli::parse_from(["ntb", "--no-color", "dns", "example.com"]);
        assert!(!cli.use_colors());
    }
}
