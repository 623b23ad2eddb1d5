//! Terminal rendering of engine results
//!
//! Presentation only: every function consumes a value produced by an
//! engine call and returns a string for the CLI to print.

use crate::http_check::HttpCheckResult;
use crate::ping::{PingStats, PingUpdate};
use crate::resolver::DnsRecord;
use crate::scanner::ScanSummary;
use crate::subnet::SubnetResult;
use crate::traceroute::TracerouteHop;
use colored::Colorize;

/// Result formatter with a color toggle
#[derive(Debug, Clone, Copy)]
pub struct Formatter {
    use_color: bool,
}

impl Formatter {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    fn label(&self, text: &str) -> String {
        if self.use_color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn row(&self, label: &str, value: &str) -> String {
        format!("{:<18} {}", self.label(label), value)
    }

    /// Subnet calculator output, one row per derived field
    pub fn subnet(&self, r: &SubnetResult) -> String {
        let rows = [
            self.row("Network Address", &r.network_address.to_string()),
            self.row("Broadcast Address", &r.broadcast_address.to_string()),
            self.row("Subnet Mask", &r.subnet_mask.to_string()),
            self.row("Wildcard Mask", &r.wildcard_mask.to_string()),
            self.row("First Host", &r.first_host.to_string()),
            self.row("Last Host", &r.last_host.to_string()),
            self.row("Total Hosts", &r.total_hosts.to_string()),
            self.row("Usable Hosts", &r.usable_hosts.to_string()),
            self.row("CIDR Notation", &format!("/{}", r.prefix)),
            self.row("IP Class", r.ip_class),
            self.row("Type", r.network_type),
        ];
        rows.join("\n")
    }

    /// DNS lookup output, one row per record
    pub fn dns_records(&self, records: &[DnsRecord]) -> String {
        records
            .iter()
            .map(|record| {
                let tag = if self.use_color {
                    record.record_type.as_str().green().bold().to_string()
                } else {
                    record.record_type.as_str().to_string()
                };
                format!("{:<6} {}", tag, record.value)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// One ping log line: HH:MM:SS timestamp plus the probe message
    pub fn ping_update(&self, update: &PingUpdate) -> String {
        let timestamp = update.result.timestamp.format("%H:%M:%S");
        let message = if !self.use_color {
            update.result.message.clone()
        } else if update.result.success {
            update.result.message.normal().to_string()
        } else {
            update.result.message.red().to_string()
        };
        format!("{}  {}", timestamp, message)
    }

    /// Ping session footer with the derived counters
    pub fn ping_stats(&self, stats: &PingStats) -> String {
        format!(
            "{} sent, {} received, {}% loss, avg {}ms",
            stats.sent, stats.received, stats.loss_percent, stats.avg_latency_ms
        )
    }

    /// One discovered open port
    pub fn open_port(&self, port: u16, service: &str) -> String {
        let state = if self.use_color {
            "OPEN".green().bold().to_string()
        } else {
            "OPEN".to_string()
        };
        format!("{:>5}/tcp  {}  {}", port, state, service)
    }

    /// Scan footer
    pub fn scan_summary(&self, summary: &ScanSummary) -> String {
        format!(
            "Found {} open port(s) out of {} scanned on {}",
            summary.open_ports.len(),
            summary.scanned,
            summary.host
        )
    }

    /// HTTP check output: status banner, then metadata, then headers
    pub fn http_result(&self, r: &HttpCheckResult, show_headers: bool) -> String {
        let status = format!("{} {}", r.status_code, r.status_message);
        let status = if !self.use_color {
            status
        } else {
            match r.status_code / 100 {
                2 => status.green().bold().to_string(),
                3 => status.yellow().bold().to_string(),
                4 | 5 => status.red().bold().to_string(),
                _ => status.bold().to_string(),
            }
        };

        let mut lines = vec![
            format!("{}  ({}ms)", status, r.elapsed_ms),
            self.row("URL", &r.final_url),
        ];
        if let Some(ct) = &r.content_type {
            lines.push(self.row("Content-Type", ct));
        }
        if let Some(location) = &r.redirect_location {
            lines.push(self.row("Redirect To", location));
        }
        if show_headers && !r.headers.is_empty() {
            lines.push(String::new());
            lines.push(self.label("Response Headers"));
            for (name, value) in &r.headers {
                lines.push(format!("  {}: {}", name, value));
            }
        }
        lines.join("\n")
    }

    /// One traceroute hop line
    pub fn hop(&self, hop: &TracerouteHop) -> String {
        let latency = match hop.latency_ms {
            Some(ms) => format!("{}ms", ms),
            None => "* * *".to_string(),
        };
        let latency = if self.use_color && hop.latency_ms.is_some() {
            let ms = hop.latency_ms.unwrap_or(0);
            if ms < 50 {
                latency.green().to_string()
            } else if ms < 150 {
                latency.yellow().to_string()
            } else {
                latency.red().to_string()
            }
        } else {
            latency
        };
        match &hop.hostname {
            Some(name) => format!("{:>3}  {}  ({})  {}", hop.hop, hop.address, name, latency),
            None => format!("{:>3}  {}  {}", hop.hop, hop.address, latency),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeResult;
    use crate::subnet::compute_subnet;
    use chrono::Utc;

    fn plain() -> Formatter {
        Formatter::new(false)
    }

    #[test]
    fn test_subnet_rendering() {
        let result = compute_subnet("192.168.1.0", 24).unwrap();
        let text = plain().subnet(&result);
        assert!(text.contains("192.168.1.255"));
        assert!(text.contains("255.255.255.0"));
        assert!(text.contains("/24"));
        assert!(text.contains("Private"));
    }

    #[test]
    fn test_ping_update_includes_timestamp_and_message() {
        let update = PingUpdate {
            result: ProbeResult {
                timestamp: Utc::now(),
                host: "example.com".to_string(),
                success: true,
                latency_ms: Some(12),
                message: "Reply from example.com: time=12ms".to_string(),
            },
            stats: PingStats {
                sent: 1,
                received: 1,
                loss_percent: 0,
                avg_latency_ms: 12,
            },
        };
        let line = plain().ping_update(&update);
        assert!(line.contains("Reply from example.com: time=12ms"));
    }

    #[test]
    fn test_hop_rendering_with_and_without_latency() {
        let with = TracerouteHop {
            hop: 3,
            address: "10.0.0.1".to_string(),
            hostname: None,
            latency_ms: Some(12),
        };
        assert!(plain().hop(&with).contains("12ms"));

        let without = TracerouteHop {
            hop: 4,
            address: "*".to_string(),
            hostname: None,
            latency_ms: None,
        };
        assert!(plain().hop(&without).contains("* * *"));
    }

    #[test]
    fn test_open_port_line() {
        let line = plain().open_port(22, "SSH");
        assert!(line.contains("22/tcp"));
        assert!(line.contains("OPEN"));
        assert!(line.contains("SSH"));
    }
}
