//! IPv4 subnet calculator
//!
//! Pure bit arithmetic over 32-bit addresses and CIDR prefixes. No I/O,
//! no async, deterministic for a given input.

use crate::error::{AppError, Result};
use serde::Serialize;
use std::net::Ipv4Addr;

/// Fully derived snapshot of a CIDR block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubnetResult {
    pub network_address: Ipv4Addr,
    pub broadcast_address: Ipv4Addr,
    pub subnet_mask: Ipv4Addr,
    pub wildcard_mask: Ipv4Addr,
    pub first_host: Ipv4Addr,
    pub last_host: Ipv4Addr,
    pub total_hosts: u64,
    pub usable_hosts: u64,
    pub prefix: u8,
    pub ip_class: &'static str,
    pub network_type: &'static str,
}

/// Parse a dotted-quad IPv4 string, rejecting anything that is not exactly
/// four octets in 0-255.
fn parse_ipv4(ip: &str) -> Result<u32> {
    let parts: Vec<&str> = ip.split('.').collect();
    if parts.len() != 4 {
        return Err(AppError::invalid_input(format!(
            "IP address '{}' must have exactly four octets",
            ip
        )));
    }
    let mut value: u32 = 0;
    for part in parts {
        let octet: u32 = part.parse().map_err(|_| {
            AppError::invalid_input(format!("IP address octet '{}' is not a number", part))
        })?;
        if octet > 255 {
            return Err(AppError::invalid_input(format!(
                "IP address octet '{}' is out of range 0-255",
                part
            )));
        }
        value = (value << 8) | octet;
    }
    Ok(value)
}

/// Address class letter derived from the first octet. Informational only,
/// independent of the prefix length.
fn ip_class(first_octet: u8) -> &'static str {
    match first_octet {
        0..=127 => "A",
        128..=191 => "B",
        192..=223 => "C",
        224..=239 => "D (Multicast)",
        _ => "E (Reserved)",
    }
}

/// RFC1918 membership test on the input address.
fn is_private(ip: u32) -> bool {
    let first = (ip >> 24) as u8;
    let second = ((ip >> 16) & 0xFF) as u8;
    first == 10
        || (first == 172 && (16..=31).contains(&second))
        || (first == 192 && second == 168)
}

/// Compute the full subnet snapshot for `ip`/`prefix`.
///
/// For prefixes below /31 the usable range excludes the network and
/// broadcast addresses. /31 keeps first=network and last=broadcast
/// (point-to-point), and /32 collapses to a single host route.
pub fn compute_subnet(ip: &str, prefix: u8) -> Result<SubnetResult> {
    if prefix > 32 {
        return Err(AppError::invalid_input(format!(
            "prefix length {} is out of range 0-32",
            prefix
        )));
    }
    let ip_int = parse_ipv4(ip.trim())?;

    let mask: u32 = if prefix == 0 { 0 } else { u32::MAX << (32 - prefix) };
    let wildcard = !mask;
    let network = ip_int & mask;
    let broadcast = network | wildcard;

    let (first_host, last_host) = if prefix < 31 {
        (network + 1, broadcast - 1)
    } else {
        (network, broadcast)
    };

    let total: u64 = 1u64 << (32 - prefix);
    let usable = if prefix < 31 { total.saturating_sub(2) } else { total };

    Ok(SubnetResult {
        network_address: Ipv4Addr::from(network),
        broadcast_address: Ipv4Addr::from(broadcast),
        subnet_mask: Ipv4Addr::from(mask),
        wildcard_mask: Ipv4Addr::from(wildcard),
        first_host: Ipv4Addr::from(first_host),
        last_host: Ipv4Addr::from(last_host),
        total_hosts: total,
        usable_hosts: usable,
        prefix,
        ip_class: ip_class((ip_int >> 24) as u8),
        network_type: if is_private(ip_int) { "Private" } else { "Public" },
    })
}
