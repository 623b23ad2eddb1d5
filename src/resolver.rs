//! Forward and reverse DNS resolution

use crate::error::{AppError, Result};
use serde::Serialize;
use std::net::IpAddr;
use trust_dns_resolver::{system_conf, TokioAsyncResolver};

/// DNS record classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecordType {
    A,
    Aaaa,
    Ptr,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Ptr => "PTR",
        }
    }
}

/// One resolved record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DnsRecord {
    pub record_type: RecordType,
    pub value: String,
}

impl DnsRecord {
    fn from_addr(addr: IpAddr) -> Self {
        let record_type = if addr.is_ipv6() { RecordType::Aaaa } else { RecordType::A };
        Self {
            record_type,
            value: addr.to_string(),
        }
    }
}

/// Hostname resolver backed by the system DNS configuration
pub struct Resolver {
    inner: TokioAsyncResolver,
}

impl Resolver {
    /// Create a resolver from the platform's DNS configuration.
    pub fn from_system_conf() -> Result<Self> {
        let (config, opts) = system_conf::read_system_conf().map_err(|e| {
            AppError::resolution(format!("Failed to read system DNS config: {}", e))
        })?;
        Ok(Self {
            inner: TokioAsyncResolver::tokio(config, opts),
        })
    }

    /// Resolve `hostname` into A/AAAA records, plus a PTR record when the
    /// reverse name of the first address differs from its literal form.
    ///
    /// Reverse-lookup failure is ignored; it never fails the overall call.
    /// The resolver performs no retries beyond what the platform already
    /// does.
    pub async fn resolve(&self, hostname: &str) -> Result<Vec<DnsRecord>> {
        let hostname = hostname.trim();
        if hostname.is_empty() {
            return Err(AppError::invalid_input("hostname must not be empty"));
        }

        let lookup = self
            .inner
            .lookup_ip(hostname)
            .await
            .map_err(|e| AppError::resolution(format!("{}: {}", hostname, e)))?;

        let addresses: Vec<IpAddr> = lookup.iter().collect();
        if addresses.is_empty() {
            return Err(AppError::resolution(format!("{}: no addresses returned", hostname)));
        }

        let mut records: Vec<DnsRecord> = addresses.iter().copied().map(DnsRecord::from_addr).collect();

        if let Some(&first) = addresses.first() {
            if let Ok(reverse) = self.inner.reverse_lookup(first).await {
                if let Some(name) = reverse.iter().next() {
                    let name = name.to_string().trim_end_matches('.').to_string();
                    if name != first.to_string() {
                        records.push(DnsRecord {
                            record_type: RecordType::Ptr,
                            value: name,
                        });
                    }
                }
            }
        }

        Ok(records)
    }

    /// Resolve and return only the first address, for callers that need a
    /// single target (traceroute fallback).
    pub async fn resolve_first(&self, hostname: &str) -> Result<IpAddr> {
        let lookup = self
            .inner
            .lookup_ip(hostname.trim())
            .await
            .map_err(|e| AppError::resolution(format!("{}: {}", hostname, e)))?;
        lookup
            .iter()
            .next()
            .ok_or_else(|| AppError::resolution(format!("{}: no addresses returned", hostname)))
    }

    /// Best-effort reverse lookup, `None` when nothing is found.
    pub async fn reverse(&self, addr: IpAddr) -> Option<String> {
        let reverse = self.inner.reverse_lookup(addr).await.ok()?;
        reverse
            .iter()
            .next()
            .map(|name| name.to_string().trim_end_matches('.').to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_type_labels() {
        assert_eq!(RecordType::A.as_str(), "A");
        assert_eq!(RecordType::Aaaa.as_str(), "AAAA");
        assert_eq!(RecordType::Ptr.as_str(), "PTR");
    }

    #[test]
    fn test_record_classification_from_addr() {
        let v4 = DnsRecord::from_addr("93.184.216.34".parse().unwrap());
        assert_eq!(v4.record_type, RecordType::A);
        assert_eq!(v4.value, "93.184.216.34");

        let v6 = DnsRecord::from_addr("2606:2800:220:1:248:1893:25c8:1946".parse().unwrap());
        assert_eq!(v6.record_type, RecordType::Aaaa);
        assert!(v6.value.contains(':'));
    }

    #[tokio::test]
    async fn test_empty_hostname_rejected() {
        let resolver = Resolver::from_system_conf().unwrap();
        let err = resolver.resolve("   ").await.unwrap_err();
        assert_eq!(err.category(), "INPUT");
    }

    #[tokio::test]
    async fn test_localhost_resolves() {
        let resolver = Resolver::from_system_conf().unwrap();
        let records = resolver.resolve("localhost").await.unwrap();
        assert!(!records.is_empty());
        assert!(records
            .iter()
            .all(|r| matches!(r.record_type, RecordType::A | RecordType::Aaaa | RecordType::Ptr)));
    }
}
