//! Single HTTP(S) status check
//!
//! Performs one request, capturing status, timing, headers and the
//! redirect target. Redirects are only followed when configured; there
//! are no retries.

use crate::config::HttpConfig;
use crate::error::{AppError, Result};
use reqwest::{redirect, Client};
use serde::Serialize;
use std::time::Instant;

/// Captured outcome of one HTTP check
#[derive(Debug, Clone, Serialize)]
pub struct HttpCheckResult {
    pub final_url: String,
    pub status_code: u16,
    pub status_message: String,
    pub elapsed_ms: u64,
    pub content_type: Option<String>,
    /// Response headers in wire order; repeated names are kept
    pub headers: Vec<(String, String)>,
    /// Location header when redirects are disabled and the response is 3xx
    pub redirect_location: Option<String>,
}

/// Static reason-phrase table for transports that do not supply one
pub fn reason_phrase(code: u16) -> &'static str {
    match code {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Prepend `https://` when the input has no http/https scheme.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// HTTP status checker
pub struct HttpChecker {
    client: Client,
    follow_redirects: bool,
}

impl HttpChecker {
    /// Build a checker applying the configured timeout to both connect
    /// and overall request, and a redirect policy from the
    /// follow-redirects flag.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let policy = if config.follow_redirects {
            redirect::Policy::limited(10)
        } else {
            redirect::Policy::none()
        };
        let client = Client::builder()
            .connect_timeout(config.timeout())
            .timeout(config.timeout())
            .redirect(policy)
            .user_agent(concat!("network-toolbox/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::transport(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            follow_redirects: config.follow_redirects,
        })
    }

    /// Check `raw_url` with a single GET. Elapsed time is measured from
    /// request start to response headers received. Transport failures
    /// (DNS, TLS, refused, timeout) surface as errors.
    pub async fn check(&self, raw_url: &str) -> Result<HttpCheckResult> {
        let url = normalize_url(raw_url);
        url::Url::parse(&url)?;

        let start = Instant::now();
        let response = self.client.get(&url).send().await.map_err(AppError::from)?;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let status = response.status();
        let status_message = status
            .canonical_reason()
            .unwrap_or_else(|| reason_phrase(status.as_u16()))
            .to_string();

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();

        let content_type = headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .map(|(_, value)| value.clone());

        let redirect_location = if !self.follow_redirects && status.is_redirection() {
            headers
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case("location"))
                .map(|(_, value)| value.clone())
        } else {
            None
        };

        Ok(HttpCheckResult {
            final_url: response.url().to_string(),
            status_code: status.as_u16(),
            status_message,
            elapsed_ms,
            content_type,
            headers,
            redirect_location,
        })
    }
}
