//! Error handling for the network toolbox

use thiserror::Error;

/// Custom error types for the network toolbox
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed address, prefix, port range or URL, rejected before any I/O
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Hostname could not be resolved
    #[error("Resolution error: {0}")]
    Resolution(String),

    /// Operation exceeded its time bound
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Connection refused, reset, TLS failure or other transport fault
    #[error("Transport error: {0}")]
    Transport(String),

    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    Http(String),

    /// External tracing utility missing or not executable
    #[error("External tool unavailable: {0}")]
    ExternalTool(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Parsing errors (URLs, integers, addresses)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a new resolution error
    pub fn resolution<S: Into<String>>(message: S) -> Self {
        Self::Resolution(message.into())
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport(message.into())
    }

    /// Create a new HTTP error
    pub fn http<S: Into<String>>(message: S) -> Self {
        Self::Http(message.into())
    }

    /// Create a new external tool error
    pub fn external_tool<S: Into<String>>(message: S) -> Self {
        Self::ExternalTool(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INPUT",
            Self::Resolution(_) => "DNS",
            Self::Timeout(_) => "TIMEOUT",
            Self::Transport(_) => "TRANSPORT",
            Self::Http(_) => "HTTP",
            Self::ExternalTool(_) => "TOOL",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Check if retrying the user action could succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Resolution(_) | Self::Timeout(_) | Self::Transport(_) | Self::Http(_) => true,
            Self::InvalidInput(_) | Self::Parse(_) => false,
            Self::ExternalTool(_) | Self::Io(_) | Self::Internal(_) => false,
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidInput(_) | Self::Parse(_) => 1,
            Self::Resolution(_) | Self::Transport(_) | Self::Http(_) => 2,
            Self::Timeout(_) => 3,
            Self::ExternalTool(_) => 4,
            Self::Io(_) => 5,
            Self::Internal(_) => 99,
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::InvalidInput(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Resolution(_) | Self::Transport(_) | Self::Http(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Timeout(_) => {
                    format!("[{}] {}", category.blue().bold(), message.blue())
                }
                Self::ExternalTool(_) | Self::Io(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::TimedOut => Self::timeout(error.to_string()),
            std::io::ErrorKind::ConnectionRefused
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted => Self::transport(error.to_string()),
            _ => Self::io(error.to_string()),
        }
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::invalid_input(format!("URL parse error: {}", error))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::timeout(error.to_string())
        } else if error.is_connect() || error.is_request() {
            Self::transport(error.to_string())
        } else {
            Self::http(error.to_string())
        }
    }
}

impl From<trust_dns_resolver::error::ResolveError> for AppError {
    fn from(error: trust_dns_resolver::error::ResolveError) -> Self {
        Self::resolution(error.to_string())
    }
}

impl From<std::net::AddrParseError> for AppError {
    fn from(error: std::net::AddrParseError) -> Self {
        Self::parse(format!("IP address parse error: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::parse(format!("Integer parse error: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON error: {}", error))
    }
}

// Anyhow integration
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::internal(error.to_string())
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;
