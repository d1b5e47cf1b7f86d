//! Error handling for subdomain extraction.
//!
//! One error type covers both configuration problems, which abort a run before
//! anything is fetched, and per-URL fetch failures, which the dispatcher
//! swallows at the task boundary.

use std::fmt;
use std::time::Duration;

/// Main error type for subdomain extraction operations.
#[derive(Debug, Clone)]
pub enum ExtractorError {
    /// Target domain is empty or otherwise unusable as a suffix
    InvalidDomain { domain: String, reason: String },

    /// Connection, DNS or TLS failure while fetching a URL
    NetworkError {
        url: String,
        message: String,
        source: Option<String>,
    },

    /// Server answered with something other than `200 OK`
    HttpStatus { url: String, status: u16 },

    /// Response headers arrived but the body could not be read
    BodyRead { url: String, message: String },

    /// A configured per-request timeout elapsed
    Timeout { url: String, duration: Duration },

    /// Configuration errors (invalid settings, conflicting sources, etc.)
    ConfigError { message: String },

    /// File I/O errors for URL lists, output files and config files
    FileError { path: String, message: String },

    /// Generic internal errors that don't fit other categories
    Internal { message: String },
}

impl ExtractorError {
    /// Create a new invalid domain error.
    pub fn invalid_domain<D: Into<String>, R: Into<String>>(domain: D, reason: R) -> Self {
        Self::InvalidDomain {
            domain: domain.into(),
            reason: reason.into(),
        }
    }

    /// Create a new network error.
    pub fn network<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::NetworkError {
            url: url.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a new network error with source information.
    pub fn network_with_source<U: Into<String>, M: Into<String>, S: Into<String>>(
        url: U,
        message: M,
        source: S,
    ) -> Self {
        Self::NetworkError {
            url: url.into(),
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a new non-200 status error.
    pub fn http_status<U: Into<String>>(url: U, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Create a new body read error.
    pub fn body_read<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::BodyRead {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout<U: Into<String>>(url: U, duration: Duration) -> Self {
        Self::Timeout {
            url: url.into(),
            duration,
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error belongs to a single URL and must not abort the run.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. }
                | Self::HttpStatus { .. }
                | Self::BodyRead { .. }
                | Self::Timeout { .. }
        )
    }

    /// Whether this error should stop the process before any fetching starts.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidDomain { .. } | Self::ConfigError { .. } | Self::FileError { .. }
        )
    }

    /// The URL this error is about, if it is a fetch error.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::NetworkError { url, .. }
            | Self::HttpStatus { url, .. }
            | Self::BodyRead { url, .. }
            | Self::Timeout { url, .. } => Some(url),
            _ => None,
        }
    }
}

impl fmt::Display for ExtractorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDomain { domain, reason } => {
                write!(f, "Invalid domain '{}': {}", domain, reason)
            }
            Self::NetworkError {
                url,
                message,
                source,
            } => {
                if let Some(source) = source {
                    write!(f, "Network error for '{}': {} (source: {})", url, message, source)
                } else {
                    write!(f, "Network error for '{}': {}", url, message)
                }
            }
            Self::HttpStatus { url, status } => {
                write!(f, "Received status code {} from '{}'", status, url)
            }
            Self::BodyRead { url, message } => {
                write!(f, "Failed to read body from '{}': {}", url, message)
            }
            Self::Timeout { url, duration } => {
                write!(f, "Timeout after {:?} fetching '{}'", duration, url)
            }
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for ExtractorError {}

impl From<regex::Error> for ExtractorError {
    fn from(err: regex::Error) -> Self {
        Self::Internal {
            message: format!("Regex error: {}", err),
        }
    }
}
