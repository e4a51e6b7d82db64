//! Error types for pagesize.
//!
//! Configuration errors are fatal and surface before any worker starts.
//! Fetch errors stay local to one resource: the worker records them as a
//! failed outcome and moves on.

use thiserror::Error;

/// Invalid run configuration (CLI timeout, config file values).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Timeout argument is not an integer.
    #[error("invalid timeout '{value}': expected a whole number of seconds (e.g. 10)")]
    InvalidTimeout { value: String },

    /// Timeout argument is zero or negative.
    #[error("timeout must be a positive number of seconds, got {value}")]
    NonPositiveTimeout { value: String },

    #[error("workers must be at least 1")]
    ZeroWorkers,

    #[error("queue_capacity must be at least 1")]
    ZeroQueueCapacity,

    /// An `[http]` timeout is zero.
    #[error("http.{field} must be at least 1 second")]
    ZeroHttpTimeout { field: &'static str },
}

/// Failure of a single fetch attempt. Never escapes the worker that saw it.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Identifier could not be turned into a URL.
    #[error("invalid resource '{id}': {reason}")]
    InvalidUrl { id: String, reason: String },

    /// Connection, DNS, TLS or timeout failure reported by curl.
    #[error("transfer failed: {0}")]
    Transfer(#[source] curl::Error),

    /// Connection succeeded but the body could not be read to the end.
    #[error("failed to read response body: {0}")]
    BodyRead(#[source] curl::Error),

    /// Non-2xx status with `fail_on_http_error` enabled.
    #[error("HTTP {0}")]
    Http(u32),

    /// The fetch attempt panicked; contained to this one resource.
    #[error("fetch aborted: {0}")]
    Aborted(String),
}

impl From<curl::Error> for FetchError {
    fn from(e: curl::Error) -> Self {
        if e.is_partial_file()
            || e.is_read_error()
            || e.is_recv_error()
            || e.is_write_error()
            || e.is_bad_content_encoding()
        {
            FetchError::BodyRead(e)
        } else {
            FetchError::Transfer(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_messages_are_user_facing() {
        let e = ConfigError::NonPositiveTimeout {
            value: "0".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "timeout must be a positive number of seconds, got 0"
        );
        let e = ConfigError::ZeroHttpTimeout {
            field: "connect_timeout_secs",
        };
        assert!(e.to_string().contains("http.connect_timeout_secs"));
    }

    #[test]
    fn fetch_error_http_display() {
        assert_eq!(FetchError::Http(404).to_string(), "HTTP 404");
    }
}
