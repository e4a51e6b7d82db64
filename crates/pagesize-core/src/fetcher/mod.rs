//! Fetcher boundary: resource identifier in, content length (or failure) out.
//!
//! Implementations are blocking; workers call them from `spawn_blocking`.

mod http;

use std::fmt;

use crate::error::FetchError;

pub use http::{resource_url, CurlFetcher};

/// Fetches one resource and returns its body length in bytes.
///
/// Must not panic on ordinary network failure; return a `FetchError` instead.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(&self, id: &str) -> Result<u64, FetchError>;
}

impl<F> Fetcher for F
where
    F: Fn(&str) -> Result<u64, FetchError> + Send + Sync + 'static,
{
    fn fetch(&self, id: &str) -> Result<u64, FetchError> {
        self(id)
    }
}

/// Recorded result for one resource. A failure is never a zero length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Length(u64),
    Failed,
}

impl FetchOutcome {
    /// Byte length for a successful fetch, `None` for a failure.
    pub fn length(&self) -> Option<u64> {
        match self {
            FetchOutcome::Length(n) => Some(*n),
            FetchOutcome::Failed => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed)
    }
}

impl<E> From<Result<u64, E>> for FetchOutcome {
    fn from(res: Result<u64, E>) -> Self {
        match res {
            Ok(n) => FetchOutcome::Length(n),
            Err(_) => FetchOutcome::Failed,
        }
    }
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchOutcome::Length(n) => write!(f, "{}", n),
            FetchOutcome::Failed => write!(f, "failed"),
        }
    }
}
