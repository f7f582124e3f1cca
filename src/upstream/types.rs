//! Upstream error taxonomy

use thiserror::Error;

/// Failure classification for one upstream request
///
/// Transient failures are safe to retry; permanent failures reproduce
/// themselves, so retrying is wasted work.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpstreamError {
    /// Temporary failure. Safe to retry.
    #[error("transient upstream error: {0}")]
    Transient(String),
    /// Permanent failure. Retrying won't help.
    #[error("permanent upstream error: {0}")]
    Permanent(String),
}

impl UpstreamError {
    pub fn is_transient(&self) -> bool {
        matches!(self, UpstreamError::Transient(_))
    }
}
