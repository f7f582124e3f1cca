//! Fetch cycle types

use crate::upstream::UpstreamError;
use thiserror::Error;

/// Failure of one fetch cycle attempt
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    /// Storage failures are retried at the cycle level
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl IngestError {
    /// Whether the scheduler should retry the cycle
    pub fn is_retryable(&self) -> bool {
        match self {
            IngestError::Upstream(e) => e.is_transient(),
            IngestError::Storage(_) => true,
        }
    }
}

/// Outcome of a successful fetch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Zero-based attempt number that succeeded
    pub attempt: u32,
    /// Unix timestamp shared by every tick in the batch
    pub ts: i64,
    /// Number of rows committed
    pub saved: usize,
}
