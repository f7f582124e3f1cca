//! Upstream price-index client
//!
//! One request, one response, one classified error. Retrying is the
//! scheduler's job, not this module's.

mod client;
mod types;

pub use client::IndexClient;
pub use types::UpstreamError;

use async_trait::async_trait;
use rust_decimal::Decimal;

/// Trait for price sources the orchestrator can fetch from
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Current index price for a ticker symbol
    async fn get_index_price(&self, ticker: &str) -> Result<Decimal, UpstreamError>;
}
