//! Tick storage types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// One price observation for a ticker at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceTick {
    /// Normalized lowercase symbol, e.g. "btc_usd"
    pub ticker: String,
    /// Unix seconds, shared by every tick in the same fetch cycle
    pub ts: i64,
    /// High-precision price, parsed via string to avoid binary-float drift
    pub price: Decimal,
}

impl PriceTick {
    /// Create a tick with a normalized ticker symbol
    pub fn new(ticker: impl AsRef<str>, ts: i64, price: Decimal) -> Self {
        Self {
            ticker: normalize_ticker(ticker.as_ref()),
            ts,
            price,
        }
    }
}

/// Range query parameters; bounds are inclusive Unix seconds
#[derive(Debug, Clone, Default)]
pub struct RangeQuery {
    pub from_ts: Option<i64>,
    pub to_ts: Option<i64>,
    pub limit: i64,
    pub offset: i64,
}

/// Canonical symbol form used everywhere: trimmed and lowercased
pub fn normalize_ticker(ticker: &str) -> String {
    ticker.trim().to_lowercase()
}

/// Insertion timestamp for a committed batch, audit only
pub(crate) fn insertion_time() -> DateTime<Utc> {
    Utc::now()
}
