//! Query API request and response schemas

use crate::store::PriceTick;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One tick as returned by the query endpoints
#[derive(Debug, Serialize)]
pub struct PriceTickOut {
    pub ticker: String,
    pub ts: i64,
    pub price: Decimal,
}

impl From<PriceTick> for PriceTickOut {
    fn from(tick: PriceTick) -> Self {
        Self {
            ticker: tick.ticker,
            ts: tick.ts,
            price: tick.price,
        }
    }
}

/// Structured error body, e.g. `{"detail": "no data for this ticker yet"}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Parameters for /prices and /prices/latest
#[derive(Debug, Deserialize)]
pub struct PricesParams {
    pub ticker: String,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// Parameters for /prices/range; bounds are inclusive Unix seconds
#[derive(Debug, Deserialize)]
pub struct RangeParams {
    pub ticker: String,
    pub from_ts: Option<i64>,
    pub to_ts: Option<i64>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

pub(crate) fn default_limit() -> i64 {
    1000
}

pub(crate) const MAX_LIMIT: i64 = 10_000;
