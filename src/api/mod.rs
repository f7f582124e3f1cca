//! Read-only query API
//!
//! Thin HTTP layer over the tick store: latest price, range queries,
//! and a health probe. Ingestion failures never surface here; clients
//! only ever see committed batches.

mod routes;
mod types;

pub use routes::{create_router, ApiState};
pub use types::{ErrorBody, PriceTickOut, PricesParams, RangeParams};
