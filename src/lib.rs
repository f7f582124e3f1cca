//! tickerd: price-index polling daemon
//!
//! This library provides the core components for:
//! - Polling an external price-index API for configured tickers
//! - Classifying upstream failures into retryable vs. fatal
//! - Scheduled fetch cycles with bounded exponential-backoff retry
//! - Atomic, all-or-nothing batch persistence of price ticks
//! - A read-only query API over the stored ticks

pub mod api;
pub mod cli;
pub mod config;
pub mod ingest;
pub mod scheduler;
pub mod store;
pub mod telemetry;
pub mod upstream;
