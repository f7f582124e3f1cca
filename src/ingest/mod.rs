//! Ingestion pipeline
//!
//! One scheduled tick runs one fetch cycle: fetch every configured
//! ticker, assemble a batch sharing a single timestamp, commit it
//! atomically. Any failure aborts the cycle with nothing persisted.

mod orchestrator;
mod types;

pub use orchestrator::FetchOrchestrator;
pub use types::{CycleReport, IngestError};
