//! Fetch cycle orchestration

use super::types::{CycleReport, IngestError};
use crate::store::{PriceTick, TickStore};
use crate::upstream::PriceSource;
use chrono::Utc;
use std::sync::Arc;

/// Runs one fetch cycle: all configured tickers, one shared timestamp,
/// one atomic batch
///
/// A single failed ticker aborts the whole cycle with nothing
/// persisted. Partial batches would leave "latest price" queries with
/// mixed timestamps across tickers, so the batch is all-or-nothing.
pub struct FetchOrchestrator {
    source: Arc<dyn PriceSource>,
    store: TickStore,
    tickers: Vec<String>,
}

impl FetchOrchestrator {
    pub fn new(source: Arc<dyn PriceSource>, store: TickStore, tickers: Vec<String>) -> Self {
        Self {
            source,
            store,
            tickers,
        }
    }

    /// Fetch every ticker and commit the batch
    ///
    /// The timestamp is captured once, before the first fetch, so every
    /// tick in the batch carries the same value.
    pub async fn run_cycle(&self, attempt: u32) -> Result<CycleReport, IngestError> {
        let ts = Utc::now().timestamp();

        tracing::info!(ts, attempt, tickers = ?self.tickers, "fetch cycle started");

        let mut batch: Vec<PriceTick> = Vec::with_capacity(self.tickers.len());
        for ticker in &self.tickers {
            match self.source.get_index_price(ticker).await {
                Ok(price) => batch.push(PriceTick::new(ticker, ts, price)),
                Err(e) => {
                    tracing::error!(ticker = %ticker, ts, attempt, error = %e, "ticker fetch failed");
                    return Err(e.into());
                }
            }
        }

        if let Err(e) = self.store.append_batch(&batch).await {
            tracing::error!(ts, attempt, rows = batch.len(), error = %e, "batch commit failed");
            return Err(e.into());
        }

        let saved = batch.len();
        tracing::info!(ts, attempt, saved, "fetch cycle succeeded");

        Ok(CycleReport { attempt, ts, saved })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RangeQuery;
    use crate::upstream::UpstreamError;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    /// Scripted price source: each ticker maps to a fixed outcome
    struct ScriptedSource {
        outcomes: HashMap<String, Result<Decimal, UpstreamError>>,
    }

    impl ScriptedSource {
        fn new(outcomes: Vec<(&str, Result<Decimal, UpstreamError>)>) -> Self {
            Self {
                outcomes: outcomes
                    .into_iter()
                    .map(|(t, r)| (t.to_string(), r))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl PriceSource for ScriptedSource {
        async fn get_index_price(&self, ticker: &str) -> Result<Decimal, UpstreamError> {
            self.outcomes
                .get(ticker)
                .cloned()
                .unwrap_or_else(|| Err(UpstreamError::Permanent("unknown ticker".into())))
        }
    }

    async fn memory_store() -> TickStore {
        TickStore::connect("sqlite::memory:", 1).await.unwrap()
    }

    async fn count_rows(store: &TickStore, ticker: &str) -> usize {
        let query = RangeQuery {
            limit: 1000,
            ..Default::default()
        };
        store.range(ticker, &query).await.unwrap().len()
    }

    #[tokio::test]
    async fn test_all_tickers_succeed() {
        let store = memory_store().await;
        let source = ScriptedSource::new(vec![
            ("btc_usd", Ok(dec!(63123.456))),
            ("eth_usd", Ok(dec!(3100.25))),
        ]);
        let orchestrator = FetchOrchestrator::new(
            Arc::new(source),
            store.clone(),
            vec!["btc_usd".into(), "eth_usd".into()],
        );

        let report = orchestrator.run_cycle(0).await.unwrap();
        assert_eq!(report.saved, 2);
        assert_eq!(report.attempt, 0);

        let btc = store.latest("btc_usd").await.unwrap().unwrap();
        let eth = store.latest("eth_usd").await.unwrap().unwrap();
        assert_eq!(btc.ts, report.ts);
        assert_eq!(eth.ts, report.ts);
        assert_eq!(btc.price, dec!(63123.456));
    }

    #[tokio::test]
    async fn test_permanent_failure_persists_nothing() {
        let store = memory_store().await;
        let source = ScriptedSource::new(vec![
            ("btc_usd", Ok(dec!(63123.456))),
            ("eth_usd", Err(UpstreamError::Permanent("HTTP 404".into()))),
            ("sol_usd", Ok(dec!(145.0))),
        ]);
        let orchestrator = FetchOrchestrator::new(
            Arc::new(source),
            store.clone(),
            vec!["btc_usd".into(), "eth_usd".into(), "sol_usd".into()],
        );

        let err = orchestrator.run_cycle(0).await.unwrap_err();
        assert!(!err.is_retryable());
        assert_eq!(count_rows(&store, "btc_usd").await, 0);
        assert_eq!(count_rows(&store, "sol_usd").await, 0);
    }

    #[tokio::test]
    async fn test_transient_failure_persists_nothing_and_is_retryable() {
        let store = memory_store().await;
        let source = ScriptedSource::new(vec![
            ("btc_usd", Ok(dec!(63123.456))),
            ("eth_usd", Err(UpstreamError::Transient("HTTP 503".into()))),
        ]);
        let orchestrator = FetchOrchestrator::new(
            Arc::new(source),
            store.clone(),
            vec!["btc_usd".into(), "eth_usd".into()],
        );

        let err = orchestrator.run_cycle(0).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(count_rows(&store, "btc_usd").await, 0);
    }

    #[tokio::test]
    async fn test_rerun_creates_new_batch() {
        let store = memory_store().await;
        let source = Arc::new(ScriptedSource::new(vec![("btc_usd", Ok(dec!(100.0)))]));
        let orchestrator =
            FetchOrchestrator::new(source, store.clone(), vec!["btc_usd".into()]);

        orchestrator.run_cycle(0).await.unwrap();
        orchestrator.run_cycle(0).await.unwrap();

        assert_eq!(count_rows(&store, "btc_usd").await, 2);
    }
}
