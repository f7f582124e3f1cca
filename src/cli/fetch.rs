//! Fetch command implementation

use crate::config::Config;
use crate::ingest::FetchOrchestrator;
use crate::scheduler;
use crate::store::{normalize_ticker, TickStore};
use crate::upstream::IndexClient;
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Override the configured ticker list for this run
    #[arg(long, value_delimiter = ',')]
    pub tickers: Option<Vec<String>>,
}

impl FetchArgs {
    /// Run one fetch cycle with the configured retry policy and exit
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let tickers = match &self.tickers {
            Some(list) => {
                let normalized: Vec<String> = list
                    .iter()
                    .map(|t| normalize_ticker(t))
                    .filter(|t| !t.is_empty())
                    .collect();
                if normalized.is_empty() {
                    anyhow::bail!("--tickers must contain at least one ticker");
                }
                normalized
            }
            None => config.upstream.tickers.clone(),
        };

        let store = TickStore::connect(&config.storage.url, config.storage.max_connections)
            .await
            .map_err(|e| anyhow::anyhow!("storage connect failed: {}", e))?;
        let client = IndexClient::new(&config.upstream)?;
        let orchestrator = Arc::new(FetchOrchestrator::new(
            Arc::new(client),
            store,
            tickers,
        ));

        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        match scheduler::run_with_retry(&orchestrator, &config.scheduler, shutdown_rx).await {
            Some(report) => {
                println!(
                    "cycle succeeded: ts={} saved={} attempt={}",
                    report.ts, report.saved, report.attempt
                );
                Ok(())
            }
            None => anyhow::bail!("fetch cycle failed"),
        }
    }
}
