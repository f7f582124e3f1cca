//! Serve command implementation

use crate::api::{self, ApiState};
use crate::config::Config;
use crate::ingest::FetchOrchestrator;
use crate::scheduler::FetchScheduler;
use crate::store::TickStore;
use crate::upstream::IndexClient;
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Run the scheduler only, without the query API
    #[arg(long)]
    pub no_api: bool,

    /// Run the query API only, without the scheduler
    #[arg(long)]
    pub no_scheduler: bool,
}

impl ServeArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        if self.no_api && self.no_scheduler {
            anyhow::bail!("--no-api and --no-scheduler together leave nothing to run");
        }

        let store = TickStore::connect(&config.storage.url, config.storage.max_connections)
            .await
            .map_err(|e| anyhow::anyhow!("storage connect failed: {}", e))?;
        tracing::info!(url = %config.storage.url, "tick store ready");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let scheduler_handle = if self.no_scheduler {
            None
        } else {
            let client = IndexClient::new(&config.upstream)?;
            let orchestrator = Arc::new(FetchOrchestrator::new(
                Arc::new(client),
                store.clone(),
                config.upstream.tickers.clone(),
            ));
            let scheduler = FetchScheduler::new(orchestrator, config.scheduler.clone());
            let rx = shutdown_rx.clone();
            Some(tokio::spawn(async move { scheduler.run(rx).await }))
        };

        if self.no_api {
            tokio::signal::ctrl_c().await?;
            tracing::info!("shutdown signal received");
        } else {
            let state = Arc::new(ApiState {
                store: store.clone(),
            });
            let app = api::create_router(state);
            let listener = tokio::net::TcpListener::bind(&config.api.bind_addr).await?;
            tracing::info!(addr = %config.api.bind_addr, "query API listening");

            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                    tracing::info!("shutdown signal received");
                })
                .await?;
        }

        // Stop the scheduler and wait for the in-flight cycle to settle
        let _ = shutdown_tx.send(true);
        if let Some(handle) = scheduler_handle {
            handle.await?;
        }

        Ok(())
    }
}
