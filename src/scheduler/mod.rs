//! Periodic fetch scheduling with bounded retry
//!
//! A single interval timer drives fetch cycles. Each scheduled tick
//! runs one cycle; a retryable failure is retried with exponential
//! backoff plus jitter up to a bounded attempt count, a permanent
//! failure abandons the cycle immediately. An in-flight cap keeps
//! overlapping cycles from interleaving writes; ticks that fire while
//! the cap is saturated are skipped.

use crate::config::SchedulerConfig;
use crate::ingest::{CycleReport, FetchOrchestrator};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Semaphore};
use tokio::time::MissedTickBehavior;

/// Drives fetch cycles on a fixed period until shutdown
pub struct FetchScheduler {
    orchestrator: Arc<FetchOrchestrator>,
    config: SchedulerConfig,
}

impl FetchScheduler {
    pub fn new(orchestrator: Arc<FetchOrchestrator>, config: SchedulerConfig) -> Self {
        Self {
            orchestrator,
            config,
        }
    }

    /// Run the scheduling loop until the shutdown channel flips
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(Duration::from_secs(self.config.period_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let inflight = Arc::new(Semaphore::new(self.config.max_inflight_cycles));

        tracing::info!(
            period_secs = self.config.period_secs,
            max_retries = self.config.max_retries,
            "scheduler started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let permit = match inflight.clone().try_acquire_owned() {
                        Ok(permit) => permit,
                        Err(_) => {
                            tracing::warn!("previous fetch cycle still in flight, skipping tick");
                            continue;
                        }
                    };

                    let orchestrator = self.orchestrator.clone();
                    let config = self.config.clone();
                    let cycle_shutdown = shutdown.clone();
                    tokio::spawn(async move {
                        let _permit = permit;
                        run_with_retry(&orchestrator, &config, cycle_shutdown).await;
                    });
                }
                _ = shutdown.changed() => {
                    tracing::info!("scheduler shutting down");
                    break;
                }
            }
        }
    }
}

/// Run one cycle, retrying retryable failures up to `max_retries`
/// additional attempts
///
/// Attempts are sequential: attempt N+1 starts only after attempt N
/// has concluded and its backoff delay has elapsed. Returns None when
/// the cycle is abandoned.
pub async fn run_with_retry(
    orchestrator: &FetchOrchestrator,
    config: &SchedulerConfig,
    mut shutdown: watch::Receiver<bool>,
) -> Option<CycleReport> {
    for attempt in 0..=config.max_retries {
        match orchestrator.run_cycle(attempt).await {
            Ok(report) => return Some(report),
            Err(e) if !e.is_retryable() => {
                tracing::error!(attempt, error = %e, "cycle abandoned on permanent failure");
                return None;
            }
            Err(e) => {
                if attempt == config.max_retries {
                    tracing::error!(attempt, error = %e, "cycle failed, retries exhausted");
                    return None;
                }

                let delay = retry_delay(config, attempt);
                tracing::warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "cycle attempt failed, backing off"
                );

                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = shutdown.changed() => {
                        tracing::info!(attempt, "shutdown during backoff, abandoning cycle");
                        return None;
                    }
                }
            }
        }
    }

    None
}

/// Exponential backoff with jitter: `base * 2^attempt` capped at
/// `backoff_max_secs`, plus a random slice of the base interval so
/// concurrent deployments don't retry in lockstep
pub fn retry_delay(config: &SchedulerConfig, attempt: u32) -> Duration {
    let exponent = attempt.min(16);
    let base_ms = config
        .backoff_base_ms
        .saturating_mul(1u64 << exponent)
        .min(config.backoff_max_secs * 1000);
    let jitter_ms = rand::thread_rng().gen_range(0..=config.backoff_base_ms);

    Duration::from_millis(base_ms + jitter_ms)
}
