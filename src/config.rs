//! Configuration types for tickerd

use serde::Deserialize;

use crate::store::normalize_ticker;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Upstream price-index service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the price-index API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Ticker symbols to poll, e.g. ["btc_usd", "eth_usd"]
    #[serde(default = "default_tickers")]
    pub tickers: Vec<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://www.deribit.com/api/v2".to_string()
}
fn default_tickers() -> Vec<String> {
    vec!["btc_usd".to_string(), "eth_usd".to_string()]
}
fn default_timeout_secs() -> u64 {
    5
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            tickers: default_tickers(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Fetch scheduling and retry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between scheduled fetch cycles
    #[serde(default = "default_period_secs")]
    pub period_secs: u64,

    /// Additional attempts after a failed cycle attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff interval in milliseconds
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Ceiling for the exponential backoff delay, in seconds
    #[serde(default = "default_backoff_max_secs")]
    pub backoff_max_secs: u64,

    /// Maximum fetch cycles in flight at once
    #[serde(default = "default_max_inflight_cycles")]
    pub max_inflight_cycles: usize,
}

fn default_period_secs() -> u64 {
    60
}
fn default_max_retries() -> u32 {
    3
}
fn default_backoff_base_ms() -> u64 {
    200
}
fn default_backoff_max_secs() -> u64 {
    30
}
fn default_max_inflight_cycles() -> usize {
    1
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            period_secs: 60,
            max_retries: 3,
            backoff_base_ms: 200,
            backoff_max_secs: 30,
            max_inflight_cycles: 1,
        }
    }
}

/// Tick storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// sqlx connection string
    #[serde(default = "default_storage_url")]
    pub url: String,

    /// Connection pool size
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_storage_url() -> String {
    "sqlite://tickerd.db?mode=rwc".to_string()
}
fn default_max_connections() -> u32 {
    5
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            url: default_storage_url(),
            max_connections: default_max_connections(),
        }
    }
}

/// Query API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Address the query API listens on
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format: "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, normalize it, and validate it
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from an embedded TOML string
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Lowercase and trim ticker symbols, dropping empty entries
    fn normalize(&mut self) {
        self.upstream.tickers = self
            .upstream
            .tickers
            .iter()
            .map(|t| normalize_ticker(t))
            .filter(|t| !t.is_empty())
            .collect();
    }

    /// Reject configurations that cannot drive a fetch cycle
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.upstream.tickers.is_empty() {
            anyhow::bail!("upstream.tickers must contain at least one ticker");
        }
        if self.upstream.base_url.trim().is_empty() {
            anyhow::bail!("upstream.base_url must not be empty");
        }
        if self.upstream.timeout_secs == 0 {
            anyhow::bail!("upstream.timeout_secs must be > 0");
        }
        if self.scheduler.period_secs == 0 {
            anyhow::bail!("scheduler.period_secs must be > 0");
        }
        if self.scheduler.backoff_base_ms == 0 {
            anyhow::bail!("scheduler.backoff_base_ms must be > 0");
        }
        if self.scheduler.max_inflight_cycles == 0 {
            anyhow::bail!("scheduler.max_inflight_cycles must be > 0");
        }
        if self.storage.url.trim().is_empty() {
            anyhow::bail!("storage.url must not be empty");
        }
        Ok(())
    }
}
