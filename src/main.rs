use clap::Parser;
use tickerd::cli::{Cli, Commands};
use tickerd::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::from_toml_str(include_str!("../config.toml.example"))
            .expect("Invalid default config")
    });

    // Initialize telemetry
    tickerd::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Serve(args) => {
            tracing::info!("Starting tickerd");
            args.execute(&config).await?;
        }
        Commands::Fetch(args) => {
            tracing::info!("Running single fetch cycle");
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Upstream: {}", config.upstream.base_url);
            println!("  Tickers: {}", config.upstream.tickers.join(", "));
            println!(
                "  Schedule: every {}s, {} retries, {}ms backoff base",
                config.scheduler.period_secs,
                config.scheduler.max_retries,
                config.scheduler.backoff_base_ms
            );
            println!("  Storage: {}", config.storage.url);
            println!("  API: {}", config.api.bind_addr);
        }
    }

    Ok(())
}
