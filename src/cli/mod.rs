//! CLI interface for tickerd
//!
//! Provides subcommands for:
//! - `serve`: run the fetch scheduler and the query API
//! - `fetch`: run a single fetch cycle and exit
//! - `config`: show the effective configuration

mod fetch;
mod serve;

pub use fetch::FetchArgs;
pub use serve::ServeArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "tickerd")]
#[command(about = "Price-index polling daemon with a read-only query API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the fetch scheduler and the query API
    Serve(ServeArgs),
    /// Run a single fetch cycle and exit
    Fetch(FetchArgs),
    /// Show the effective configuration
    Config,
}
