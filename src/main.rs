//! session-cli: exercise the authenticated client against a live API.
//!
//! # Architecture Overview
//!
//! ```text
//!     caller ──▶ ApiClient ──▶ RefreshCoordinator ──▶ HttpTransport ──▶ remote API
//!                   │                 │  401?                              │
//!                   │                 ├─ driver: POST refresh path ────────┤
//!                   │                 └─ waiters: queued until it settles  │
//!                   │                                                      │
//!                   └── SessionProber ─ GET probe path (cooldown, shared) ─┘
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use session_coordinator::config::loader::{load_config, ConfigError};
use session_coordinator::config::validation::validate_config;
use session_coordinator::config::ClientConfig;
use session_coordinator::observability::{logging, metrics};
use session_coordinator::session::LogRedirect;
use session_coordinator::ApiClient;

#[derive(Parser)]
#[command(name = "session-cli")]
#[command(about = "Authenticated API client with transparent session refresh", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(short, long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue one GET request
    Get { path: String },
    /// Check whether the current session is usable
    Probe,
    /// Fire concurrent GET requests at one path
    Burst {
        path: String,
        #[arg(short = 'n', long, default_value_t = 8)]
        count: usize,
    },
}

/// File (or defaults), then CLI overrides, then validation of the result.
fn resolve_config(
    path: Option<&Path>,
    base_url: Option<String>,
) -> Result<ClientConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    if let Some(base_url) = base_url {
        config.api.base_url = base_url;
    }
    validate_config(&config)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = resolve_config(cli.config.as_deref(), cli.base_url)?;

    logging::init_logging(&config.observability);

    tracing::info!(
        base_url = %config.api.base_url,
        refresh_path = %config.session.refresh_path,
        probe_cooldown_secs = config.session.probe_cooldown_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let client = ApiClient::from_config(&config, Arc::new(LogRedirect))?;

    match cli.command {
        Commands::Get { path } => {
            let resp = client.get(&path).await?;
            println!("{}", resp.status);
            println!("{}", resp.text());
        }
        Commands::Probe => {
            let healthy = client.session_healthy().await;
            println!("session {}", if healthy { "usable" } else { "unusable" });
        }
        Commands::Burst { path, count } => {
            let mut tasks = tokio::task::JoinSet::new();
            for _ in 0..count {
                let client = client.clone();
                let path = path.clone();
                tasks.spawn(async move { client.get(&path).await });
            }

            let (mut ok, mut failed) = (0usize, 0usize);
            while let Some(joined) = tasks.join_next().await {
                match joined? {
                    Ok(_) => ok += 1,
                    Err(e) => {
                        failed += 1;
                        eprintln!("request failed: {e}");
                    }
                }
            }
            println!(
                "{ok} succeeded, {failed} failed, {} refresh exchange(s)",
                client.refresh_count()
            );
        }
    }

    Ok(())
}
