//! Recipe Hub - Entry Point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use recipe_hub::client::TokenCachePolicy;
use recipe_hub::{config::Config, server::Server, store::FileStore};

#[derive(Parser, Debug)]
#[command(name = "recipe-hub")]
#[command(about = "Recipe catalog site with accounts, quiz and FatSecret search")]
#[command(version)]
struct Cli {
    /// HTTP server port
    #[arg(long, default_value = "3000", env = "PORT")]
    port: u16,

    /// Directory holding users.json and questions.json
    #[arg(long, env = "DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Access token reuse policy
    #[arg(long, value_enum, env = "TOKEN_CACHE_POLICY")]
    token_policy: Option<TokenCachePolicy>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    let mut config = Config::from_env()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(policy) = cli.token_policy {
        config.token_policy = policy;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cli.port,
        config = ?config,
        "Starting Recipe Hub"
    );

    let store = FileStore::open(config.data_dir.clone())
        .await
        .with_context(|| format!("failed to open data store at {}", config.data_dir.display()))?;

    let server = Server::new(&config, Arc::new(store))?;
    server.run(cli.port).await
}
