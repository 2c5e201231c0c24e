//! `prizedeskd`: the prize desk server binary.
//!
//! Usage:
//!   prizedeskd -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/prizedesk/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod bootstrap;
mod config;
mod routes;

use std::sync::Arc;

use clap::Parser;
use prizedesk_core::Module;
use tracing::info;

use config::ServerConfig;

/// Prize desk server.
#[derive(Parser, Debug)]
#[command(name = "prizedeskd", about = "Event prize desk server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address.
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;

    bootstrap::verify_config(&server_config)?;

    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let core_config = prizedesk_core::ServiceConfig {
        data_dir: Some(data_dir),
        listen: cli.listen.clone(),
        ..Default::default()
    };

    let sql: Arc<dyn prizedesk_sql::SQLStore> = Arc::new(
        prizedesk_sql::SqliteStore::open(&core_config.resolve_sqlite_path())
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );

    let catalog = bootstrap::build_catalog(&server_config)?;
    info!(
        "Prize catalog v{} with {} tiers",
        catalog.version(),
        catalog.tiers().len()
    );

    let gate = bootstrap::build_gate(&server_config);
    match gate.ends_at() {
        Some(end) => info!("Event closes at {}", end.to_rfc3339()),
        None => info!("Event has no configured end"),
    }

    let award_module = award::AwardModule::new(sql, catalog, Arc::new(gate))?;
    info!("Award module initialized");

    let app = routes::build_router(vec![(award_module.name(), award_module.routes())]);

    let listener = tokio::net::TcpListener::bind(&core_config.listen).await?;
    info!("Prize desk listening on {}", core_config.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
