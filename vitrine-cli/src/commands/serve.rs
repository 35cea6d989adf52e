//! HTTP server command
//!
//! Builds the pool, runs migrations, constructs the outbound clients from
//! the environment config, and blocks on the server until shutdown.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;

use vitrine_core::AppConfig;
use vitrine_server::db::{create_pool, migrations};
use vitrine_server::{run_server, AppState, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (overrides VITRINE_BIND)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let mut config = AppConfig::from_env().context("Failed to load configuration")?;

    // CLI flags win over environment
    if let Some(url) = args.database_url {
        config.database_url = url;
    }
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if args.cors_permissive {
        config.cors_permissive = true;
    }

    tracing::info!("Starting vitrine server on {}", config.bind_addr);

    let pool = create_pool(&config.database_url)
        .await
        .context("Failed to create database pool")?;

    migrations::run(&pool)
        .await
        .context("Failed to run migrations")?;

    let server_config = ServerConfig {
        bind_addr: config.bind_addr,
        cors_permissive: config.cors_permissive,
    };
    let state = AppState::new(pool, config);

    // Run server (blocks until shutdown)
    run_server(state, server_config)
        .await
        .context("Server error")?;

    Ok(())
}
