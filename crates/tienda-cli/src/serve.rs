//! # Serve Subcommand
//!
//! Builds the pool, applies migrations, installs the Prometheus
//! exporter, and serves the API until SIGINT.

use anyhow::Context;
use clap::Args;
use metrics_exporter_prometheus::PrometheusBuilder;
use sqlx::postgres::PgPoolOptions;

use tienda_api::AppState;

use crate::config::AppConfig;

/// Arguments for `tienda serve`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Override the listen host from the environment.
    #[arg(long)]
    pub host: Option<String>,

    /// Override the listen port from the environment.
    #[arg(long)]
    pub port: Option<u16>,

    /// Skip applying migrations on startup.
    #[arg(long)]
    pub skip_migrations: bool,
}

/// Run the server.
pub async fn run(args: ServeArgs, config: AppConfig) -> anyhow::Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.db_acquire_timeout)
        .connect(&config.database_url)
        .await
        .context("connect to the database")?;

    if args.skip_migrations {
        tracing::info!("skipping migrations");
    } else {
        tienda_postgres::migrate(&pool)
            .await
            .context("apply migrations")?;
    }

    PrometheusBuilder::new()
        .install()
        .context("install the Prometheus exporter")?;

    let state = AppState::new(pool, config.tax_rate);
    let app = tienda_api::app(state);

    let host = args.host.unwrap_or(config.host);
    let port = args.port.unwrap_or(config.port);
    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("bind {host}:{port}"))?;
    tracing::info!(%host, port, "serving");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve")?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("could not listen for the shutdown signal");
    }
}
