//! # Migrate Subcommand
//!
//! Applies the embedded migrations and exits. `serve` does the same on
//! startup; this exists for deployment pipelines that migrate first.

use anyhow::Context;
use clap::Args;
use sqlx::postgres::PgPoolOptions;

use crate::config::AppConfig;

/// Arguments for `tienda migrate`.
#[derive(Args, Debug)]
pub struct MigrateArgs {}

/// Apply pending migrations.
pub async fn run(_args: MigrateArgs, config: AppConfig) -> anyhow::Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&config.database_url)
        .await
        .context("connect to the database")?;

    tienda_postgres::migrate(&pool)
        .await
        .context("apply migrations")?;
    tracing::info!("migrations applied");
    Ok(())
}
