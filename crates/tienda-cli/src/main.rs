//! # tienda CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;

use tienda_cli::config::AppConfig;

/// tienda — e-commerce REST backend.
///
/// Serves the catalog, client, order placement, billing, and review
/// APIs over PostgreSQL.
#[derive(Parser, Debug)]
#[command(name = "tienda", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the API server.
    Serve(tienda_cli::serve::ServeArgs),
    /// Apply database migrations and exit.
    Migrate(tienda_cli::migrate::MigrateArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    match cli.command {
        Commands::Serve(args) => tienda_cli::serve::run(args, config).await,
        Commands::Migrate(args) => tienda_cli::migrate::run(args, config).await,
    }
}
