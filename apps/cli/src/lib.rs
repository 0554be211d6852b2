//! # warehouse-cli
//!
//! The `warehouse` binary: a generic browser and editor for the tables of
//! the warehouse database.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. init_tracing()          RUST_LOG or "info,warehouse=debug,sqlx=warn"│
//! │  2. AppConfig::load()       defaults → warehouse.toml → WAREHOUSE_*    │
//! │  3. Database::new()         SQLite pool, migrations                     │
//! │  4. commands::dispatch()    sign in, run the subcommand                 │
//! │  5. Database::close()                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

use std::io::Write;

use tracing::info;
use tracing_subscriber::EnvFilter;
use warehouse_db::{Database, DbConfig};

pub use cli::{Cli, Command, Credentials, OutputFormat};
pub use commands::App;
pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Logs go to stderr so that stdout carries only command output.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,warehouse=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Opens the configured database.
pub async fn open_database(config: &AppConfig) -> AppResult<Database> {
    let path = config.database_path()?;
    info!(path = %path.display(), "Opening database");

    let db = Database::new(
        DbConfig::new(path).max_connections(config.database.max_connections),
    )
    .await?;
    Ok(db)
}

/// Runs a parsed command line, writing command output to `out`.
pub async fn run(cli: Cli, out: &mut dyn Write) -> AppResult<()> {
    let config = AppConfig::load(cli.config.clone())?;
    let db = open_database(&config).await?;

    let app = App::new(db, config, cli.output);
    let result = commands::dispatch(&app, cli.command, &cli.credentials, out).await;

    app.db.close().await;
    result
}
