//! # CLI Error Type
//!
//! One error type for every command. Whatever fails, the command stops
//! and the message is printed once.
//!
//! ```text
//! DbError ──────┐
//! AuthError ────┤
//! CoreError ────┼──► AppError ──► main (anyhow) ──► "Error: <message>", exit 1
//! io / toml ────┘
//! ```

use thiserror::Error;
use warehouse_core::CoreError;
use warehouse_db::{AuthError, DbError};

/// Errors surfaced by the `warehouse` binary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Core(#[from] CoreError),

    /// Configuration file or environment is unusable.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A command-line argument that parsed but makes no sense.
    #[error("{0}")]
    InvalidArgument(String),

    /// `--user` / `--password` missing for a command that needs a login.
    #[error("This command requires --user and --password (or WAREHOUSE_PASSWORD)")]
    MissingCredentials,

    /// A destructive command ran without `--yes`.
    #[error("Refusing to delete without confirmation; pass --yes")]
    NotConfirmed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot read configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Cannot write configuration file: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::InvalidArgument(message.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;
