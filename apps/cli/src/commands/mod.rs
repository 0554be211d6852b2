//! # Command Handlers
//!
//! Each subcommand is a thin function over the repositories: parse
//! arguments, call `warehouse-db`, render the result.
//!
//! ## Command Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Execution Flow                               │
//! │                                                                         │
//! │  main.rs: Cli::parse()                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  lib.rs: load config, open database ──► App                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  dispatch(): sign in (table commands only)                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  auth.rs / table.rs / transfer.rs                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Ok(()) ──► output written      Err(AppError) ──► one message, exit 1   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Handlers write to a `&mut dyn Write` so tests can capture output.

pub mod auth;
pub mod table;
pub mod transfer;

use std::io::Write;

use serde_json::json;
use tracing::{info, warn};
use warehouse_db::{AuthenticatedUser, Database};

use crate::cli::{Command, Credentials, OutputFormat};
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::output;

/// Everything a command needs: the open database, the loaded
/// configuration and the chosen output format.
pub struct App {
    pub db: Database,
    pub config: AppConfig,
    pub format: OutputFormat,
}

impl App {
    pub fn new(db: Database, config: AppConfig, format: OutputFormat) -> Self {
        App { db, config, format }
    }

    /// Checks the global credentials against the active accounts.
    pub async fn sign_in(&self, credentials: &Credentials) -> AppResult<AuthenticatedUser> {
        let (Some(user), Some(password)) = (&credentials.user, &credentials.password) else {
            return Err(AppError::MissingCredentials);
        };

        let signed_in = self.db.users().authenticate(user, password).await?;
        info!(user_id = signed_in.user_id, username = %signed_in.username, "Signed in");
        Ok(signed_in)
    }

    /// Appends to the action log. A failed audit write does not fail the
    /// command that already succeeded.
    pub async fn record(&self, user: &AuthenticatedUser, action: &str, details: &str) {
        if let Err(e) = self
            .db
            .action_log()
            .record(Some(user.user_id), action, Some(details))
            .await
        {
            warn!(action = %action, error = %e, "Could not write action log");
        }
    }
}

/// Runs one subcommand.
pub async fn dispatch(
    app: &App,
    command: Command,
    credentials: &Credentials,
    out: &mut dyn Write,
) -> AppResult<()> {
    match command {
        Command::Init => init(app, out).await,
        Command::Register(args) => auth::register(app, args, out).await,
        Command::Roles => auth::roles(app, out).await,
        Command::Views => table::views(app, out),
        Command::Login => {
            let user = app.sign_in(credentials).await?;
            auth::login(app, &user, out).await
        }
        Command::Browse { view, limit } => {
            app.sign_in(credentials).await?;
            table::browse(app, &view, limit, out).await
        }
        Command::Show { view, id } => {
            app.sign_in(credentials).await?;
            table::show(app, &view, &id, out).await
        }
        Command::Edit { view, id, set } => {
            let user = app.sign_in(credentials).await?;
            table::edit(app, &user, &view, &id, &set, out).await
        }
        Command::Add { view, set } => {
            let user = app.sign_in(credentials).await?;
            table::add(app, &user, &view, &set, out).await
        }
        Command::Delete { view, id, yes } => {
            let user = app.sign_in(credentials).await?;
            table::delete(app, &user, &view, &id, yes, out).await
        }
        Command::Export { view, out: dir } => {
            app.sign_in(credentials).await?;
            transfer::export(app, &view, dir.as_deref(), out).await
        }
        Command::Import { view, file } => {
            let user = app.sign_in(credentials).await?;
            transfer::import(app, &user, &view, &file, out).await
        }
    }
}

/// Migrations already ran when the database was opened; this reports
/// their state and the seeded roles.
async fn init(app: &App, out: &mut dyn Write) -> AppResult<()> {
    let (total, applied) = warehouse_db::migrations::migration_status(app.db.pool()).await?;
    let roles = app.db.users().roles().await?;

    output::write_status(
        out,
        app.format,
        &format!(
            "Database ready: {} of {} migrations applied, {} roles",
            applied,
            total,
            roles.len()
        ),
        json!({ "migrations": total, "applied": applied, "roles": roles.len() }),
    )
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use warehouse_core::auth::Registration;
    use warehouse_db::DbConfig;

    pub const USER: &str = "ada";
    pub const PASSWORD: &str = "secret1";

    /// In-memory app with one storekeeper account.
    pub async fn app(format: OutputFormat) -> App {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.users()
            .register(Registration {
                full_name: "Ada Lovelace".into(),
                username: USER.into(),
                password: PASSWORD.into(),
                confirm_password: PASSWORD.into(),
                role_id: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        App::new(db, AppConfig::default(), format)
    }

    pub fn credentials() -> Credentials {
        Credentials {
            user: Some(USER.into()),
            password: Some(PASSWORD.into()),
        }
    }

    pub async fn signed_in(app: &App) -> AuthenticatedUser {
        app.sign_in(&credentials()).await.unwrap()
    }

    pub fn text(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }
}
