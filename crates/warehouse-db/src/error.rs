//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)          CoreError (parse, structure)      │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ├──────────► AuthError (login / registration outcomes)           │
//! │       ▼                                                                 │
//! │  AppError (in CLI) ← One user-facing message, command aborts           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use warehouse_core::{CoreError, ValidationError};

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Table name that is not in the catalog.
    #[error("Cannot access table {0}: no such table")]
    UnknownTable(String),

    /// The catalog reports no primary key for the table.
    #[error("Could not determine the primary key of table {0}")]
    NoPrimaryKey(String),

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Registering a taken user name or email
    /// - Duplicate SKU or invoice number
    #[error("Duplicate value for {field}")]
    UniqueViolation { field: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Deleting a warehouse that products still reference
    /// - Entering a product_id that does not exist
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// NOT NULL constraint violation.
    #[error("Missing required value: {0}")]
    NotNullViolation(String),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A row of a bulk import failed; nothing was imported.
    #[error("Import failed at row {row}, nothing was imported: {message}")]
    ImportFailed { row: usize, message: String },

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Parse, structure or statement-building error from the core crate.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                //   "UNIQUE constraint failed: <table>.<column>"
                //   "FOREIGN KEY constraint failed"
                //   "NOT NULL constraint failed: <table>.<column>"
                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        field: field.to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if let Some(field) = msg.strip_prefix("NOT NULL constraint failed: ") {
                    DbError::NotNullViolation(field.to_string())
                } else if let Some(table) = msg.strip_prefix("no such table: ") {
                    DbError::UnknownTable(table.to_string())
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Authentication Errors
// =============================================================================

/// Outcomes of login and registration that are not a success.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Form input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No active account with that user name.
    #[error("User not found or disabled")]
    UserNotFound,

    /// The account exists but the password does not match.
    #[error("Invalid password")]
    InvalidPassword,

    /// User name or email already taken.
    #[error("A user with this user name or email already exists")]
    DuplicateUser,

    /// Password hashing failed.
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    /// Database error during login or registration.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        match DbError::from(err) {
            DbError::UniqueViolation { .. } => AuthError::DuplicateUser,
            other => AuthError::Db(other),
        }
    }
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            DbError::not_found("product", "7").to_string(),
            "product not found: 7"
        );
        assert_eq!(
            DbError::NoPrimaryKey("audit".into()).to_string(),
            "Could not determine the primary key of table audit"
        );
        assert_eq!(AuthError::UserNotFound.to_string(), "User not found or disabled");
    }

    #[tokio::test]
    async fn test_unique_violation_names_the_column() {
        use sqlx::Connection;

        let mut conn = sqlx::SqliteConnection::connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query("CREATE TABLE item (sku TEXT UNIQUE)")
            .execute(&mut conn)
            .await
            .unwrap();
        sqlx::query("INSERT INTO item (sku) VALUES ('A-1')")
            .execute(&mut conn)
            .await
            .unwrap();

        let err = sqlx::query("INSERT INTO item (sku) VALUES ('A-1')")
            .execute(&mut conn)
            .await
            .unwrap_err();

        let err = DbError::from(err);
        assert!(matches!(err, DbError::UniqueViolation { ref field } if field == "item.sku"));
        assert_eq!(err.to_string(), "Duplicate value for item.sku");
    }

    #[test]
    fn test_core_errors_pass_through() {
        let err: DbError = CoreError::EmptyImport.into();
        assert_eq!(err.to_string(), "The file contains no data to import");
    }
}
