//! # Error Types
//!
//! Domain-specific error types for warehouse-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  warehouse-core errors (this file)                                     │
//! │  ├── CoreError        - Parse, structure and statement-building errors │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  warehouse-db errors (separate crate)                                  │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── AuthError        - Login / registration outcomes                  │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── AppError         - What the user sees                             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → AppError → message       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised by the pure table-editor logic.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A field value could not be converted to its column type.
    ///
    /// ## When This Occurs
    /// - "12,5" typed into a DECIMAL column
    /// - "yesterday" typed into a DATETIME column
    #[error("Cannot convert '{value}' for field {column}: expected {expected}")]
    Parse {
        column: String,
        value: String,
        expected: String,
    },

    /// Imported data does not have the shape of the current table.
    #[error("Imported data does not match the structure of table {table}: {reason}")]
    StructureMismatch { table: String, reason: String },

    /// The current table has no rows to export.
    #[error("No data to export")]
    NothingToExport,

    /// The import file contains no rows.
    #[error("The file contains no data to import")]
    EmptyImport,

    /// The JSON document is not an array of row objects.
    #[error("Malformed row set: {0}")]
    MalformedRowSet(String),

    /// A table or column name that cannot be spliced into SQL.
    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),

    /// A statement was requested with nothing to write.
    #[error("No columns to write for table {0}")]
    EmptyStatement(String),

    /// The named column is not part of the row.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// The named field cannot be edited (primary key).
    #[error("Field {0} is read-only")]
    ReadOnlyField(String),

    /// A grid row index is out of range.
    #[error("Row {index} does not exist (table has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },

    /// The table has no primary key, so rows cannot be addressed.
    #[error("Could not determine the primary key of table {0}")]
    NoPrimaryKey(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Creates a Parse error for a column value.
    pub fn parse(
        column: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        CoreError::Parse {
            column: column.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any database round-trip.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Two fields that must agree do not.
    #[error("{field} does not match {other}")]
    Mismatch { field: String, other: String },

    /// Invalid format (e.g., invalid decimal).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A choice was required but none was made.
    #[error("Please select a {field}")]
    NotSelected { field: String },
}

impl ValidationError {
    /// Creates a Required error for the given field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
