//! # warehouse-core: Pure Logic for Warehouse Master
//!
//! Everything the generic table editor does that does not touch the
//! database or the file system lives here.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Warehouse Master Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    `warehouse` CLI                              │   │
//! │  │    login ──► browse ──► show / edit / add / delete ──► export   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ warehouse-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │ schema  │ │   sql   │ │  value  │ │  edit   │ │transfer │  │   │
//! │  │   │ columns │ │ UPDATE  │ │ parsing │ │  form   │ │  JSON   │  │   │
//! │  │   │ RowSet  │ │ INSERT  │ │ Scalar  │ │  grid   │ │ compat  │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO FILES • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                warehouse-db (Database Layer)                    │   │
//! │  │        SQLite pool, migrations, schema reflection, repos        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`schema`] - Column metadata and the in-memory row set
//! - [`sql`] - Statement text for a table known only by name
//! - [`value`] - Type-keyed string → scalar conversion
//! - [`edit`] - Row editor form (field values, lookups, change detection)
//! - [`grid`] - Table browser state (row states, pending writes)
//! - [`transfer`] - JSON export/import format
//! - [`view`] - View name → table mapping
//! - [`auth`] - Login and registration input rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use warehouse_core::sql;
//!
//! let stmt = sql::delete_by_key("product", "product_id").unwrap();
//! assert_eq!(stmt, r#"DELETE FROM "product" WHERE "product_id" = ?1"#);
//! ```

pub mod auth;
pub mod edit;
pub mod error;
pub mod grid;
pub mod schema;
pub mod sql;
pub mod transfer;
pub mod value;
pub mod view;

pub use error::{CoreError, CoreResult, ValidationError};
pub use schema::{Cell, ColumnInfo, ColumnType, RowSet, TableSchema};
pub use value::ScalarValue;
pub use view::View;

/// Number of rows the browser loads per table.
pub const DEFAULT_ROW_LIMIT: u32 = 100;

/// Account status that is allowed to log in.
pub const ACTIVE_STATUS: &str = "active";
