//! # warehouse-db: Database Layer for Warehouse Master
//!
//! Database access for the table editor, login and registration.
//! SQLite through sqlx; every statement is built at runtime because the
//! editor only knows tables by name.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Warehouse Master Data Flow                          │
//! │                                                                         │
//! │  CLI command (browse products)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  warehouse-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ TableRepo     │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ UserRepo      │    │ 001_schema   │  │   │
//! │  │   │               │    │ ActionLogRepo │    │ 002_roles    │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │            ▲                                                    │   │
//! │  │            │  schema.rs: pragma_table_info / sqlite_master      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use warehouse_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("warehouse.db")).await?;
//!
//! let user = db.users().authenticate("ada", "s3cret").await?;
//! let rows = db.tables().get_all("product", 100).await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod schema;

pub use error::{AuthError, DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::action_log::{ActionLogEntry, ActionLogRepository};
pub use repository::table::{GridSaveSummary, SaveOutcome, TableRepository};
pub use repository::user::{AuthenticatedUser, Role, UserRepository};
