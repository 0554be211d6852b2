//! # Repository Module
//!
//! Database repositories for Warehouse Master.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CLI command                                                           │
//! │       │                                                                 │
//! │       │  db.tables().get_all("product", 100)                           │
//! │       ▼                                                                 │
//! │  TableRepository      generic CRUD over any table, by name             │
//! │  UserRepository       login, registration, role list                   │
//! │  ActionLogRepository  audit trail shown by the Reports view            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod action_log;
pub mod table;
pub mod user;
