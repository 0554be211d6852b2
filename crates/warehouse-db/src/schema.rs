//! # Schema Introspection
//!
//! Catalog queries the generic editor uses to learn about a table it only
//! knows by name.
//!
//! ```text
//! primary_key_column("product")
//!     SELECT name FROM pragma_table_info('product') WHERE pk > 0
//!     → Some("product_id")
//!
//! table_schema("product")
//!     SELECT name, type, "notnull", pk FROM pragma_table_info('product')
//!     → TableSchema { columns: [product_id INTEGER pk, product_name TEXT, ...] }
//! ```
//!
//! `pragma_table_info` returns no rows for an unknown table rather than
//! failing, so "missing table" and "no primary key" look the same to
//! [`primary_key_column`].

use sqlx::{Executor, Row, Sqlite};
use tracing::debug;
use warehouse_core::sql::validate_identifier;
use warehouse_core::{ColumnInfo, TableSchema};

use crate::error::{DbError, DbResult};

/// First primary-key column of `table`, in key order.
///
/// `None` when the table does not exist or has no declared key.
pub async fn primary_key_column<'e, E>(executor: E, table: &str) -> DbResult<Option<String>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let name: Option<String> =
        sqlx::query_scalar("SELECT name FROM pragma_table_info(?1) WHERE pk > 0 ORDER BY pk LIMIT 1")
            .bind(table)
            .fetch_optional(executor)
            .await?;

    debug!(table = %table, primary_key = ?name, "Resolved primary key");
    Ok(name)
}

/// Ordered column list of `table`.
///
/// ## Errors
/// `DbError::NotFound` when the table does not exist.
pub async fn table_schema<'e, E>(executor: E, table: &str) -> DbResult<TableSchema>
where
    E: Executor<'e, Database = Sqlite>,
{
    validate_identifier(table)?;

    let rows = sqlx::query(
        r#"SELECT name, type, "notnull", pk FROM pragma_table_info(?1) ORDER BY cid"#,
    )
    .bind(table)
    .fetch_all(executor)
    .await?;

    if rows.is_empty() {
        return Err(DbError::not_found("table", table));
    }

    let columns = rows
        .iter()
        .map(|row| {
            let name: String = row.try_get("name")?;
            let declared: String = row.try_get("type")?;
            let not_null: i64 = row.try_get("notnull")?;
            let pk: i64 = row.try_get("pk")?;
            Ok(ColumnInfo::new(name, declared, not_null != 0, pk > 0))
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

    Ok(TableSchema::new(table, columns))
}

/// Whether a table or view called `table` exists.
pub async fn table_exists<'e, E>(executor: E, table: &str) -> DbResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1",
    )
    .bind(table)
    .fetch_one(executor)
    .await?;

    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use warehouse_core::ColumnType;

    #[tokio::test]
    async fn test_primary_key_discovery() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert_eq!(
            primary_key_column(db.pool(), "product").await.unwrap().as_deref(),
            Some("product_id")
        );
        assert_eq!(
            primary_key_column(db.pool(), "goods_receipt").await.unwrap().as_deref(),
            Some("receipt_id")
        );
        assert_eq!(primary_key_column(db.pool(), "nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_table_without_key() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query("CREATE TABLE audit (note TEXT)")
            .execute(db.pool())
            .await
            .unwrap();

        assert_eq!(primary_key_column(db.pool(), "audit").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_table_schema_types() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let schema = table_schema(db.pool(), "invoice").await.unwrap();

        assert_eq!(schema.primary_key().unwrap().name, "invoice_id");
        assert_eq!(schema.column_type("total_amount"), ColumnType::Decimal);
        assert_eq!(schema.column_type("issued_at"), ColumnType::DateTime);
        assert_eq!(schema.column_type("is_paid"), ColumnType::Boolean);
        assert!(schema.column("invoice_number").unwrap().not_null);
    }

    #[tokio::test]
    async fn test_unknown_table_schema() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = table_schema(db.pool(), "missing").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_table_exists() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(table_exists(db.pool(), "warehouse").await.unwrap());
        assert!(!table_exists(db.pool(), "user").await.unwrap());
    }
}
