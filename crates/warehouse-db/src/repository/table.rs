//! # Table Repository
//!
//! Generic CRUD over any table of the warehouse schema, addressed by name.
//!
//! ## How a Browse Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  get_all("Product", 100)                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  "product" ← lower-cased, identifier-checked                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT * FROM "product" LIMIT 100                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Each cell decoded by its runtime storage class:                       │
//! │    INTEGER → number   REAL → number   TEXT → string                    │
//! │    BLOB → string      NULL → null                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  RowSet { columns: [product_id, product_name, ...], rows: [...] }      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes never splice values into SQL: the statement text comes from
//! `warehouse_core::sql` and every value is bound as a `?N` parameter.
//! Only [`TableRepository::import_rows`] runs in a transaction.

use std::collections::HashSet;

use serde_json::Number;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column, Executor, Row, Sqlite, SqliteConnection, SqlitePool, Statement, TypeInfo, ValueRef};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::schema;
use warehouse_core::edit::{EditForm, FieldChange};
use warehouse_core::grid::{RowState, TableGrid};
use warehouse_core::sql;
use warehouse_core::value::{
    cell_to_scalar, cell_to_string, parse_field, scalar_to_cell, DATETIME_FORMAT,
};
use warehouse_core::{Cell, CoreError, RowSet, ScalarValue, TableSchema, View};

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// Result of saving the row editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The given number of fields were written.
    Saved(usize),
    /// Nothing differed from the loaded row; no statement was issued.
    NoChanges,
}

/// What a grid save wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridSaveSummary {
    pub updated: usize,
    pub inserted: usize,
}

/// Repository for table-agnostic reads and writes.
///
/// ## Usage
/// ```rust,ignore
/// let repo = TableRepository::new(pool);
///
/// let rows = repo.get_all("warehouse", 100).await?;
/// let key = repo.parse_key("warehouse", "3").await?;
/// repo.delete("warehouse", &key).await?;
/// ```
#[derive(Debug, Clone)]
pub struct TableRepository {
    pool: SqlitePool,
}

impl TableRepository {
    /// Creates a new TableRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TableRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Loads up to `limit` rows of `table`.
    ///
    /// The name is lower-cased first, so `Product` and `product` are the
    /// same table.
    ///
    /// ## Errors
    /// - `CoreError::InvalidIdentifier` for names that are not plain identifiers
    /// - `DbError::UnknownTable` when the table does not exist
    pub async fn get_all(&self, table: &str, limit: u32) -> DbResult<RowSet> {
        let table = table.to_lowercase();
        let query = sql::select_all(&table, limit)?;

        debug!(table = %table, limit = limit, "Loading table");

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        let row_set = self.to_row_set(&query, &rows).await?;

        info!(table = %table, rows = row_set.len(), "Table loaded");
        Ok(row_set)
    }

    /// Runs the view's display join, or plain [`get_all`](Self::get_all)
    /// for views that show their table as-is.
    pub async fn run_presentation(&self, view: View, limit: u32) -> DbResult<RowSet> {
        let Some(query) = view.presentation_query() else {
            return self.get_all(view.table(), limit).await;
        };

        debug!(view = %view, limit = limit, "Running presentation query");

        let rows = sqlx::query(query)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        self.to_row_set(query, &rows).await
    }

    /// One row by primary key, as a single-row set.
    ///
    /// ## Errors
    /// `DbError::NotFound` when no row has that key.
    pub async fn get_row(&self, table: &str, key: &ScalarValue) -> DbResult<RowSet> {
        let pk = self.require_primary_key(table).await?;
        let query = sql::select_by_key(table, &pk)?;

        let rows = bind_scalar(sqlx::query(&query), key)
            .fetch_all(&self.pool)
            .await?;

        if rows.is_empty() {
            return Err(DbError::not_found(table, scalar_label(key)));
        }

        self.to_row_set(&query, &rows).await
    }

    /// Converts a key typed on the command line into a value of the
    /// table's primary-key type.
    pub async fn parse_key(&self, table: &str, raw: &str) -> DbResult<ScalarValue> {
        let schema = schema::table_schema(&self.pool, table).await?;
        let pk = schema
            .primary_key()
            .ok_or_else(|| DbError::NoPrimaryKey(table.to_string()))?;

        Ok(parse_field(&pk.name, raw.trim(), pk.column_type)?)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Deletes the row with `key`.
    ///
    /// ## Errors
    /// - `DbError::NoPrimaryKey` when the catalog reports no key (nothing is deleted)
    /// - `DbError::NotFound` when no row matched
    pub async fn delete(&self, table: &str, key: &ScalarValue) -> DbResult<()> {
        let pk = self.require_primary_key(table).await?;
        let query = sql::delete_by_key(table, &pk)?;

        let result = bind_scalar(sqlx::query(&query), key)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(table, scalar_label(key)));
        }

        info!(table = %table, key = %scalar_label(key), "Row deleted");
        Ok(())
    }

    /// Inserts one row from column/value pairs and returns the new row id.
    ///
    /// Columns left out take their database defaults.
    pub async fn insert_row(&self, table: &str, values: &[FieldChange]) -> DbResult<i64> {
        let id = insert(&self.pool, table, values).await?;
        info!(table = %table, id = id, "Row inserted");
        Ok(id)
    }

    /// Updates the given columns of the row with `key`.
    ///
    /// Returns the number of rows touched; an empty change list touches
    /// nothing and issues no statement.
    pub async fn update_row(
        &self,
        table: &str,
        key: &ScalarValue,
        changes: &[FieldChange],
    ) -> DbResult<u64> {
        if changes.is_empty() {
            return Ok(0);
        }

        let pk = self.require_primary_key(table).await?;
        self.update_by(table, &pk, key, changes).await
    }

    /// Writes a grid's pending edits: UPDATEs for modified rows, INSERTs
    /// for added rows. On success every row is marked saved.
    pub async fn save_grid(&self, grid: &mut TableGrid) -> DbResult<GridSaveSummary> {
        let table = grid.table().to_string();
        let schema = schema::table_schema(&self.pool, &table).await?;
        let pk = schema.primary_key().map(|c| c.name.clone());

        let updates = match pk.as_deref() {
            Some(pk) => grid.pending_updates(pk)?,
            None if has_modified_rows(grid) => return Err(DbError::NoPrimaryKey(table)),
            None => Vec::new(),
        };

        let mut summary = GridSaveSummary::default();

        if let Some(pk) = pk.as_deref() {
            let pk_type = schema.column_type(pk);
            for update in &updates {
                let key = cell_to_scalar(pk, &update.key, pk_type)?;
                let changes = to_field_changes(&schema, &update.changes)?;
                self.update_by(&table, pk, &key, &changes).await?;
                summary.updated += 1;
            }
        }

        for pending in grid.pending_inserts(pk.as_deref()) {
            let values = to_field_changes(&schema, &pending.values)?;
            insert(&self.pool, &table, &values).await?;
            summary.inserted += 1;
        }

        grid.accept_changes();

        info!(
            table = %table,
            updated = summary.updated,
            inserted = summary.inserted,
            "Grid saved"
        );
        Ok(summary)
    }

    /// Appends every row of `rows` to `table` in a single transaction.
    ///
    /// The primary-key column is skipped so the database assigns fresh
    /// keys. If any row fails, the transaction is rolled back and the
    /// error names the 1-based row.
    pub async fn import_rows(&self, table: &str, rows: &RowSet) -> DbResult<usize> {
        if rows.is_empty() {
            return Err(CoreError::EmptyImport.into());
        }

        // Resolve everything before BEGIN: the transaction holds the only
        // connection of an in-memory pool.
        let schema = schema::table_schema(&self.pool, table).await?;
        let pk = schema.primary_key().map(|c| c.name.clone());

        let columns: Vec<(usize, String)> = rows
            .columns
            .iter()
            .enumerate()
            .filter(|(_, name)| !pk.as_deref().is_some_and(|pk| pk.eq_ignore_ascii_case(name)))
            .map(|(i, name)| (i, name.clone()))
            .collect();
        let names: Vec<&str> = columns.iter().map(|(_, name)| name.as_str()).collect();
        let query = sql::insert_columns(table, &names)?;

        info!(table = %table, rows = rows.len(), "Importing rows");

        let mut tx = self.pool.begin().await?;

        for (index, row) in rows.rows.iter().enumerate() {
            if let Err(e) = import_one(&mut tx, &query, &schema, &columns, row).await {
                tx.rollback().await?;
                warn!(table = %table, row = index + 1, error = %e, "Import rolled back");
                return Err(DbError::ImportFailed {
                    row: index + 1,
                    message: e.to_string(),
                });
            }
        }

        tx.commit().await?;

        info!(table = %table, rows = rows.len(), "Import committed");
        Ok(rows.len())
    }

    // =========================================================================
    // Row Editor
    // =========================================================================

    /// Opens the row editor for the row with `key`, lookups filled.
    pub async fn open_edit_form(&self, table: &str, key: &ScalarValue) -> DbResult<EditForm> {
        let schema = schema::table_schema(&self.pool, table).await?;
        let row = self.get_row(table, key).await?;

        let mut form = EditForm::from_row_set(&schema, &row, 0)?;
        self.load_lookups(&mut form).await?;
        Ok(form)
    }

    /// Fills the `id → label` pairs of every foreign-key field.
    ///
    /// `warehouse_id` reads `warehouse_id, warehouse_name` from
    /// `warehouse`. Fields whose reference table or label column does not
    /// exist are left without lookups. A repeated id keeps its first label.
    pub async fn load_lookups(&self, form: &mut EditForm) -> DbResult<()> {
        for target in form.lookup_targets() {
            if !schema::table_exists(&self.pool, &target.ref_table).await? {
                debug!(column = %target.column, table = %target.ref_table, "No lookup table");
                continue;
            }

            let ref_schema = schema::table_schema(&self.pool, &target.ref_table).await?;
            if ref_schema.column(&target.id_column).is_none()
                || ref_schema.column(&target.name_column).is_none()
            {
                debug!(column = %target.column, table = %target.ref_table, "No lookup label column");
                continue;
            }

            let query =
                sql::lookup_query(&target.ref_table, &target.id_column, &target.name_column)?;
            let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

            let Some(field) = form.field_mut(&target.column) else {
                continue;
            };

            for row in &rows {
                let id = cell_to_string(&decode_cell(row, 0)?);
                let label = cell_to_string(&decode_cell(row, 1)?);
                field.add_lookup_item(id, label);
            }

            debug!(
                column = %target.column,
                items = field.lookup_items.len(),
                "Lookup loaded"
            );
        }

        Ok(())
    }

    /// Validates the form and writes the fields that changed.
    ///
    /// Only columns of the real table are written; the real column set
    /// comes from a zero-row probe of the table. After a save the form
    /// holds the written values, so saving again reports `NoChanges`.
    pub async fn save_edit_form(&self, form: &mut EditForm) -> DbResult<SaveOutcome> {
        form.validate()?;

        let table = form.table().to_string();
        let probe = sql::schema_probe(&table)?;
        let real_columns: HashSet<String> =
            self.statement_columns(&probe).await?.into_iter().collect();

        let changes = form.changes(&real_columns)?;
        if changes.is_empty() {
            debug!(table = %table, "No changes to save");
            return Ok(SaveOutcome::NoChanges);
        }

        let pk = form
            .primary_key()
            .map(str::to_string)
            .ok_or_else(|| DbError::NoPrimaryKey(table.clone()))?;
        let key_cell = form
            .key_value()
            .cloned()
            .ok_or_else(|| DbError::NoPrimaryKey(table.clone()))?;

        let schema = schema::table_schema(&self.pool, &table).await?;
        let key = cell_to_scalar(&pk, &key_cell, schema.column_type(&pk))?;

        let touched = self.update_by(&table, &pk, &key, &changes).await?;
        if touched == 0 {
            return Err(DbError::not_found(table, cell_to_string(&key_cell)));
        }

        form.apply_saved(&changes);

        info!(table = %table, fields = changes.len(), "Row saved");
        Ok(SaveOutcome::Saved(changes.len()))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn require_primary_key(&self, table: &str) -> DbResult<String> {
        schema::primary_key_column(&self.pool, table)
            .await?
            .ok_or_else(|| DbError::NoPrimaryKey(table.to_string()))
    }

    async fn update_by(
        &self,
        table: &str,
        pk: &str,
        key: &ScalarValue,
        changes: &[FieldChange],
    ) -> DbResult<u64> {
        let columns: Vec<&str> = changes.iter().map(|c| c.column.as_str()).collect();
        let query = sql::update_columns(table, &columns, pk)?;

        let mut statement = sqlx::query(&query);
        for change in changes {
            statement = bind_scalar(statement, &change.value);
        }
        let result = bind_scalar(statement, key).execute(&self.pool).await?;

        debug!(
            table = %table,
            key = %scalar_label(key),
            columns = changes.len(),
            "Row updated"
        );
        Ok(result.rows_affected())
    }

    /// Result columns of a statement, without running it.
    async fn statement_columns(&self, query: &str) -> DbResult<Vec<String>> {
        let statement = (&self.pool).prepare(query).await?;
        Ok(statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect())
    }

    async fn to_row_set(&self, query: &str, rows: &[SqliteRow]) -> DbResult<RowSet> {
        let columns = match rows.first() {
            Some(first) => first.columns().iter().map(|c| c.name().to_string()).collect(),
            None => self.statement_columns(query).await?,
        };

        let mut row_set = RowSet::new(columns);
        for row in rows {
            let cells = (0..row.len())
                .map(|i| decode_cell(row, i))
                .collect::<DbResult<Vec<_>>>()?;
            row_set.push_row(cells)?;
        }
        Ok(row_set)
    }
}

async fn insert<'e, E>(executor: E, table: &str, values: &[FieldChange]) -> DbResult<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let columns: Vec<&str> = values.iter().map(|v| v.column.as_str()).collect();
    let query = sql::insert_columns(table, &columns)?;

    let mut statement = sqlx::query(&query);
    for value in values {
        statement = bind_scalar(statement, &value.value);
    }

    let result = statement.execute(executor).await?;
    Ok(result.last_insert_rowid())
}

async fn import_one(
    conn: &mut SqliteConnection,
    query: &str,
    schema: &TableSchema,
    columns: &[(usize, String)],
    row: &[Cell],
) -> DbResult<()> {
    let mut statement = sqlx::query(query);
    for (index, name) in columns {
        let cell = row.get(*index).unwrap_or(&Cell::Null);
        let value = cell_to_scalar(name, cell, schema.column_type(name))?;
        statement = bind_scalar(statement, &value);
    }
    statement.execute(conn).await?;
    Ok(())
}

fn has_modified_rows(grid: &TableGrid) -> bool {
    (0..grid.rows().len()).any(|row| grid.state(row) == Some(RowState::Modified))
}

fn to_field_changes(schema: &TableSchema, cells: &[(String, Cell)]) -> DbResult<Vec<FieldChange>> {
    cells
        .iter()
        .map(|(column, cell)| {
            Ok(FieldChange {
                column: column.clone(),
                value: cell_to_scalar(column, cell, schema.column_type(column))?,
            })
        })
        .collect()
}

/// Binds one scalar as the next positional parameter.
///
/// Decimals go in as text so SQLite's NUMERIC affinity stores them
/// without a float round trip; timestamps use the display layout.
fn bind_scalar<'q>(query: SqliteQuery<'q>, value: &ScalarValue) -> SqliteQuery<'q> {
    match value {
        ScalarValue::Null => query.bind(None::<String>),
        ScalarValue::Integer(i) => query.bind(*i),
        ScalarValue::Real(f) => query.bind(*f),
        ScalarValue::Decimal(d) => query.bind(d.to_string()),
        ScalarValue::Boolean(b) => query.bind(*b),
        ScalarValue::DateTime(dt) => query.bind(dt.format(DATETIME_FORMAT).to_string()),
        ScalarValue::Text(s) => query.bind(s.clone()),
    }
}

/// Decodes one cell by the storage class of the value actually stored.
fn decode_cell(row: &SqliteRow, index: usize) -> DbResult<Cell> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Cell::Null);
    }
    let storage = raw.type_info().name().to_string();

    let cell = match storage.as_str() {
        "INTEGER" | "BOOLEAN" => Cell::from(row.try_get::<i64, _>(index)?),
        "REAL" => Number::from_f64(row.try_get::<f64, _>(index)?)
            .map(Cell::Number)
            .unwrap_or(Cell::Null),
        "BLOB" => {
            let bytes: Vec<u8> = row.try_get(index)?;
            Cell::String(String::from_utf8_lossy(&bytes).into_owned())
        }
        _ => Cell::String(row.try_get::<String, _>(index)?),
    };
    Ok(cell)
}

fn scalar_label(value: &ScalarValue) -> String {
    cell_to_string(&scalar_to_cell(value))
}
