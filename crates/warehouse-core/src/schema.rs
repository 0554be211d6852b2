//! # Schema Types
//!
//! Column metadata discovered at runtime and the row set ("data table")
//! the browser and the JSON transfer work on.
//!
//! ## Where the Types Come From
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  pragma_table_info('product')                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ColumnInfo { name: "price", declared_type: "DECIMAL(12,2)",           │
//! │               column_type: Decimal, primary_key: false }               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  TableSchema { table: "product", columns: [...] }                      │
//! │                                                                         │
//! │  SELECT * FROM "product" LIMIT 100                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  RowSet { columns: ["product_id", ...], rows: [[1, "Bolt", ...]] }     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};

/// A single grid cell. JSON values keep the runtime storage type
/// (integer, real, text, null) without a bespoke enum.
pub type Cell = serde_json::Value;

// =============================================================================
// Column Type
// =============================================================================

/// Declared column type, reduced to what the editor needs for parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Real,
    Decimal,
    Boolean,
    DateTime,
    Text,
    Blob,
}

impl ColumnType {
    /// Maps a declared SQL type to a column type.
    ///
    /// Follows SQLite's affinity rules, with BOOLEAN, DECIMAL and
    /// DATE/TIME split out because the editor parses them differently.
    ///
    /// ```rust
    /// use warehouse_core::ColumnType;
    ///
    /// assert_eq!(ColumnType::from_declared("INTEGER"), ColumnType::Integer);
    /// assert_eq!(ColumnType::from_declared("DECIMAL(12,2)"), ColumnType::Decimal);
    /// assert_eq!(ColumnType::from_declared("VARCHAR(50)"), ColumnType::Text);
    /// ```
    pub fn from_declared(declared: &str) -> Self {
        let upper = declared.to_ascii_uppercase();

        if upper.contains("BOOL") {
            ColumnType::Boolean
        } else if upper.contains("INT") {
            ColumnType::Integer
        } else if upper.contains("DECIMAL") || upper.contains("NUMERIC") || upper.contains("MONEY")
        {
            ColumnType::Decimal
        } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
            ColumnType::Real
        } else if upper.contains("DATE") || upper.contains("TIME") {
            ColumnType::DateTime
        } else if upper.contains("BLOB") {
            ColumnType::Blob
        } else {
            ColumnType::Text
        }
    }

    /// Human description used in parse error messages.
    pub fn expected(&self) -> &'static str {
        match self {
            ColumnType::Integer => "an integer",
            ColumnType::Real => "a number",
            ColumnType::Decimal => "a decimal number",
            ColumnType::Boolean => "true or false",
            ColumnType::DateTime => "a date (YYYY-MM-DD[ HH:MM:SS])",
            ColumnType::Text => "text",
            ColumnType::Blob => "binary data",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Integer => "integer",
            ColumnType::Real => "real",
            ColumnType::Decimal => "decimal",
            ColumnType::Boolean => "boolean",
            ColumnType::DateTime => "datetime",
            ColumnType::Text => "text",
            ColumnType::Blob => "blob",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Column / Table Metadata
// =============================================================================

/// One column as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub declared_type: String,
    pub column_type: ColumnType,
    pub not_null: bool,
    pub primary_key: bool,
}

impl ColumnInfo {
    /// Builds column info from catalog fields, deriving the column type.
    pub fn new(
        name: impl Into<String>,
        declared_type: impl Into<String>,
        not_null: bool,
        primary_key: bool,
    ) -> Self {
        let declared_type = declared_type.into();
        ColumnInfo {
            name: name.into(),
            column_type: ColumnType::from_declared(&declared_type),
            declared_type,
            not_null,
            primary_key,
        }
    }
}

/// The columns of one table, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<ColumnInfo>,
}

impl TableSchema {
    pub fn new(table: impl Into<String>, columns: Vec<ColumnInfo>) -> Self {
        TableSchema {
            table: table.into(),
            columns,
        }
    }

    /// The first primary-key column, if the table declares one.
    pub fn primary_key(&self) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.primary_key)
    }

    /// Looks a column up by name (case-insensitive, like SQLite).
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Column type for `name`, defaulting to text for unknown columns
    /// (computed columns of a join, for instance).
    pub fn column_type(&self, name: &str) -> ColumnType {
        self.column(name)
            .map(|c| c.column_type)
            .unwrap_or(ColumnType::Text)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

// =============================================================================
// Row Set
// =============================================================================

/// An ordered, in-memory table of cells.
///
/// ## Invariant
/// Every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RowSet {
    /// Creates an empty row set with the given columns.
    pub fn new(columns: Vec<String>) -> Self {
        RowSet {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row, rejecting rows of the wrong width.
    pub fn push_row(&mut self, row: Vec<Cell>) -> CoreResult<()> {
        if row.len() != self.columns.len() {
            return Err(CoreError::MalformedRowSet(format!(
                "row has {} cells, expected {}",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column (case-insensitive).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Cell at (row, column name).
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Finds the first row whose `column` renders equal to `key`.
    pub fn find_row(&self, column: &str, key: &str) -> Option<usize> {
        let idx = self.column_index(column)?;
        self.rows
            .iter()
            .position(|r| crate::value::cell_to_string(&r[idx]) == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product_schema() -> TableSchema {
        TableSchema::new(
            "product",
            vec![
                ColumnInfo::new("product_id", "INTEGER", true, true),
                ColumnInfo::new("product_name", "TEXT", true, false),
                ColumnInfo::new("price", "DECIMAL(12,2)", false, false),
                ColumnInfo::new("warehouse_id", "INTEGER", false, false),
            ],
        )
    }

    #[test]
    fn test_affinity_mapping() {
        assert_eq!(ColumnType::from_declared("BIGINT"), ColumnType::Integer);
        assert_eq!(ColumnType::from_declared("boolean"), ColumnType::Boolean);
        assert_eq!(ColumnType::from_declared("NUMERIC"), ColumnType::Decimal);
        assert_eq!(ColumnType::from_declared("DOUBLE PRECISION"), ColumnType::Real);
        assert_eq!(ColumnType::from_declared("DATETIME"), ColumnType::DateTime);
        assert_eq!(ColumnType::from_declared("TIMESTAMP"), ColumnType::DateTime);
        assert_eq!(ColumnType::from_declared(""), ColumnType::Text);
        assert_eq!(ColumnType::from_declared("BLOB"), ColumnType::Blob);
    }

    #[test]
    fn test_primary_key_lookup() {
        let schema = product_schema();
        assert_eq!(schema.primary_key().map(|c| c.name.as_str()), Some("product_id"));
        assert_eq!(schema.column_type("PRICE"), ColumnType::Decimal);
        assert_eq!(schema.column_type("warehouse_name"), ColumnType::Text);
    }

    #[test]
    fn test_rowset_rejects_ragged_rows() {
        let mut rows = RowSet::new(vec!["a".into(), "b".into()]);
        assert!(rows.push_row(vec![json!(1), json!("x")]).is_ok());
        assert!(rows.push_row(vec![json!(1)]).is_err());
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_find_row_by_rendered_key() {
        let mut rows = RowSet::new(vec!["id".into(), "name".into()]);
        rows.push_row(vec![json!(7), json!("Bolt")]).unwrap();
        rows.push_row(vec![json!(9), json!("Nut")]).unwrap();

        assert_eq!(rows.find_row("id", "9"), Some(1));
        assert_eq!(rows.find_row("id", "10"), None);
        assert_eq!(rows.cell(0, "NAME"), Some(&json!("Bolt")));
    }
}
