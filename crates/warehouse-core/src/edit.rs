//! # Row Editor
//!
//! State of the "edit one row" form: a string field per column, the
//! primary key locked, and lookup pairs for foreign-key columns.
//!
//! ## Edit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  EditForm::open(schema, row)                                           │
//! │       │   one FieldValue per column, PK read-only                      │
//! │       ▼                                                                 │
//! │  lookup_targets()  ──► (db) fill id → label pairs for *_id columns     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  set_value("price", "12.50") ...                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate()  ──► decimal fields must parse                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  changes(real_columns) ──► only columns whose text changed             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  (db) UPDATE ... WHERE pk = ?   then  apply_saved(changes)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::schema::{Cell, ColumnType, RowSet, TableSchema};
use crate::value::{cell_to_string, parse_decimal, parse_field, scalar_to_cell, ScalarValue};

/// Suffix that marks a foreign-key column.
pub const FOREIGN_KEY_SUFFIX: &str = "_id";

/// Suffix of the label column in a referenced table.
pub const LABEL_SUFFIX: &str = "_name";

// =============================================================================
// Field Value
// =============================================================================

/// One editable field of the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    pub column: String,
    /// Current text; empty means NULL.
    pub value: String,
    pub read_only: bool,
    pub column_type: ColumnType,
    /// Lookup pairs (id, label) in label order. Empty for plain fields.
    pub lookup_items: Vec<(String, String)>,
}

impl FieldValue {
    /// Whether the field should render as a combo box.
    pub fn is_lookup(&self) -> bool {
        !self.lookup_items.is_empty()
    }

    /// Label of the currently selected lookup id, if any.
    pub fn lookup_label(&self) -> Option<&str> {
        self.lookup_items
            .iter()
            .find(|(id, _)| *id == self.value)
            .map(|(_, label)| label.as_str())
    }

    /// Adds a lookup pair; the first label seen for an id wins.
    pub fn add_lookup_item(&mut self, id: impl Into<String>, label: impl Into<String>) {
        let id = id.into();
        if !self.lookup_items.iter().any(|(existing, _)| *existing == id) {
            self.lookup_items.push((id, label.into()));
        }
    }
}

/// Where a foreign-key field's labels come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTarget {
    pub column: String,
    pub ref_table: String,
    pub id_column: String,
    pub name_column: String,
}

/// Derives the lookup source for `column`.
///
/// `warehouse_id` → `SELECT warehouse_id, warehouse_name FROM warehouse`.
/// The primary key never gets a lookup.
///
/// ```rust
/// use warehouse_core::edit::lookup_target;
///
/// let target = lookup_target("role_id", Some("user_id")).unwrap();
/// assert_eq!(target.ref_table, "role");
/// assert_eq!(target.name_column, "role_name");
/// assert!(lookup_target("user_id", Some("user_id")).is_none());
/// ```
pub fn lookup_target(column: &str, primary_key: Option<&str>) -> Option<LookupTarget> {
    if primary_key.is_some_and(|pk| pk.eq_ignore_ascii_case(column)) {
        return None;
    }

    let ref_table = column.strip_suffix(FOREIGN_KEY_SUFFIX)?;
    if ref_table.is_empty() {
        return None;
    }

    Some(LookupTarget {
        column: column.to_string(),
        ref_table: ref_table.to_string(),
        id_column: column.to_string(),
        name_column: format!("{}{}", ref_table, LABEL_SUFFIX),
    })
}

/// A changed field, converted and ready to bind.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub column: String,
    pub value: ScalarValue,
}

// =============================================================================
// Edit Form
// =============================================================================

/// The row editor for one row of one table.
#[derive(Debug, Clone)]
pub struct EditForm {
    table: String,
    primary_key: Option<String>,
    columns: Vec<String>,
    original: Vec<Cell>,
    fields: Vec<FieldValue>,
}

impl EditForm {
    /// Opens the form for `row`, whose cells follow `columns`.
    ///
    /// Column types come from `schema`; columns the schema does not know
    /// are treated as text.
    pub fn open(schema: &TableSchema, columns: &[String], row: &[Cell]) -> CoreResult<Self> {
        if columns.len() != row.len() {
            return Err(CoreError::MalformedRowSet(format!(
                "row has {} cells, expected {}",
                row.len(),
                columns.len()
            )));
        }

        let primary_key = schema.primary_key().map(|c| c.name.clone());

        let fields = columns
            .iter()
            .zip(row)
            .map(|(column, cell)| FieldValue {
                column: column.clone(),
                value: cell_to_string(cell),
                read_only: primary_key
                    .as_deref()
                    .is_some_and(|pk| pk.eq_ignore_ascii_case(column)),
                column_type: schema.column_type(column),
                lookup_items: Vec::new(),
            })
            .collect();

        Ok(EditForm {
            table: schema.table.clone(),
            primary_key,
            columns: columns.to_vec(),
            original: row.to_vec(),
            fields,
        })
    }

    /// Opens the form for row `index` of a loaded row set.
    pub fn from_row_set(schema: &TableSchema, rows: &RowSet, index: usize) -> CoreResult<Self> {
        let row = rows.rows.get(index).ok_or(CoreError::RowOutOfRange {
            index,
            len: rows.len(),
        })?;
        Self::open(schema, &rows.columns, row)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    /// Primary-key value of the row being edited.
    pub fn key_value(&self) -> Option<&Cell> {
        let pk = self.primary_key.as_deref()?;
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(pk))
            .and_then(|i| self.original.get(i))
    }

    pub fn fields(&self) -> &[FieldValue] {
        &self.fields
    }

    pub fn field(&self, column: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|f| f.column.eq_ignore_ascii_case(column))
    }

    pub fn field_mut(&mut self, column: &str) -> Option<&mut FieldValue> {
        self.fields
            .iter_mut()
            .find(|f| f.column.eq_ignore_ascii_case(column))
    }

    /// Foreign-key fields that should be resolved to labels.
    pub fn lookup_targets(&self) -> Vec<LookupTarget> {
        self.fields
            .iter()
            .filter_map(|f| lookup_target(&f.column, self.primary_key.as_deref()))
            .collect()
    }

    /// Sets the text of a field.
    pub fn set_value(&mut self, column: &str, value: impl Into<String>) -> CoreResult<()> {
        let field = self
            .field_mut(column)
            .ok_or_else(|| CoreError::UnknownColumn(column.to_string()))?;

        if field.read_only {
            return Err(CoreError::ReadOnlyField(field.column.clone()));
        }

        field.value = value.into();
        Ok(())
    }

    /// Checks editable decimal fields before anything is written.
    pub fn validate(&self) -> CoreResult<()> {
        for field in self.fields.iter().filter(|f| !f.read_only) {
            if field.column_type == ColumnType::Decimal
                && !field.value.is_empty()
                && parse_decimal(field.value.trim()).is_none()
            {
                return Err(ValidationError::InvalidFormat {
                    field: field.column.clone(),
                    reason: "expected a numeric value".to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Fields that differ from the original row and belong to the real
    /// table, converted to scalars.
    ///
    /// `real_columns` filters out computed columns of a presentation
    /// query. Read-only fields never appear.
    pub fn changes(&self, real_columns: &HashSet<String>) -> CoreResult<Vec<FieldChange>> {
        let mut changes = Vec::new();

        for (field, cell) in self.fields.iter().zip(&self.original) {
            if field.read_only || !real_columns.contains(&field.column) {
                continue;
            }

            if cell_to_string(cell) != field.value {
                changes.push(FieldChange {
                    column: field.column.clone(),
                    value: parse_field(&field.column, &field.value, field.column_type)?,
                });
            }
        }

        Ok(changes)
    }

    /// Writes saved values into the held row so a second save with no
    /// edits reports no changes.
    pub fn apply_saved(&mut self, changes: &[FieldChange]) {
        for change in changes {
            if let Some(i) = self
                .columns
                .iter()
                .position(|c| c.eq_ignore_ascii_case(&change.column))
            {
                self.original[i] = scalar_to_cell(&change.value);
                self.fields[i].value = cell_to_string(&self.original[i]);
            }
        }
    }

    /// The row as currently held.
    pub fn row(&self) -> &[Cell] {
        &self.original
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnInfo;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn schema() -> TableSchema {
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

    fn columns() -> Vec<String> {
        schema().column_names()
    }

    fn real_columns() -> HashSet<String> {
        columns().into_iter().collect()
    }

    fn form() -> EditForm {
        EditForm::open(
            &schema(),
            &columns(),
            &[json!(1), json!("Bolt"), json!(2.5), json!(null)],
        )
        .unwrap()
    }

    #[test]
    fn test_primary_key_is_read_only() {
        let mut form = form();
        assert!(form.field("product_id").unwrap().read_only);
        assert!(!form.field("product_name").unwrap().read_only);
        assert!(matches!(
            form.set_value("product_id", "5"),
            Err(CoreError::ReadOnlyField(_))
        ));
    }

    #[test]
    fn test_null_cells_show_as_empty() {
        assert_eq!(form().field("warehouse_id").unwrap().value, "");
        assert_eq!(form().key_value(), Some(&json!(1)));
    }

    #[test]
    fn test_lookup_targets_skip_primary_key() {
        let targets = form().lookup_targets();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].ref_table, "warehouse");
        assert_eq!(targets[0].name_column, "warehouse_name");
    }

    #[test]
    fn test_lookup_items_keep_first_label() {
        let mut form = form();
        let field = form.field_mut("warehouse_id").unwrap();
        field.add_lookup_item("1", "Main");
        field.add_lookup_item("1", "Duplicate");
        field.add_lookup_item("2", "North");
        field.value = "2".to_string();

        assert!(field.is_lookup());
        assert_eq!(field.lookup_items.len(), 2);
        assert_eq!(field.lookup_label(), Some("North"));
    }

    #[test]
    fn test_unchanged_form_has_no_changes() {
        assert!(form().changes(&real_columns()).unwrap().is_empty());
    }

    #[test]
    fn test_changes_are_converted() {
        let mut form = form();
        form.set_value("price", "3.75").unwrap();
        form.set_value("warehouse_id", "2").unwrap();

        let changes = form.changes(&real_columns()).unwrap();
        assert_eq!(
            changes,
            vec![
                FieldChange {
                    column: "price".to_string(),
                    value: ScalarValue::Decimal(Decimal::new(375, 2)),
                },
                FieldChange {
                    column: "warehouse_id".to_string(),
                    value: ScalarValue::Integer(2),
                },
            ]
        );
    }

    #[test]
    fn test_clearing_a_field_writes_null() {
        let mut form = form();
        form.set_value("product_name", "").unwrap();
        let changes = form.changes(&real_columns()).unwrap();
        assert_eq!(changes[0].value, ScalarValue::Null);
    }

    #[test]
    fn test_columns_outside_real_table_are_ignored() {
        let mut form = form();
        form.set_value("product_name", "Nut").unwrap();
        let only_price: HashSet<String> = ["price".to_string()].into_iter().collect();
        assert!(form.changes(&only_price).unwrap().is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_decimal() {
        let mut form = form();
        form.set_value("price", "12,5").unwrap();
        assert!(matches!(
            form.validate(),
            Err(CoreError::Validation(ValidationError::InvalidFormat { .. }))
        ));
    }

    #[test]
    fn test_apply_saved_resets_change_tracking() {
        let mut form = form();
        form.set_value("price", "3.75").unwrap();
        let changes = form.changes(&real_columns()).unwrap();
        form.apply_saved(&changes);

        assert_eq!(form.row()[2], json!(3.75));
        assert!(form.changes(&real_columns()).unwrap().is_empty());
    }
}
