//! # JSON Transfer Format
//!
//! A table's row set is exported as a JSON array of row objects:
//!
//! ```json
//! [
//!   { "warehouse_id": 1, "warehouse_name": "Main", "address": "Dock 1" },
//!   { "warehouse_id": 2, "warehouse_name": "North", "address": null }
//! ]
//! ```
//!
//! Import reads the same shape back. Before any row is written the
//! imported column set must match the current table: same number of
//! columns, and every current column present.

use chrono::NaiveDateTime;
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};
use crate::schema::RowSet;

/// Serializes a row set as pretty-printed JSON records.
pub fn to_json(rows: &RowSet) -> CoreResult<String> {
    if rows.is_empty() {
        return Err(CoreError::NothingToExport);
    }

    let records: Vec<Value> = rows
        .rows
        .iter()
        .map(|row| {
            let object: Map<String, Value> = rows
                .columns
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect();
            Value::Object(object)
        })
        .collect();

    Ok(serde_json::to_string_pretty(&records)?)
}

/// Parses JSON records into a row set.
///
/// Columns are the union of all record keys in first-seen order; a key
/// missing from a record reads as null.
pub fn from_json(json: &str) -> CoreResult<RowSet> {
    let value: Value = serde_json::from_str(json)?;

    let Value::Array(records) = value else {
        return Err(CoreError::MalformedRowSet(
            "expected an array of row objects".to_string(),
        ));
    };

    let mut objects = Vec::with_capacity(records.len());
    for (i, record) in records.into_iter().enumerate() {
        match record {
            Value::Object(map) => objects.push(map),
            _ => {
                return Err(CoreError::MalformedRowSet(format!(
                    "record {} is not an object",
                    i
                )))
            }
        }
    }

    let mut columns: Vec<String> = Vec::new();
    for object in &objects {
        for key in object.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let mut rows = RowSet::new(columns);
    for mut object in objects {
        let row = rows
            .columns
            .iter()
            .map(|c| object.remove(c).unwrap_or(Value::Null))
            .collect();
        rows.push_row(row)?;
    }

    Ok(rows)
}

/// Parses an import document and rejects one without rows.
pub fn parse_import(json: &str) -> CoreResult<RowSet> {
    let rows = from_json(json)?;
    if rows.is_empty() {
        return Err(CoreError::EmptyImport);
    }
    Ok(rows)
}

/// `<Display>_<yyyyMMddHHmmss>.json`
///
/// ```rust
/// use chrono::NaiveDate;
/// use warehouse_core::transfer::export_file_name;
///
/// let at = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap().and_hms_opt(9, 3, 7).unwrap();
/// assert_eq!(export_file_name("Products", at), "Products_20240517090307.json");
/// ```
pub fn export_file_name(display_name: &str, at: NaiveDateTime) -> String {
    format!("{}_{}.json", display_name, at.format("%Y%m%d%H%M%S"))
}

/// Checks that `imported` can be written into a table with `current`
/// columns.
pub fn check_compatible(table: &str, current: &[String], imported: &RowSet) -> CoreResult<()> {
    if current.is_empty() {
        return Err(CoreError::StructureMismatch {
            table: table.to_string(),
            reason: "no table is loaded".to_string(),
        });
    }

    if imported.columns.len() != current.len() {
        return Err(CoreError::StructureMismatch {
            table: table.to_string(),
            reason: format!(
                "expected {} columns, file has {}",
                current.len(),
                imported.columns.len()
            ),
        });
    }

    if let Some(missing) = current
        .iter()
        .find(|c| !imported.columns.iter().any(|i| i.eq_ignore_ascii_case(c)))
    {
        return Err(CoreError::StructureMismatch {
            table: table.to_string(),
            reason: format!("column {} is missing", missing),
        });
    }

    Ok(())
}
