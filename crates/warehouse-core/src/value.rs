//! # Value Conversion
//!
//! The editor holds every field as a string. Before a value is written it
//! is converted according to its column type; an empty string always means
//! SQL NULL.
//!
//! ```text
//! "12.50"  + Decimal   → ScalarValue::Decimal(12.50)
//! "42"     + Integer   → ScalarValue::Integer(42)
//! "2024-03-01" + DateTime → ScalarValue::DateTime(2024-03-01 00:00:00)
//! ""       + anything  → ScalarValue::Null
//! "4x"     + Integer   → CoreError::Parse
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};
use crate::schema::{Cell, ColumnType};

/// Timestamp layout used for display and for values written back to rows.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATETIME_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// A typed value ready to bind to a statement parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    Null,
    Integer(i64),
    Real(f64),
    Decimal(Decimal),
    Boolean(bool),
    DateTime(NaiveDateTime),
    Text(String),
}

impl ScalarValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }
}

/// Converts a raw field string to a scalar of the column's type.
///
/// ```rust
/// use warehouse_core::{ColumnType, ScalarValue};
/// use warehouse_core::value::parse_field;
///
/// assert_eq!(parse_field("qty", "", ColumnType::Integer).unwrap(), ScalarValue::Null);
/// assert_eq!(parse_field("qty", "5", ColumnType::Integer).unwrap(), ScalarValue::Integer(5));
/// assert!(parse_field("qty", "five", ColumnType::Integer).is_err());
/// ```
pub fn parse_field(column: &str, raw: &str, column_type: ColumnType) -> CoreResult<ScalarValue> {
    if raw.is_empty() {
        return Ok(ScalarValue::Null);
    }

    let err = || CoreError::parse(column, raw, column_type.expected());
    let trimmed = raw.trim();

    match column_type {
        ColumnType::Integer => trimmed
            .parse::<i64>()
            .map(ScalarValue::Integer)
            .map_err(|_| err()),
        ColumnType::Real => trimmed
            .parse::<f64>()
            .map(ScalarValue::Real)
            .map_err(|_| err()),
        ColumnType::Decimal => parse_decimal(trimmed)
            .map(ScalarValue::Decimal)
            .ok_or_else(err),
        ColumnType::Boolean => parse_bool(trimmed)
            .map(ScalarValue::Boolean)
            .ok_or_else(err),
        ColumnType::DateTime => parse_datetime(trimmed)
            .map(ScalarValue::DateTime)
            .ok_or_else(err),
        ColumnType::Text | ColumnType::Blob => Ok(ScalarValue::Text(raw.to_string())),
    }
}

/// Invariant-culture decimal: `.` separator, optional exponent.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    DATETIME_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Renders a cell the way the editor shows and compares it.
///
/// SQL NULL renders as the empty string.
pub fn cell_to_string(cell: &Cell) -> String {
    match cell {
        Cell::Null => String::new(),
        Cell::String(s) => s.clone(),
        Cell::Bool(b) => b.to_string(),
        Cell::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Converts a written scalar back into a cell.
///
/// Decimals stay text so that no digits are lost on the way to the
/// database.
pub fn scalar_to_cell(value: &ScalarValue) -> Cell {
    match value {
        ScalarValue::Null => Cell::Null,
        ScalarValue::Integer(i) => Cell::from(*i),
        ScalarValue::Real(f) => serde_json::Number::from_f64(*f)
            .map(Cell::Number)
            .unwrap_or(Cell::Null),
        ScalarValue::Decimal(d) => Cell::String(d.to_string()),
        ScalarValue::Boolean(b) => Cell::from(i64::from(*b)),
        ScalarValue::DateTime(dt) => Cell::String(dt.format(DATETIME_FORMAT).to_string()),
        ScalarValue::Text(s) => Cell::String(s.clone()),
    }
}

/// Converts an imported JSON cell into a scalar for the target column.
///
/// Strings go through [`parse_field`]; numbers and booleans pass through
/// when they fit the column.
pub fn cell_to_scalar(column: &str, cell: &Cell, column_type: ColumnType) -> CoreResult<ScalarValue> {
    match cell {
        Cell::Null => Ok(ScalarValue::Null),
        Cell::Bool(b) => match column_type {
            ColumnType::Text | ColumnType::Blob => Ok(ScalarValue::Text(b.to_string())),
            _ => Ok(ScalarValue::Boolean(*b)),
        },
        Cell::Number(n) => match column_type {
            ColumnType::Integer | ColumnType::Boolean => n
                .as_i64()
                .map(ScalarValue::Integer)
                .ok_or_else(|| CoreError::parse(column, n.to_string(), column_type.expected())),
            ColumnType::Real => n
                .as_f64()
                .map(ScalarValue::Real)
                .ok_or_else(|| CoreError::parse(column, n.to_string(), column_type.expected())),
            _ => parse_field(column, &n.to_string(), column_type),
        },
        Cell::String(s) => parse_field(column, s, column_type),
        other => Ok(ScalarValue::Text(other.to_string())),
    }
}
