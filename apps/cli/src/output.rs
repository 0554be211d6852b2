//! # Output Rendering
//!
//! Row sets and editor forms as plain-text tables or JSON.
//!
//! ```text
//! product_id | product_name | sku | price
//! -----------+--------------+-----+------
//! 1          | Bolt         | B-1 | 0.25
//! (1 row)
//! ```

use std::io::Write;

use serde_json::{json, Map, Value};
use warehouse_core::edit::EditForm;
use warehouse_core::value::cell_to_string;
use warehouse_core::RowSet;

use crate::cli::OutputFormat;
use crate::error::AppResult;

/// Cells wider than this are cut and end in `...`.
const MAX_CELL_WIDTH: usize = 40;

fn clip(text: &str) -> String {
    // Newlines would break the grid.
    let flat = text.replace(['\n', '\r'], " ");
    if flat.chars().count() <= MAX_CELL_WIDTH {
        return flat;
    }
    let mut clipped: String = flat.chars().take(MAX_CELL_WIDTH - 3).collect();
    clipped.push_str("...");
    clipped
}

fn render_line<'a>(values: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    values
        .zip(widths)
        .map(|(v, w)| format!("{:<width$}", v, width = *w))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

/// Renders a row set as an aligned text table with a row-count footer.
pub fn render_table(rows: &RowSet) -> String {
    let cells: Vec<Vec<String>> = rows
        .rows
        .iter()
        .map(|row| row.iter().map(|c| clip(&cell_to_string(c))).collect())
        .collect();

    let widths: Vec<usize> = rows
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    out.push_str(&render_line(rows.columns.iter().map(String::as_str), &widths));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.push('\n');

    for row in &cells {
        out.push_str(&render_line(row.iter().map(String::as_str), &widths));
        out.push('\n');
    }

    match rows.len() {
        1 => out.push_str("(1 row)\n"),
        n => out.push_str(&format!("({} rows)\n", n)),
    }
    out
}

/// Row set as JSON records, column order preserved.
pub fn rows_to_json(rows: &RowSet) -> Value {
    Value::Array(
        rows.rows
            .iter()
            .map(|row| {
                let record: Map<String, Value> = rows
                    .columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect();
                Value::Object(record)
            })
            .collect(),
    )
}

pub fn write_rows(out: &mut dyn Write, rows: &RowSet, format: OutputFormat) -> AppResult<()> {
    match format {
        OutputFormat::Table => write!(out, "{}", render_table(rows))?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&rows_to_json(rows))?)?,
    }
    Ok(())
}

/// Renders the editor: one line per field, lookup fields followed by the
/// label of their current id.
pub fn render_form(form: &EditForm) -> String {
    let width = form
        .fields()
        .iter()
        .map(|f| f.column.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = format!("{}\n", form.table());
    for field in form.fields() {
        let mut line = format!("  {:<width$} : {}", field.column, field.value, width = width);
        if let Some(label) = field.lookup_label() {
            line.push_str(&format!(" ({})", label));
        }
        if field.read_only {
            line.push_str("  [read-only]");
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn form_to_json(form: &EditForm) -> Value {
    let fields: Vec<Value> = form
        .fields()
        .iter()
        .map(|f| {
            json!({
                "column": f.column,
                "value": f.value,
                "read_only": f.read_only,
                "label": f.lookup_label(),
                "choices": f.lookup_items
                    .iter()
                    .map(|(id, label)| json!({ "id": id, "label": label }))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();

    json!({ "table": form.table(), "fields": fields })
}

pub fn write_form(out: &mut dyn Write, form: &EditForm, format: OutputFormat) -> AppResult<()> {
    match format {
        OutputFormat::Table => write!(out, "{}", render_form(form))?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&form_to_json(form))?)?,
    }
    Ok(())
}

/// A one-line result: plain text, or `{"message": ..., <extra>}` as JSON.
pub fn write_status(
    out: &mut dyn Write,
    format: OutputFormat,
    message: &str,
    extra: Value,
) -> AppResult<()> {
    match format {
        OutputFormat::Table => writeln!(out, "{}", message)?,
        OutputFormat::Json => {
            let mut object = Map::new();
            object.insert("message".to_string(), Value::String(message.to_string()));
            if let Value::Object(fields) = extra {
                object.extend(fields);
            }
            writeln!(out, "{}", serde_json::to_string_pretty(&Value::Object(object))?)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use warehouse_core::{Cell, ColumnInfo, TableSchema};

    fn sample() -> RowSet {
        let mut rows = RowSet::new(vec!["id".into(), "name".into(), "note".into()]);
        rows.push_row(vec![Cell::from(1), Cell::from("Bolt"), Cell::Null])
            .unwrap();
        rows.push_row(vec![Cell::from(22), Cell::from("Nut"), Cell::from("x")])
            .unwrap();
        rows
    }

    #[test]
    fn test_render_table() {
        let text = render_table(&sample());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "id | name | note");
        assert_eq!(lines[1], "---+------+-----");
        assert_eq!(lines[2], "1  | Bolt |");
        assert_eq!(lines[3], "22 | Nut  | x");
        assert_eq!(lines[4], "(2 rows)");
    }

    #[test]
    fn test_long_cells_are_clipped() {
        let mut rows = RowSet::new(vec!["text".into()]);
        rows.push_row(vec![Cell::from("a".repeat(100))]).unwrap();

        let text = render_table(&rows);
        let cell = text.lines().nth(2).unwrap();
        assert_eq!(cell.chars().count(), MAX_CELL_WIDTH);
        assert!(cell.ends_with("..."));
    }

    #[test]
    fn test_empty_row_set() {
        let rows = RowSet::new(vec!["id".into()]);
        assert!(render_table(&rows).ends_with("(0 rows)\n"));
        assert_eq!(rows_to_json(&rows), json!([]));
    }

    #[test]
    fn test_json_keeps_column_order() {
        let json = serde_json::to_string(&rows_to_json(&sample())).unwrap();
        assert!(json.starts_with(r#"[{"id":1,"name":"Bolt","note":null}"#));
    }

    #[test]
    fn test_render_form_with_lookup() {
        let schema = TableSchema::new(
            "product",
            vec![
                ColumnInfo::new("product_id", "INTEGER", true, true),
                ColumnInfo::new("warehouse_id", "INTEGER", false, false),
            ],
        );
        let mut rows = RowSet::new(vec!["product_id".into(), "warehouse_id".into()]);
        rows.push_row(vec![Cell::from(3), Cell::from(2)]).unwrap();

        let mut form = EditForm::from_row_set(&schema, &rows, 0).unwrap();
        form.field_mut("warehouse_id")
            .unwrap()
            .add_lookup_item("2", "North");

        let text = render_form(&form);
        assert!(text.contains("product_id   : 3  [read-only]"));
        assert!(text.contains("warehouse_id : 2 (North)"));

        let value = form_to_json(&form);
        assert_eq!(value["fields"][1]["label"], "North");
        assert_eq!(value["fields"][1]["choices"][0]["id"], "2");
    }

    #[test]
    fn test_status_json() {
        let mut buf = Vec::new();
        write_status(&mut buf, OutputFormat::Json, "Deleted", json!({ "id": 4 })).unwrap();
        let value: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["message"], "Deleted");
        assert_eq!(value["id"], 4);
    }
}
