//! # Table Commands
//!
//! Browse, show, edit, add and delete rows of the table behind a view.
//!
//! ```text
//! warehouse browse products           → presentation query, grid.row_limit rows
//! warehouse show products 7           → row editor with lookup labels
//! warehouse edit products 7 --set price=1.20 --set warehouse_id=North
//! warehouse add warehouses --set warehouse_name=East
//! warehouse delete products 7 --yes
//! ```
//!
//! Lookup fields accept either the id or the label shown by `show`.

use std::io::Write;

use serde_json::json;
use tracing::{info, warn};
use warehouse_core::edit::{EditForm, FieldValue};
use warehouse_core::grid::TableGrid;
use warehouse_core::value::{parse_field, scalar_to_cell};
use warehouse_core::{Cell, CoreError, RowSet, View};
use warehouse_db::{AuthenticatedUser, SaveOutcome};

use super::App;
use crate::error::{AppError, AppResult};
use crate::output;

/// Resolves a view name, warning when it falls back to the product data.
pub fn resolve_view(name: &str) -> View {
    let view = View::from_name(name);
    if view == View::Data && !name.trim().eq_ignore_ascii_case(View::Data.alias()) {
        warn!(view = %name, "Unknown view, showing product data");
    }
    view
}

pub fn views(app: &App, out: &mut dyn Write) -> AppResult<()> {
    let mut rows = RowSet::new(vec!["view".into(), "title".into(), "table".into()]);
    for view in View::ALL {
        rows.push_row(vec![
            Cell::from(view.alias()),
            Cell::from(view.display_name()),
            Cell::from(view.table()),
        ])?;
    }
    output::write_rows(out, &rows, app.format)
}

pub async fn browse(
    app: &App,
    view: &str,
    limit: Option<u32>,
    out: &mut dyn Write,
) -> AppResult<()> {
    let view = resolve_view(view);
    let limit = limit.unwrap_or(app.config.grid.row_limit);

    let rows = app.db.tables().run_presentation(view, limit).await?;
    info!(view = %view, rows = rows.len(), "Browsing");

    output::write_rows(out, &rows, app.format)
}

async fn open_form(app: &App, view: View, id: &str) -> AppResult<EditForm> {
    let tables = app.db.tables();
    let key = tables.parse_key(view.table(), id).await?;
    Ok(tables.open_edit_form(view.table(), &key).await?)
}

pub async fn show(app: &App, view: &str, id: &str, out: &mut dyn Write) -> AppResult<()> {
    let form = open_form(app, resolve_view(view), id).await?;
    output::write_form(out, &form, app.format)
}

/// Maps a label typed for a lookup field to its id. Ids and plain
/// fields pass through unchanged.
fn lookup_input(field: &FieldValue, raw: &str) -> String {
    if !field.is_lookup() || field.lookup_items.iter().any(|(id, _)| id == raw) {
        return raw.to_string();
    }

    field
        .lookup_items
        .iter()
        .find(|(_, label)| label.eq_ignore_ascii_case(raw.trim()))
        .map(|(id, _)| id.clone())
        .unwrap_or_else(|| raw.to_string())
}

pub async fn edit(
    app: &App,
    user: &AuthenticatedUser,
    view: &str,
    id: &str,
    assignments: &[(String, String)],
    out: &mut dyn Write,
) -> AppResult<()> {
    let view = resolve_view(view);
    let mut form = open_form(app, view, id).await?;

    for (column, raw) in assignments {
        let value = match form.field(column) {
            Some(field) => lookup_input(field, raw),
            None => return Err(CoreError::UnknownColumn(column.clone()).into()),
        };
        form.set_value(column, value)?;
    }

    match app.db.tables().save_edit_form(&mut form).await? {
        SaveOutcome::Saved(fields) => {
            let columns: Vec<&str> = assignments.iter().map(|(c, _)| c.as_str()).collect();
            app.record(
                user,
                "edit",
                &format!("{} {}: {}", form.table(), id, columns.join(", ")),
            )
            .await;

            output::write_status(
                out,
                app.format,
                &format!("Data saved successfully ({} field(s))", fields),
                json!({ "table": form.table(), "id": id, "fields": fields }),
            )
        }
        SaveOutcome::NoChanges => output::write_status(
            out,
            app.format,
            "No changes to save",
            json!({ "table": form.table(), "id": id, "fields": 0 }),
        ),
    }
}

pub async fn add(
    app: &App,
    user: &AuthenticatedUser,
    view: &str,
    assignments: &[(String, String)],
    out: &mut dyn Write,
) -> AppResult<()> {
    let table = resolve_view(view).table();
    let tables = app.db.tables();

    let schema = warehouse_db::schema::table_schema(app.db.pool(), table).await?;
    let mut grid = TableGrid::load(table, tables.get_all(table, 0).await?);
    let row = grid.add_row();

    for (column, raw) in assignments {
        let info = schema
            .column(column)
            .ok_or_else(|| CoreError::UnknownColumn(column.clone()))?;
        if info.primary_key {
            return Err(AppError::invalid(format!(
                "{} is assigned by the database",
                info.name
            )));
        }

        let value = parse_field(&info.name, raw, info.column_type)?;
        grid.set_cell(row, &info.name, scalar_to_cell(&value))?;
    }

    let summary = tables.save_grid(&mut grid).await?;
    app.record(user, "insert", &format!("{}: {} row(s)", table, summary.inserted))
        .await;

    output::write_status(
        out,
        app.format,
        &format!("Added {} row(s) to {}", summary.inserted, table),
        json!({ "table": table, "inserted": summary.inserted }),
    )
}

pub async fn delete(
    app: &App,
    user: &AuthenticatedUser,
    view: &str,
    id: &str,
    confirmed: bool,
    out: &mut dyn Write,
) -> AppResult<()> {
    if !confirmed {
        return Err(AppError::NotConfirmed);
    }

    let table = resolve_view(view).table();
    let tables = app.db.tables();
    let key = tables.parse_key(table, id).await?;

    tables.delete(table, &key).await?;
    app.record(user, "delete", &format!("{} {}", table, id)).await;

    output::write_status(
        out,
        app.format,
        "Record deleted successfully",
        json!({ "table": table, "id": id }),
    )
}
