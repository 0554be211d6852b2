//! # Export / Import Commands
//!
//! ```text
//! export products ──► SELECT * FROM product LIMIT grid.row_limit
//!                 ──► Products_20240517090307.json  (array of row objects)
//!
//! import products file.json
//!     ──► parse, reject empty
//!     ──► column set must equal the table's
//!     ──► one transaction; the key column is reassigned by the database
//! ```
//!
//! Both work on the raw table behind the view, not its display join, so
//! an exported file can always be imported back.

use std::io::Write;
use std::path::Path;

use chrono::Local;
use serde_json::json;
use tracing::info;
use warehouse_core::transfer::{check_compatible, export_file_name, parse_import, to_json};
use warehouse_db::AuthenticatedUser;

use super::table::resolve_view;
use super::App;
use crate::error::AppResult;
use crate::output;

pub async fn export(
    app: &App,
    view: &str,
    out_dir: Option<&Path>,
    out: &mut dyn Write,
) -> AppResult<()> {
    let view = resolve_view(view);
    let rows = app
        .db
        .tables()
        .get_all(view.table(), app.config.grid.row_limit)
        .await?;
    let json = to_json(&rows)?;

    let dir = app.config.export_dir(out_dir);
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(export_file_name(
        view.display_name(),
        Local::now().naive_local(),
    ));
    std::fs::write(&path, json)?;

    info!(view = %view, rows = rows.len(), path = %path.display(), "Exported");

    output::write_status(
        out,
        app.format,
        &format!("Data exported to {}", path.display()),
        json!({ "path": path.display().to_string(), "rows": rows.len() }),
    )
}

pub async fn import(
    app: &App,
    user: &AuthenticatedUser,
    view: &str,
    file: &Path,
    out: &mut dyn Write,
) -> AppResult<()> {
    let table = resolve_view(view).table();
    let tables = app.db.tables();

    let rows = parse_import(&std::fs::read_to_string(file)?)?;
    let current = tables.get_all(table, 0).await?;
    check_compatible(table, &current.columns, &rows)?;

    let imported = tables.import_rows(table, &rows).await?;
    app.record(
        user,
        "import",
        &format!("{}: {} row(s) from {}", table, imported, file.display()),
    )
    .await;

    output::write_status(
        out,
        app.format,
        &format!("Imported {} row(s) into {}", imported, table),
        json!({ "table": table, "rows": imported }),
    )
}
