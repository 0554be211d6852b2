//! End-to-end runs of the `warehouse` command line against a database
//! file in a temporary directory.

use clap::Parser;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use warehouse_cli::{run, AppConfig, AppError, Cli};

struct Workspace {
    dir: TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("warehouse.toml");

        let mut settings = AppConfig::default();
        settings.database.path = Some(dir.path().join("warehouse.db"));
        settings.export.directory = Some(dir.path().join("exports"));
        settings.save(Some(config.clone())).unwrap();

        Workspace { dir, config }
    }

    fn exports(&self) -> PathBuf {
        self.dir.path().join("exports")
    }

    /// Runs `warehouse --config <tmp> -o json <args...>` and parses stdout.
    async fn json(&self, args: &[&str]) -> Result<Value, AppError> {
        let out = self.raw(args).await?;
        Ok(serde_json::from_str(&out).unwrap())
    }

    async fn raw(&self, args: &[&str]) -> Result<String, AppError> {
        let config = self.config.to_string_lossy().to_string();
        let mut argv = vec!["warehouse", "--config", config.as_str(), "-o", "json"];
        argv.extend_from_slice(args);

        let cli = Cli::try_parse_from(argv).unwrap();
        let mut buf = Vec::new();
        run(cli, &mut buf).await?;
        Ok(String::from_utf8(buf).unwrap())
    }

    async fn as_admin(&self, args: &[&str]) -> Result<Value, AppError> {
        let mut argv = vec!["-u", "admin", "-p", "admin123"];
        argv.extend_from_slice(args);
        self.json(&argv).await
    }
}

async fn with_admin() -> Workspace {
    let ws = Workspace::new();
    ws.json(&[
        "register",
        "--full-name",
        "Administrator",
        "--username",
        "admin",
        "--new-password",
        "admin123",
        "--confirm-password",
        "admin123",
        "--role",
        "admin",
    ])
    .await
    .unwrap();
    ws
}

fn only_file(dir: &Path) -> PathBuf {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 1);
    entries.remove(0)
}

#[tokio::test]
async fn test_init_creates_database_file() {
    let ws = Workspace::new();

    let status = ws.json(&["init"]).await.unwrap();

    assert_eq!(status["roles"], 3);
    assert!(ws.dir.path().join("warehouse.db").exists());
}

#[tokio::test]
async fn test_login_flow() {
    let ws = with_admin().await;

    let status = ws.as_admin(&["login"]).await.unwrap();
    assert_eq!(status["user"]["username"], "admin");
    assert_eq!(status["user"]["role_name"], "admin");

    let err = ws
        .json(&["-u", "admin", "-p", "nope", "login"])
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid password");

    let err = ws
        .json(&["-u", "ghost", "-p", "admin123", "login"])
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "User not found or disabled");
}

#[tokio::test]
async fn test_add_edit_browse_delete() {
    let ws = with_admin().await;

    ws.as_admin(&["add", "warehouses", "--set", "warehouse_name=Central"])
        .await
        .unwrap();
    ws.as_admin(&["add", "warehouses", "--set", "warehouse_name=North"])
        .await
        .unwrap();
    ws.as_admin(&[
        "add",
        "products",
        "--set",
        "product_name=Bolt M8",
        "--set",
        "price=0.25",
        "--set",
        "warehouse_id=1",
    ])
    .await
    .unwrap();

    let saved = ws
        .as_admin(&["edit", "products", "1", "--set", "warehouse_id=North"])
        .await
        .unwrap();
    assert_eq!(saved["fields"], 1);

    let form = ws.as_admin(&["show", "products", "1"]).await.unwrap();
    let warehouse = form["fields"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["column"] == "warehouse_id")
        .unwrap()
        .clone();
    assert_eq!(warehouse["value"], "2");
    assert_eq!(warehouse["label"], "North");

    let rows = ws.as_admin(&["browse", "products"]).await.unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["product_name"], "Bolt M8");

    let err = ws.as_admin(&["delete", "products", "1"]).await.unwrap_err();
    assert!(matches!(err, AppError::NotConfirmed));

    ws.as_admin(&["delete", "products", "1", "--yes"]).await.unwrap();
    let rows = ws.as_admin(&["browse", "products"]).await.unwrap();
    assert!(rows.as_array().unwrap().is_empty());

    let log = ws.as_admin(&["browse", "reports"]).await.unwrap();
    let actions: Vec<&str> = log
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions, ["insert", "insert", "insert", "edit", "delete"]);
}

#[tokio::test]
async fn test_export_then_import_into_fresh_database() {
    let source = with_admin().await;
    for name in ["Central", "North", "South"] {
        source
            .as_admin(&["add", "warehouses", "--set", &format!("warehouse_name={}", name)])
            .await
            .unwrap();
    }

    source.as_admin(&["export", "warehouses"]).await.unwrap();
    let file = only_file(&source.exports());
    let file = file.to_string_lossy().to_string();

    let target = with_admin().await;
    let status = target
        .as_admin(&["import", "warehouses", &file])
        .await
        .unwrap();
    assert_eq!(status["rows"], 3);

    let before = source.as_admin(&["browse", "warehouses"]).await.unwrap();
    let after = target.as_admin(&["browse", "warehouses"]).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_import_rejects_mismatched_columns() {
    let ws = with_admin().await;
    ws.as_admin(&["add", "warehouses", "--set", "warehouse_name=Central"])
        .await
        .unwrap();
    ws.as_admin(&["export", "warehouses"]).await.unwrap();
    let file = only_file(&ws.exports()).to_string_lossy().to_string();

    let err = ws.as_admin(&["import", "products", &file]).await.unwrap_err();

    assert!(err
        .to_string()
        .starts_with("Imported data does not match the structure of table product"));
}
