//! # Application Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     WAREHOUSE_DB_PATH=/srv/warehouse.db                                │
//! │     WAREHOUSE_ROW_LIMIT=250                                            │
//! │     WAREHOUSE_EXPORT_DIR=/srv/exports                                  │
//! │                                                                         │
//! │  2. TOML Config File (--config PATH, or the platform default)          │
//! │     ~/.config/warehouse-master/warehouse.toml (Linux)                  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     database in the platform data dir, 100 rows per grid              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/srv/warehouse.db"
//! max_connections = 5
//!
//! [grid]
//! row_limit = 100
//!
//! [export]
//! directory = "/srv/exports"
//! ```

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use warehouse_core::DEFAULT_ROW_LIMIT;

use crate::error::{AppError, AppResult};

const CONFIG_FILE: &str = "warehouse.toml";
const DATABASE_FILE: &str = "warehouse.db";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "warehouse", "warehouse-master")
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Unset means `warehouse.db` in the platform data dir.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSettings {
    /// Rows loaded per browse.
    #[serde(default = "default_row_limit")]
    pub row_limit: u32,
}

fn default_row_limit() -> u32 {
    DEFAULT_ROW_LIMIT
}

impl Default for GridSettings {
    fn default() -> Self {
        GridSettings {
            row_limit: default_row_limit(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Where export files go. Unset means the working directory.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

// =============================================================================
// Application Config
// =============================================================================

/// Complete configuration of the `warehouse` binary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub grid: GridSettings,

    #[serde(default)]
    pub export: ExportSettings,
}

impl AppConfig {
    /// Loads configuration from file, then environment, then validates.
    ///
    /// A missing file is not an error; defaults are used.
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Writes the configuration as TOML, creating parent directories.
    pub fn save(&self, config_path: Option<PathBuf>) -> AppResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| AppError::Config("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, toml::to_string_pretty(self)?)?;

        info!(?path, "Config saved");
        Ok(path)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.database.max_connections == 0 {
            return Err(AppError::Config(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.grid.row_limit == 0 {
            return Err(AppError::Config(
                "grid.row_limit must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `WAREHOUSE_*` overrides from `lookup`. Unparseable numbers
    /// are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("WAREHOUSE_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(limit) = lookup("WAREHOUSE_ROW_LIMIT") {
            if let Ok(limit) = limit.parse::<u32>() {
                debug!(limit = limit, "Overriding row limit from environment");
                self.grid.row_limit = limit;
            }
        }

        if let Some(dir) = lookup("WAREHOUSE_EXPORT_DIR") {
            self.export.directory = Some(PathBuf::from(dir));
        }
    }

    /// Platform config file location.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Database file to open; the platform data dir is created on demand.
    pub fn database_path(&self) -> AppResult<PathBuf> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }

        let dirs = project_dirs()
            .ok_or_else(|| AppError::Config("Could not determine app data directory".into()))?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        Ok(data_dir.join(DATABASE_FILE))
    }

    /// Export directory: `--out` wins over the configured one, which wins
    /// over the working directory.
    pub fn export_dir(&self, out: Option<&Path>) -> PathBuf {
        out.map(Path::to_path_buf)
            .or_else(|| self.export.directory.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.grid.row_limit, 100);
        assert_eq!(config.database.max_connections, 5);
        assert!(config.database.path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [database]
            path = "/srv/warehouse.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, Some(PathBuf::from("/srv/warehouse.db")));
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.grid.row_limit, 100);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("WAREHOUSE_DB_PATH", "/tmp/w.db"),
            ("WAREHOUSE_ROW_LIMIT", "25"),
            ("WAREHOUSE_EXPORT_DIR", "/tmp/out"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.path, Some(PathBuf::from("/tmp/w.db")));
        assert_eq!(config.grid.row_limit, 25);
        assert_eq!(config.export_dir(None), PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_bad_numeric_override_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(|key| (key == "WAREHOUSE_ROW_LIMIT").then(|| "lots".to_string()));
        assert_eq!(config.grid.row_limit, 100);
    }

    #[test]
    fn test_zero_row_limit_is_invalid() {
        let mut config = AppConfig::default();
        config.grid.row_limit = 0;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("warehouse.toml");

        let mut config = AppConfig::default();
        config.database.path = Some(dir.path().join("w.db"));
        config.grid.row_limit = 40;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let loaded: AppConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_export_dir_precedence() {
        let mut config = AppConfig::default();
        assert_eq!(config.export_dir(None), PathBuf::from("."));

        config.export.directory = Some(PathBuf::from("/exports"));
        assert_eq!(config.export_dir(None), PathBuf::from("/exports"));
        assert_eq!(
            config.export_dir(Some(Path::new("/cli"))),
            PathBuf::from("/cli")
        );
    }
}
