//! Command-line definition.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Warehouse Master: browse and edit the warehouse database.
#[derive(Debug, Parser)]
#[command(name = "warehouse", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to the platform config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub credentials: Credentials,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Login for commands that read or write tables.
#[derive(Debug, Clone, Default, Args)]
pub struct Credentials {
    /// User name to sign in with
    #[arg(long, short = 'u', global = true, env = "WAREHOUSE_USER")]
    pub user: Option<String>,

    /// Password to sign in with
    #[arg(long, short = 'p', global = true, env = "WAREHOUSE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the database and apply migrations
    Init,

    /// Create a new user account
    Register(RegisterArgs),

    /// List the roles a new account can take
    Roles,

    /// Check credentials and record the sign-in
    Login,

    /// List the browsable views
    Views,

    /// Show the rows of a view
    Browse {
        /// View name (products, warehouses, supplies, ...)
        view: String,

        /// Maximum number of rows (defaults to grid.row_limit)
        #[arg(long, short = 'n')]
        limit: Option<u32>,
    },

    /// Show one row in the editor, with lookup labels
    Show {
        view: String,
        /// Primary-key value of the row
        id: String,
    },

    /// Change fields of one row
    Edit {
        view: String,
        id: String,

        /// Field assignment, repeatable
        #[arg(long = "set", short = 's', value_name = "COLUMN=VALUE", value_parser = parse_assignment, required = true)]
        set: Vec<(String, String)>,
    },

    /// Add a new row
    Add {
        view: String,

        #[arg(long = "set", short = 's', value_name = "COLUMN=VALUE", value_parser = parse_assignment, required = true)]
        set: Vec<(String, String)>,
    },

    /// Delete one row
    Delete {
        view: String,
        id: String,

        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Write the rows of a view's table to a JSON file
    Export {
        view: String,

        /// Target directory (defaults to export.directory, then the working directory)
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },

    /// Append the rows of a JSON file to a view's table
    Import {
        view: String,
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub full_name: String,

    #[arg(long)]
    pub username: String,

    #[arg(long)]
    pub new_password: String,

    #[arg(long)]
    pub confirm_password: String,

    /// Role id or name (see `warehouse roles`)
    #[arg(long)]
    pub role: String,

    #[arg(long, default_value = "")]
    pub phone: String,

    #[arg(long, default_value = "")]
    pub email: String,
}

/// Parses `column=value`. The value may be empty (stores NULL) and may
/// itself contain `=`.
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (column, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=VALUE, got '{}'", raw))?;

    let column = column.trim();
    if column.is_empty() {
        return Err(format!("missing column name in '{}'", raw));
    }

    Ok((column.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("price=12.50").unwrap(),
            ("price".to_string(), "12.50".to_string())
        );
        assert_eq!(
            parse_assignment("note=a=b").unwrap(),
            ("note".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_assignment("sku=").unwrap(),
            ("sku".to_string(), String::new())
        );
        assert!(parse_assignment("price").is_err());
        assert!(parse_assignment("=5").is_err());
    }

    #[test]
    fn test_edit_arguments() {
        let cli = Cli::try_parse_from([
            "warehouse", "-u", "ada", "-p", "pw", "edit", "products", "7", "--set", "price=1.5",
            "-s", "unit=kg",
        ])
        .unwrap();

        assert_eq!(cli.credentials.user.as_deref(), Some("ada"));
        match cli.command {
            Command::Edit { view, id, set } => {
                assert_eq!(view, "products");
                assert_eq!(id, "7");
                assert_eq!(set.len(), 2);
                assert_eq!(set[1], ("unit".to_string(), "kg".to_string()));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_output_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["warehouse", "views", "--output", "json"]).unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
    }

    #[test]
    fn test_edit_requires_set() {
        assert!(Cli::try_parse_from(["warehouse", "edit", "products", "7"]).is_err());
    }
}
