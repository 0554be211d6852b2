//! # Statement Builder
//!
//! SQL text for tables that are only known by name at runtime.
//!
//! Values are never spliced into the text: every value becomes a numbered
//! `?N` placeholder. Table and column names cannot be bound as parameters,
//! so they are validated against a strict identifier grammar and quoted.
//!
//! ```text
//! update_columns("product", ["price", "quantity"], "product_id")
//!   → UPDATE "product" SET "price" = ?1, "quantity" = ?2 WHERE "product_id" = ?3
//! ```

use crate::error::{CoreError, CoreResult};

/// Checks that `name` is a plain SQL identifier: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn validate_identifier(name: &str) -> CoreResult<&str> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(name)
    } else {
        Err(CoreError::InvalidIdentifier(name.to_string()))
    }
}

/// Validates and double-quotes an identifier.
pub fn quote_identifier(name: &str) -> CoreResult<String> {
    validate_identifier(name).map(|n| format!("\"{}\"", n))
}

/// `SELECT * FROM "t" LIMIT n`
pub fn select_all(table: &str, limit: u32) -> CoreResult<String> {
    Ok(format!(
        "SELECT * FROM {} LIMIT {}",
        quote_identifier(table)?,
        limit
    ))
}

/// `SELECT * FROM "t" WHERE "pk" = ?1`
pub fn select_by_key(table: &str, primary_key: &str) -> CoreResult<String> {
    Ok(format!(
        "SELECT * FROM {} WHERE {} = ?1",
        quote_identifier(table)?,
        quote_identifier(primary_key)?
    ))
}

/// `SELECT * FROM "t" LIMIT 0`, used to learn the real column set.
pub fn schema_probe(table: &str) -> CoreResult<String> {
    select_all(table, 0)
}

/// `UPDATE "t" SET "a" = ?1, ... WHERE "pk" = ?n+1`
///
/// The key value binds last.
pub fn update_columns<S: AsRef<str>>(
    table: &str,
    columns: &[S],
    primary_key: &str,
) -> CoreResult<String> {
    if columns.is_empty() {
        return Err(CoreError::EmptyStatement(table.to_string()));
    }

    let assignments = columns
        .iter()
        .enumerate()
        .map(|(i, c)| Ok(format!("{} = ?{}", quote_identifier(c.as_ref())?, i + 1)))
        .collect::<CoreResult<Vec<_>>>()?;

    Ok(format!(
        "UPDATE {} SET {} WHERE {} = ?{}",
        quote_identifier(table)?,
        assignments.join(", "),
        quote_identifier(primary_key)?,
        columns.len() + 1
    ))
}

/// `INSERT INTO "t" ("a", ...) VALUES (?1, ...)`
///
/// With no columns every value comes from the column defaults.
pub fn insert_columns<S: AsRef<str>>(table: &str, columns: &[S]) -> CoreResult<String> {
    let table = quote_identifier(table)?;

    if columns.is_empty() {
        return Ok(format!("INSERT INTO {} DEFAULT VALUES", table));
    }

    let names = columns
        .iter()
        .map(|c| quote_identifier(c.as_ref()))
        .collect::<CoreResult<Vec<_>>>()?;
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>();

    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        names.join(", "),
        placeholders.join(", ")
    ))
}

/// `DELETE FROM "t" WHERE "pk" = ?1`
pub fn delete_by_key(table: &str, primary_key: &str) -> CoreResult<String> {
    Ok(format!(
        "DELETE FROM {} WHERE {} = ?1",
        quote_identifier(table)?,
        quote_identifier(primary_key)?
    ))
}

/// `SELECT "id", "name" FROM "ref" ORDER BY "name"` for a lookup combo.
pub fn lookup_query(ref_table: &str, id_column: &str, name_column: &str) -> CoreResult<String> {
    let name_column = quote_identifier(name_column)?;
    Ok(format!(
        "SELECT {}, {} FROM {} ORDER BY {}",
        quote_identifier(id_column)?,
        name_column,
        quote_identifier(ref_table)?,
        name_column
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_grammar() {
        assert!(validate_identifier("goods_receipt").is_ok());
        assert!(validate_identifier("_tmp1").is_ok());

        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("1abc").is_err());
        assert!(validate_identifier("product; DROP TABLE app_user").is_err());
        assert!(validate_identifier("a\"b").is_err());
    }

    #[test]
    fn test_select_all() {
        assert_eq!(
            select_all("warehouse", 100).unwrap(),
            r#"SELECT * FROM "warehouse" LIMIT 100"#
        );
        assert_eq!(
            schema_probe("warehouse").unwrap(),
            r#"SELECT * FROM "warehouse" LIMIT 0"#
        );
    }

    #[test]
    fn test_update_binds_key_last() {
        let sql = update_columns("product", &["price", "quantity"], "product_id").unwrap();
        assert_eq!(
            sql,
            r#"UPDATE "product" SET "price" = ?1, "quantity" = ?2 WHERE "product_id" = ?3"#
        );
    }

    #[test]
    fn test_update_without_columns_is_rejected() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            update_columns("product", &empty, "product_id"),
            Err(CoreError::EmptyStatement(_))
        ));
    }

    #[test]
    fn test_insert() {
        assert_eq!(
            insert_columns("warehouse", &["warehouse_name", "address"]).unwrap(),
            r#"INSERT INTO "warehouse" ("warehouse_name", "address") VALUES (?1, ?2)"#
        );

        let empty: [&str; 0] = [];
        assert_eq!(
            insert_columns("warehouse", &empty).unwrap(),
            r#"INSERT INTO "warehouse" DEFAULT VALUES"#
        );
    }

    #[test]
    fn test_lookup_query() {
        assert_eq!(
            lookup_query("role", "role_id", "role_name").unwrap(),
            r#"SELECT "role_id", "role_name" FROM "role" ORDER BY "role_name""#
        );
    }

    #[test]
    fn test_injection_in_column_name_is_rejected() {
        assert!(insert_columns("product", &["name) VALUES (1); --"]).is_err());
        assert!(delete_by_key("product", "id OR 1=1").is_err());
    }
}
