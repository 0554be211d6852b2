//! Account commands: register, roles, login.

use std::io::Write;

use serde_json::json;
use warehouse_core::auth::Registration;
use warehouse_core::{Cell, RowSet};
use warehouse_db::{AuthenticatedUser, Role};

use super::App;
use crate::cli::RegisterArgs;
use crate::error::{AppError, AppResult};
use crate::output;

/// Accepts a role id or a role name (case-insensitive).
fn resolve_role(roles: &[Role], raw: &str) -> AppResult<i64> {
    let raw = raw.trim();
    roles
        .iter()
        .find(|r| r.role_id.to_string() == raw || r.role_name.eq_ignore_ascii_case(raw))
        .map(|r| r.role_id)
        .ok_or_else(|| AppError::invalid(format!("Unknown role '{}'; see `warehouse roles`", raw)))
}

pub async fn register(app: &App, args: RegisterArgs, out: &mut dyn Write) -> AppResult<()> {
    let users = app.db.users();
    let role_id = resolve_role(&users.roles().await?, &args.role)?;

    let registration = Registration {
        full_name: args.full_name,
        phone: args.phone,
        email: args.email,
        username: args.username,
        password: args.new_password,
        confirm_password: args.confirm_password,
        role_id: Some(role_id),
    };
    let username = registration.username.trim().to_string();

    let user_id = users.register(registration).await?;

    output::write_status(
        out,
        app.format,
        &format!("Registration successful: {} (id {})", username, user_id),
        json!({ "user_id": user_id, "username": username }),
    )
}

pub async fn roles(app: &App, out: &mut dyn Write) -> AppResult<()> {
    let roles = app.db.users().roles().await?;

    let mut rows = RowSet::new(vec![
        "role_id".to_string(),
        "role_name".to_string(),
        "description".to_string(),
    ]);
    for role in roles {
        rows.push_row(vec![
            Cell::from(role.role_id),
            Cell::from(role.role_name),
            role.description.map(Cell::from).unwrap_or(Cell::Null),
        ])?;
    }

    output::write_rows(out, &rows, app.format)
}

pub async fn login(app: &App, user: &AuthenticatedUser, out: &mut dyn Write) -> AppResult<()> {
    app.record(user, "login", &user.username).await;

    let role = user.role_name.as_deref().unwrap_or("no role");
    output::write_status(
        out,
        app.format,
        &format!("Signed in as {} ({})", user.full_name, role),
        json!({ "user": user }),
    )
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::cli::OutputFormat;
    use crate::error::AppError;
    use warehouse_db::AuthError;

    fn args(username: &str, role: &str) -> RegisterArgs {
        RegisterArgs {
            full_name: "Grace Hopper".into(),
            username: username.into(),
            new_password: "cobol59".into(),
            confirm_password: "cobol59".into(),
            role: role.into(),
            phone: String::new(),
            email: String::new(),
        }
    }

    #[tokio::test]
    async fn test_register_by_role_name_then_login() {
        let app = app(OutputFormat::Table).await;
        let mut buf = Vec::new();

        register(&app, args("grace", "Accountant"), &mut buf).await.unwrap();
        assert!(text(buf).starts_with("Registration successful: grace"));

        let user = app.db.users().authenticate("grace", "cobol59").await.unwrap();
        assert_eq!(user.role_id, 3);
    }

    #[tokio::test]
    async fn test_register_unknown_role() {
        let app = app(OutputFormat::Table).await;
        let err = register(&app, args("grace", "janitor"), &mut Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let app = app(OutputFormat::Table).await;
        let err = register(&app, args(USER, "1"), &mut Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Auth(AuthError::DuplicateUser)));
    }

    #[tokio::test]
    async fn test_roles_listing() {
        let app = app(OutputFormat::Table).await;
        let mut buf = Vec::new();

        roles(&app, &mut buf).await.unwrap();

        let listing = text(buf);
        assert!(listing.contains("storekeeper"));
        assert!(listing.ends_with("(3 rows)\n"));
    }

    #[tokio::test]
    async fn test_login_is_recorded() {
        let app = app(OutputFormat::Table).await;
        let user = signed_in(&app).await;
        let mut buf = Vec::new();

        login(&app, &user, &mut buf).await.unwrap();

        assert_eq!(text(buf), "Signed in as Ada Lovelace (storekeeper)\n");
        let entries = app.db.action_log().recent(1).await.unwrap();
        assert_eq!(entries[0].action, "login");
        assert_eq!(entries[0].user_id, Some(user.user_id));
    }
}
