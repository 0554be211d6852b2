//! # User Repository
//!
//! Login, registration and the role list.
//!
//! ## Login
//! ```text
//! authenticate("ada", "s3cret")
//!     │
//!     ▼
//! SELECT ... FROM app_user WHERE username = 'ada' AND status = 'active'
//!     │
//!     ├── no row            → AuthError::UserNotFound
//!     ├── hash mismatch     → AuthError::InvalidPassword
//!     └── hash matches      → AuthenticatedUser
//! ```
//!
//! New passwords are stored as Argon2 PHC strings (`$argon2id$...`).
//! Accounts migrated from older installs may still carry bcrypt hashes
//! (`$2a$`, `$2b$`, `$2y$`); those verify too.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{AuthError, AuthResult, DbResult};
use warehouse_core::auth::{LoginRequest, Registration};
use warehouse_core::{ValidationError, ACTIVE_STATUS};

const BCRYPT_PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

/// A role offered at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub role_id: i64,
    pub role_name: String,
    pub description: Option<String>,
}

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub username: String,
    pub full_name: String,
    pub role_id: i64,
    pub role_name: Option<String>,
}

#[derive(FromRow)]
struct CredentialRow {
    user_id: i64,
    username: String,
    full_name: String,
    role_id: i64,
    role_name: Option<String>,
    password_hash: String,
}

/// Repository for user accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Checks a user name and password against the active accounts.
    ///
    /// ## Errors
    /// - `AuthError::Validation` when either input is empty
    /// - `AuthError::UserNotFound` when no active account has that name
    /// - `AuthError::InvalidPassword` when the password does not match
    pub async fn authenticate(&self, username: &str, password: &str) -> AuthResult<AuthenticatedUser> {
        let request = LoginRequest::new(username, password);
        request.validate()?;

        debug!(username = %request.username, "Authenticating");

        let row: Option<CredentialRow> = sqlx::query_as(
            r#"
            SELECT u.user_id, u.username, u.full_name, u.role_id, r.role_name, u.password_hash
            FROM app_user u
            LEFT JOIN role r ON r.role_id = u.role_id
            WHERE u.username = ?1 AND u.status = ?2
            "#,
        )
        .bind(&request.username)
        .bind(ACTIVE_STATUS)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            warn!(username = %request.username, "Login rejected: unknown or disabled user");
            return Err(AuthError::UserNotFound);
        };

        if !verify_password(&request.password, &row.password_hash) {
            warn!(username = %request.username, "Login rejected: wrong password");
            return Err(AuthError::InvalidPassword);
        }

        info!(user_id = row.user_id, username = %row.username, "User authenticated");

        Ok(AuthenticatedUser {
            user_id: row.user_id,
            username: row.username,
            full_name: row.full_name,
            role_id: row.role_id,
            role_name: row.role_name,
        })
    }

    /// Creates an account and returns its id.
    ///
    /// Surrounding whitespace is trimmed from the text fields; an empty
    /// phone or email is stored as NULL.
    ///
    /// ## Errors
    /// - `AuthError::Validation` for a missing role, name, user name or
    ///   password, or a confirmation that does not match
    /// - `AuthError::DuplicateUser` when the user name or email is taken
    pub async fn register(&self, registration: Registration) -> AuthResult<i64> {
        let registration = registration.normalized();
        registration.validate()?;

        let role_id = registration
            .role_id
            .ok_or_else(|| ValidationError::NotSelected {
                field: "role".to_string(),
            })?;

        let password_hash = hash_password(&registration.password)?;

        let result = sqlx::query(
            r#"
            INSERT INTO app_user (full_name, role_id, username, password_hash, phone, email, status)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&registration.full_name)
        .bind(role_id)
        .bind(&registration.username)
        .bind(&password_hash)
        .bind(registration.phone())
        .bind(registration.email())
        .bind(ACTIVE_STATUS)
        .execute(&self.pool)
        .await?;

        let user_id = result.last_insert_rowid();
        info!(user_id = user_id, username = %registration.username, "User registered");
        Ok(user_id)
    }

    /// All roles, by id.
    pub async fn roles(&self) -> DbResult<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>(
            "SELECT role_id, role_name, description FROM role ORDER BY role_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }
}

/// Hashes a password for storage (Argon2id, random salt).
pub fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hashing(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verifies a password against a stored Argon2 or bcrypt hash.
///
/// Unparseable hashes never verify.
pub fn verify_password(password: &str, hash: &str) -> bool {
    if BCRYPT_PREFIXES.iter().any(|p| hash.starts_with(p)) {
        return bcrypt::verify(password, hash).unwrap_or(false);
    }

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn registration(username: &str) -> Registration {
        Registration {
            full_name: "Ada Lovelace".into(),
            username: username.into(),
            password: "s3cret".into(),
            confirm_password: "s3cret".into(),
            role_id: Some(2),
            ..Default::default()
        }
    }

    #[test]
    fn test_argon2_round_trip() {
        let hash = hash_password("hunter2").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn test_legacy_bcrypt_hash() {
        let hash = bcrypt::hash("hunter2", 4).unwrap();
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn test_garbage_hash_never_verifies() {
        assert!(!verify_password("", ""));
        assert!(!verify_password("x", "plain-text"));
    }

    #[tokio::test]
    async fn test_roles_are_seeded() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let roles = db.users().roles().await.unwrap();

        let names: Vec<&str> = roles.iter().map(|r| r.role_name.as_str()).collect();
        assert_eq!(names, vec!["admin", "storekeeper", "accountant"]);
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let users = db.users();

        let id = users.register(registration("ada")).await.unwrap();
        let user = users.authenticate("ada", "s3cret").await.unwrap();

        assert_eq!(user.user_id, id);
        assert_eq!(user.full_name, "Ada Lovelace");
        assert_eq!(user.role_name.as_deref(), Some("storekeeper"));
    }

    #[tokio::test]
    async fn test_register_stores_empty_contact_as_null() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.users().register(registration("ada")).await.unwrap();

        let email: Option<String> =
            sqlx::query_scalar("SELECT email FROM app_user WHERE username = 'ada'")
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(email, None);
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let users = db.users();

        users.register(registration("ada")).await.unwrap();
        let err = users.register(registration("ada")).await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUser));
    }

    #[tokio::test]
    async fn test_register_validates_before_writing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut reg = registration("ada");
        reg.confirm_password = "other".into();

        let err = db.users().register(reg).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn test_empty_login_is_a_validation_error() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db.users().authenticate("  ", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }
}
