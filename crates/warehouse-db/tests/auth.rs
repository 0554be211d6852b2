//! Login and registration against a migrated in-memory database.

use warehouse_core::auth::Registration;
use warehouse_db::repository::user::hash_password;
use warehouse_db::{AuthError, Database, DbConfig};

async fn db_with_user(username: &str, password: &str) -> Database {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    db.users()
        .register(Registration {
            full_name: "Grace Hopper".into(),
            phone: "555-0100".into(),
            email: format!("{}@example.com", username),
            username: username.into(),
            password: password.into(),
            confirm_password: password.into(),
            role_id: Some(1),
        })
        .await
        .unwrap();
    db
}

#[tokio::test]
async fn login_succeeds_with_correct_credentials() {
    let db = db_with_user("grace", "cobol").await;

    let user = db.users().authenticate("grace", "cobol").await.unwrap();
    assert_eq!(user.username, "grace");
    assert_eq!(user.role_name.as_deref(), Some("admin"));
}

#[tokio::test]
async fn login_trims_the_user_name() {
    let db = db_with_user("grace", "cobol").await;
    assert!(db.users().authenticate("  grace ", "cobol").await.is_ok());
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let db = db_with_user("grace", "cobol").await;

    let err = db.users().authenticate("grace", "fortran").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidPassword));
}

#[tokio::test]
async fn login_rejects_unknown_user() {
    let db = db_with_user("grace", "cobol").await;

    let err = db.users().authenticate("alan", "cobol").await.unwrap_err();
    assert!(matches!(err, AuthError::UserNotFound));
    assert_eq!(err.to_string(), "User not found or disabled");
}

#[tokio::test]
async fn login_rejects_disabled_user() {
    let db = db_with_user("grace", "cobol").await;
    sqlx::query("UPDATE app_user SET status = 'disabled' WHERE username = 'grace'")
        .execute(db.pool())
        .await
        .unwrap();

    let err = db.users().authenticate("grace", "cobol").await.unwrap_err();
    assert!(matches!(err, AuthError::UserNotFound));
}

#[tokio::test]
async fn login_accepts_legacy_bcrypt_hash() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let legacy = bcrypt::hash("letmein", 4).unwrap();
    sqlx::query(
        "INSERT INTO app_user (full_name, role_id, username, password_hash) VALUES ('Old', 3, 'old', ?1)",
    )
    .bind(&legacy)
    .execute(db.pool())
    .await
    .unwrap();

    assert!(db.users().authenticate("old", "letmein").await.is_ok());
}

#[tokio::test]
async fn duplicate_email_is_a_duplicate_user() {
    let db = db_with_user("grace", "cobol").await;

    let err = db
        .users()
        .register(Registration {
            full_name: "Someone Else".into(),
            email: "grace@example.com".into(),
            username: "other".into(),
            password: "pw".into(),
            confirm_password: "pw".into(),
            role_id: Some(2),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::DuplicateUser));
}

#[test]
fn stored_hashes_are_salted() {
    let a = hash_password("same").unwrap();
    let b = hash_password("same").unwrap();
    assert_ne!(a, b);
}
