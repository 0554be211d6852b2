//! # Login and Registration Rules
//!
//! Input checks that run before any database round-trip. Password hashing
//! and the credential lookup live in `warehouse-db`.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Credentials typed into the login form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    /// Trims the user name; the password is taken verbatim.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        LoginRequest {
            username: username.into().trim().to_string(),
            password: password.into(),
        }
    }

    /// Both fields are required.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(ValidationError::required("username and password"));
        }
        Ok(())
    }
}

/// The registration form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registration {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    /// Selected role; `None` until the user picks one.
    pub role_id: Option<i64>,
}

impl Registration {
    /// Trims every text field except the two passwords.
    pub fn normalized(mut self) -> Self {
        self.full_name = self.full_name.trim().to_string();
        self.phone = self.phone.trim().to_string();
        self.email = self.email.trim().to_string();
        self.username = self.username.trim().to_string();
        self
    }

    /// ## Rules
    /// 1. A role must be selected
    /// 2. Full name, user name and password are required
    /// 3. Password and confirmation must match
    pub fn validate(&self) -> ValidationResult<()> {
        if self.role_id.is_none() {
            return Err(ValidationError::NotSelected {
                field: "role".to_string(),
            });
        }

        for (field, value) in [("full name", &self.full_name), ("username", &self.username)] {
            if value.trim().is_empty() {
                return Err(ValidationError::required(field));
            }
        }
        if self.password.is_empty() {
            return Err(ValidationError::required("password"));
        }

        if self.password != self.confirm_password {
            return Err(ValidationError::Mismatch {
                field: "password".to_string(),
                other: "password confirmation".to_string(),
            });
        }

        Ok(())
    }

    /// Optional phone; empty becomes NULL.
    pub fn phone(&self) -> Option<&str> {
        non_empty(&self.phone)
    }

    /// Optional email; empty becomes NULL.
    pub fn email(&self) -> Option<&str> {
        non_empty(&self.email)
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
