use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidateEmail};

use super::Role;

/// A portal account. The password hash never leaves the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Client-safe projection of a [`User`], including the stored avatar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub created_at: DateTime<Utc>,
    pub avatar_url: String,
}

impl UserView {
    pub fn new(user: &User, avatar_url: String) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            phone: user.phone.clone(),
            gender: user.gender.clone(),
            created_at: user.created_at,
            avatar_url,
        }
    }
}

/// Record handed to the user repository once input has been validated and
/// the password hashed.
#[derive(Debug, Clone)]
pub struct CreateUserRecord {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub phone: Option<String>,
    pub gender: Option<String>,
}

/// Partial update applied by the user repository. `None` leaves a field
/// untouched; `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub phone: Option<Option<String>>,
    pub gender: Option<Option<String>>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.role.is_none()
            && self.phone.is_none()
            && self.gender.is_none()
    }
}

/// Body of `POST /api/auth/register` and `POST /api/users`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

/// A [`CreateUserRequest`] that passed presence and format checks.
#[derive(Debug, Clone)]
pub struct ValidatedUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub phone: Option<String>,
    pub gender: Option<String>,
}

impl CreateUserRequest {
    /// Trim and normalize the request, then check it.
    ///
    /// Name, email and password are required; the role defaults to
    /// `STUDENT` and must belong to the role set.
    pub fn validate_input(self, password_min_length: usize) -> Result<ValidatedUser, String> {
        let name = self.name.as_deref().map(str::trim).unwrap_or_default();
        let email = normalize_email(self.email.as_deref().unwrap_or_default());
        let password = self.password.unwrap_or_default();

        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err("Name, email and password are required".to_string());
        }
        if !email.validate_email() {
            return Err("Invalid email address".to_string());
        }
        if password.chars().count() < password_min_length {
            return Err(format!(
                "Password must be at least {} characters",
                password_min_length
            ));
        }

        let role = match self.role.as_deref().map(str::trim) {
            None | Some("") => Role::Student,
            Some(raw) => Role::parse(raw).ok_or_else(|| "Invalid role supplied".to_string())?,
        };

        Ok(ValidatedUser {
            name: name.to_string(),
            email,
            password,
            role,
            phone: normalize_optional(self.phone.as_deref()),
            gender: normalize_optional(self.gender.as_deref()),
        })
    }
}

/// Body of `PUT /api/users/{id}`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 255))]
    #[serde(default)]
    pub name: Option<String>,
    #[validate(email)]
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Blank strings become absent.
pub fn normalize_optional(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
