use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Role, User};

/// The `{id, name, email}` shape embedded in class, payment and overview
/// payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Sender or receiver of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
}

impl From<&User> for Participant {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            role: user.role,
        }
    }
}

/// Trimmed non-empty string, or `None`.
pub fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Parse an optional id field. Blank is absent; anything else must be a UUID.
pub fn parse_id(raw: Option<&str>, field: &str) -> Result<Option<Uuid>, String> {
    match present(raw) {
        None => Ok(None),
        Some(value) => Uuid::parse_str(value)
            .map(Some)
            .map_err(|_| format!("{} must be a valid id", field)),
    }
}

/// Calendar day from `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| format!("{} must be a date (YYYY-MM-DD)", field))
}
