use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Portal role. The set is closed: anything that does not parse into one of
/// these variants carries no permissions anywhere in the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    Admin,
    Teacher,
    Student,
    Parent,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Teacher, Role::Student, Role::Parent];

    /// Canonical (upper-case) identifier as stored in tokens and cookies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Teacher => "TEACHER",
            Self::Student => "STUDENT",
            Self::Parent => "PARENT",
        }
    }

    /// Parse a role identifier, ignoring case and surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Some(Self::Admin),
            "TEACHER" => Some(Self::Teacher),
            "STUDENT" => Some(Self::Student),
            "PARENT" => Some(Self::Parent),
            _ => None,
        }
    }

    /// Normalize an untyped role claim to its upper-case string form.
    ///
    /// Strings are upper-cased as-is; non-zero numbers and `true` are
    /// stringified first. Empty strings, `null`, `false`, zero, arrays and
    /// objects produce no role. The result is not checked against the role
    /// set; use [`Role::parse`] for that.
    pub fn normalize(raw: &Value) -> Option<String> {
        let normalized = match raw {
            Value::String(s) => s.to_uppercase(),
            Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => n.to_string(),
            Value::Bool(true) => "TRUE".to_string(),
            _ => return None,
        };
        (!normalized.is_empty()).then_some(normalized)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid role '{}'", s))
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}
