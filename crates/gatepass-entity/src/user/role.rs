//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles a principal may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Institution administrator.
    Admin,
    /// Gate security staff.
    Security,
    /// Teaching or administrative staff.
    Staff,
    /// Enrolled student.
    Student,
}

impl UserRole {
    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether this role operates the gate.
    pub fn is_gate_operator(&self) -> bool {
        matches!(self, Self::Admin | Self::Security)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Security => "security",
            Self::Staff => "staff",
            Self::Student => "student",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "security" | "seguridad" => Ok(Self::Security),
            "staff" => Ok(Self::Staff),
            "student" => Ok(Self::Student),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}
