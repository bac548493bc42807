// ABOUTME: Domain records for bank users and their authorization roles
// ABOUTME: User keeps the password hash; UserInfo is the outward-facing projection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Authorization role carried in access tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Account holder; may act on their own accounts only
    #[default]
    Depositor,
    /// Bank staff; may act on any account
    Banker,
}

impl Role {
    /// Wire representation used in token payloads
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Depositor => "depositor",
            Self::Banker => "banker",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "depositor" => Ok(Self::Depositor),
            "banker" => Ok(Self::Banker),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Stored user account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique login name
    pub username: String,
    /// Authorization role
    pub role: Role,
    /// bcrypt hash of the password
    pub hashed_password: String,
    /// Display name
    pub full_name: String,
    /// Contact address
    pub email: String,
    /// Set once the verification email round-trip completes
    pub is_email_verified: bool,
    /// Last password change
    pub password_changed_at: DateTime<Utc>,
    /// Account creation
    pub created_at: DateTime<Utc>,
}

/// User fields safe to return to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Unique login name
    pub username: String,
    /// Authorization role
    pub role: Role,
    /// Display name
    pub full_name: String,
    /// Contact address
    pub email: String,
    /// Last password change
    pub password_changed_at: DateTime<Utc>,
    /// Account creation
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            role: user.role,
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            password_changed_at: user.password_changed_at,
            created_at: user.created_at,
        }
    }
}
