// ABOUTME: Deployment environment selector read from the ENVIRONMENT variable
// ABOUTME: Unknown values fall back to development so local runs need no setup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the service is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Automated test runs
    Testing,
    /// Live deployment; weak token settings are warned about
    Production,
}

impl Environment {
    /// Interpret an `ENVIRONMENT` value, case-insensitively
    #[must_use]
    pub fn from_env_value(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("production") || raw.eq_ignore_ascii_case("prod") {
            Self::Production
        } else if raw.eq_ignore_ascii_case("testing") || raw.eq_ignore_ascii_case("test") {
            Self::Testing
        } else {
            Self::Development
        }
    }

    /// Canonical lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Testing => "testing",
            Self::Production => "production",
        }
    }

    /// True for [`Environment::Production`]
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
