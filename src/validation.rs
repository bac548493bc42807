// ABOUTME: Field validation for user-facing RPC requests
// ABOUTME: Collects every violation per field and reports them together as invalid input
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::limits;
use crate::errors::AppError;
use serde_json::{Map, Value};

/// A single rejected request field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Request field name
    pub field: &'static str,
    /// Why the value was rejected
    pub description: String,
}

/// Accumulates field violations for one request
#[derive(Debug, Default)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    /// Start an empty set
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Record the outcome of validating `field`
    pub fn check(&mut self, field: &'static str, outcome: Result<(), String>) {
        if let Err(description) = outcome {
            self.0.push(FieldViolation { field, description });
        }
    }

    /// Recorded violations
    #[must_use]
    pub fn as_slice(&self) -> &[FieldViolation] {
        &self.0
    }

    /// Convert into an invalid-input error when anything was recorded
    ///
    /// # Errors
    /// Returns `INVALID_INPUT` with per-field details if any check failed
    pub fn into_result(self) -> Result<(), AppError> {
        if self.0.is_empty() {
            return Ok(());
        }

        let mut details = Map::new();
        for violation in &self.0 {
            details.insert(
                violation.field.to_owned(),
                Value::String(violation.description.clone()),
            );
        }
        Err(AppError::invalid_input("invalid parameters").with_details(Value::Object(details)))
    }
}

fn validate_length(value: &str, min: usize, max: usize) -> Result<(), String> {
    let n = value.chars().count();
    if n < min || n > max {
        return Err(format!("must contain from {min}-{max} characters"));
    }
    Ok(())
}

/// Lowercase letters, digits and underscores
///
/// # Errors
/// Returns a description of the first problem found
pub fn validate_username(value: &str) -> Result<(), String> {
    validate_length(value, limits::USERNAME_MIN, limits::USERNAME_MAX)?;
    if !value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err("must contain only lowercase letters, digits, or underscore".into());
    }
    Ok(())
}

/// Letters and spaces
///
/// # Errors
/// Returns a description of the first problem found
pub fn validate_full_name(value: &str) -> Result<(), String> {
    validate_length(value, limits::FULL_NAME_MIN, limits::FULL_NAME_MAX)?;
    if !value.chars().all(|c| c.is_alphabetic() || c == ' ') {
        return Err("must contain only letters or spaces".into());
    }
    Ok(())
}

/// Length bounds only
///
/// # Errors
/// Returns a description of the first problem found
pub fn validate_password(value: &str) -> Result<(), String> {
    validate_length(value, limits::PASSWORD_MIN, limits::PASSWORD_MAX)
}

/// Shape check only: one `@`, non-empty local part, dotted domain
///
/// # Errors
/// Returns a description of the first problem found
pub fn validate_email(value: &str) -> Result<(), String> {
    validate_length(value, limits::EMAIL_MIN, limits::EMAIL_MAX)?;

    let invalid = || "is not a valid email address".to_owned();
    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || value.chars().any(char::is_whitespace)
        || domain.starts_with('.')
        || domain.ends_with('.')
        || !domain.contains('.')
    {
        return Err(invalid());
    }
    Ok(())
}
