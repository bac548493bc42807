// ABOUTME: Password hashing and verification with bcrypt
// ABOUTME: Wraps bcrypt errors into application errors without leaking the plaintext
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::{AppError, AppResult};

/// Hash `password` with the default bcrypt cost
///
/// # Errors
/// Returns an error if bcrypt hashing fails
pub fn hash_password(password: &str) -> AppResult<String> {
    hash_password_with_cost(password, bcrypt::DEFAULT_COST)
}

/// Hash `password` with an explicit bcrypt cost
///
/// # Errors
/// Returns an error if bcrypt hashing fails or `cost` is out of range
pub fn hash_password_with_cost(password: &str, cost: u32) -> AppResult<String> {
    bcrypt::hash(password, cost)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
}

/// Check `password` against a stored bcrypt hash
///
/// # Errors
/// Returns an auth error on mismatch and an internal error on a malformed hash
pub fn check_password(password: &str, hashed_password: &str) -> AppResult<()> {
    match bcrypt::verify(password, hashed_password) {
        Ok(true) => Ok(()),
        Ok(false) => Err(AppError::auth_invalid("incorrect password")),
        Err(e) => Err(AppError::internal(format!("Failed to verify password hash: {e}"))),
    }
}
