// ABOUTME: User persistence abstraction and an in-memory implementation
// ABOUTME: RPC handlers depend on the Store trait; MemoryStore backs tests and the default binary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # User store
//!
//! The [`Store`] trait is the seam between request handlers and persistence.
//! [`MemoryStore`] keeps users in a concurrent map keyed by username.

use crate::errors::{AppError, ErrorCode};
use crate::models::{Role, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;

/// Store operation failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No row matched the lookup key
    #[error("user '{0}' not found")]
    NotFound(String),
    /// A unique column already holds this value
    #[error("user '{0}' already exists")]
    UniqueViolation(String),
    /// Backend failure
    #[error("store backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        let code = match &error {
            StoreError::NotFound(_) => ErrorCode::ResourceNotFound,
            StoreError::UniqueViolation(_) => ErrorCode::ResourceAlreadyExists,
            StoreError::Backend(_) => ErrorCode::DatabaseError,
        };
        Self::new(code, error.to_string()).with_source(error)
    }
}

/// Fields for a new user row
#[derive(Debug, Clone)]
pub struct CreateUserParams {
    /// Unique login name
    pub username: String,
    /// Authorization role
    pub role: Role,
    /// bcrypt hash
    pub hashed_password: String,
    /// Display name
    pub full_name: String,
    /// Contact address
    pub email: String,
}

/// Partial update; `None` leaves a column unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateUserParams {
    /// Row to update
    pub username: String,
    /// New bcrypt hash
    pub hashed_password: Option<String>,
    /// Set alongside `hashed_password`
    pub password_changed_at: Option<DateTime<Utc>>,
    /// New display name
    pub full_name: Option<String>,
    /// New contact address
    pub email: Option<String>,
    /// Email verification flag
    pub is_email_verified: Option<bool>,
}

/// User persistence
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a new user
    async fn create_user(&self, params: CreateUserParams) -> Result<User, StoreError>;

    /// Fetch a user by username
    async fn get_user(&self, username: &str) -> Result<User, StoreError>;

    /// Apply a partial update and return the updated row
    async fn update_user(&self, params: UpdateUserParams) -> Result<User, StoreError>;
}

/// Concurrent in-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<String, User>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// True when no users are stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, params: CreateUserParams) -> Result<User, StoreError> {
        match self.users.entry(params.username.clone()) {
            Entry::Occupied(_) => Err(StoreError::UniqueViolation(params.username)),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let user = User {
                    username: params.username,
                    role: params.role,
                    hashed_password: params.hashed_password,
                    full_name: params.full_name,
                    email: params.email,
                    is_email_verified: false,
                    password_changed_at: now,
                    created_at: now,
                };
                slot.insert(user.clone());
                tracing::debug!(username = %user.username, "User row inserted");
                Ok(user)
            }
        }
    }

    async fn get_user(&self, username: &str) -> Result<User, StoreError> {
        self.users
            .get(username)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound(username.to_owned()))
    }

    async fn update_user(&self, params: UpdateUserParams) -> Result<User, StoreError> {
        let mut entry = self
            .users
            .get_mut(&params.username)
            .ok_or_else(|| StoreError::NotFound(params.username.clone()))?;

        let user = entry.value_mut();
        if let Some(hashed_password) = params.hashed_password {
            user.hashed_password = hashed_password;
        }
        if let Some(changed_at) = params.password_changed_at {
            user.password_changed_at = changed_at;
        }
        if let Some(full_name) = params.full_name {
            user.full_name = full_name;
        }
        if let Some(email) = params.email {
            user.email = email;
        }
        if let Some(verified) = params.is_email_verified {
            user.is_email_verified = verified;
        }
        Ok(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(username: &str) -> CreateUserParams {
        CreateUserParams {
            username: username.into(),
            role: Role::Depositor,
            hashed_password: "hash".into(),
            full_name: "Alice Doe".into(),
            email: "alice@example.com".into(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemoryStore::new();
        let created = store.create_user(params("alice")).await.unwrap();
        assert!(!created.is_email_verified);

        let fetched = store.get_user("alice").await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let store = MemoryStore::new();
        store.create_user(params("alice")).await.unwrap();
        let err = store.create_user(params("alice")).await.unwrap_err();
        assert_eq!(err, StoreError::UniqueViolation("alice".into()));
        assert_eq!(AppError::from(err).code, ErrorCode::ResourceAlreadyExists);
    }

    #[tokio::test]
    async fn test_partial_update() {
        let store = MemoryStore::new();
        store.create_user(params("alice")).await.unwrap();

        let updated = store
            .update_user(UpdateUserParams {
                username: "alice".into(),
                full_name: Some("Alice Smith".into()),
                ..UpdateUserParams::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.full_name, "Alice Smith");
        assert_eq!(updated.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_missing_user() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.get_user("ghost").await,
            Err(StoreError::NotFound(_))
        ));
        let err = store
            .update_user(UpdateUserParams {
                username: "ghost".into(),
                ..UpdateUserParams::default()
            })
            .await
            .unwrap_err();
        assert_eq!(AppError::from(err).code, ErrorCode::ResourceNotFound);
    }
}
