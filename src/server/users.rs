// ABOUTME: User account RPCs: login, sign-up and profile update
// ABOUTME: Login issues access tokens; sign-up enqueues the verification email task
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::Server;
use crate::errors::{AppError, AppResult};
use crate::logging::AuditLog;
use crate::models::{Role, UserInfo};
use crate::password::{check_password, hash_password_with_cost};
use crate::store::{CreateUserParams, UpdateUserParams};
use crate::validation::{
    validate_email, validate_full_name, validate_password, validate_username, Violations,
};
use crate::worker::{PayloadSendVerifyEmail, TaskOptions};
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Credentials for `login_user`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginUserRequest {
    /// Account name
    pub username: String,
    /// Plaintext password
    pub password: String,
}

/// Result of a successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginUserResponse {
    /// Signed-in user
    pub user: UserInfo,
    /// Bearer credential for subsequent calls
    pub access_token: String,
    /// When `access_token` stops verifying
    pub access_token_expires_at: DateTime<Utc>,
}

/// Sign-up fields for `create_user`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    /// Desired account name
    pub username: String,
    /// Display name
    pub full_name: String,
    /// Contact address
    pub email: String,
    /// Plaintext password
    pub password: String,
}

/// Newly created account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserResponse {
    /// Created user
    pub user: UserInfo,
}

/// Partial profile update for `update_user`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    /// Account to update
    pub username: String,
    /// New display name
    #[serde(default)]
    pub full_name: Option<String>,
    /// New contact address
    #[serde(default)]
    pub email: Option<String>,
    /// New plaintext password
    #[serde(default)]
    pub password: Option<String>,
}

/// Updated account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserResponse {
    /// User after the update
    pub user: UserInfo,
}

impl LoginUserRequest {
    fn validate(&self) -> AppResult<()> {
        let mut violations = Violations::new();
        violations.check("username", validate_username(&self.username));
        violations.check("password", validate_password(&self.password));
        violations.into_result()
    }
}

impl CreateUserRequest {
    fn validate(&self) -> AppResult<()> {
        let mut violations = Violations::new();
        violations.check("username", validate_username(&self.username));
        violations.check("full_name", validate_full_name(&self.full_name));
        violations.check("email", validate_email(&self.email));
        violations.check("password", validate_password(&self.password));
        violations.into_result()
    }
}

impl UpdateUserRequest {
    fn validate(&self) -> AppResult<()> {
        let mut violations = Violations::new();
        violations.check("username", validate_username(&self.username));
        if let Some(full_name) = &self.full_name {
            violations.check("full_name", validate_full_name(full_name));
        }
        if let Some(email) = &self.email {
            violations.check("email", validate_email(email));
        }
        if let Some(password) = &self.password {
            violations.check("password", validate_password(password));
        }
        violations.into_result()
    }
}

impl Server {
    async fn hash(&self, password: String) -> AppResult<String> {
        let cost = self.password_cost;
        tokio::task::spawn_blocking(move || hash_password_with_cost(&password, cost))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
    }

    async fn verify(&self, password: String, hashed_password: String) -> AppResult<()> {
        tokio::task::spawn_blocking(move || check_password(&password, &hashed_password))
            .await
            .map_err(|e| AppError::internal(format!("Password check task failed: {e}")))?
    }

    /// Check credentials and issue an access token
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the request fails validation (`INVALID_INPUT`)
    /// - the user does not exist (`RESOURCE_NOT_FOUND`)
    /// - the password does not match (`AUTH_INVALID`)
    /// - the token cannot be issued (`INTERNAL_ERROR`)
    #[tracing::instrument(skip(self, request), fields(username = %request.username))]
    pub async fn login_user(&self, request: LoginUserRequest) -> AppResult<LoginUserResponse> {
        request.validate()?;

        let user = self.store.get_user(&request.username).await?;

        if let Err(e) = self
            .verify(request.password, user.hashed_password.clone())
            .await
        {
            AuditLog::login_attempt(&user.username, Some(&e.message));
            return Err(e);
        }

        let (access_token, payload) = self
            .token_maker
            .create_token(
                &user.username,
                user.role.as_str(),
                self.config.token.access_token_duration,
            )
            .map_err(|e| {
                AppError::internal("failed to create access token").with_source(e)
            })?;

        AuditLog::login_attempt(&user.username, None);

        Ok(LoginUserResponse {
            user: UserInfo::from(&user),
            access_token,
            access_token_expires_at: payload.expires_at(),
        })
    }

    /// Register a depositor account
    ///
    /// When a task distributor is configured, a verification email task is
    /// enqueued for the new user.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the request fails validation (`INVALID_INPUT`)
    /// - the username is taken (`RESOURCE_ALREADY_EXISTS`)
    /// - hashing or task distribution fails (`INTERNAL_ERROR`)
    #[tracing::instrument(skip(self, request), fields(username = %request.username))]
    pub async fn create_user(&self, request: CreateUserRequest) -> AppResult<CreateUserResponse> {
        request.validate()?;

        let hashed_password = self.hash(request.password).await?;
        let user = self
            .store
            .create_user(CreateUserParams {
                username: request.username,
                role: Role::Depositor,
                hashed_password,
                full_name: request.full_name,
                email: request.email,
            })
            .await?;

        if let Some(distributor) = &self.task_distributor {
            let payload = PayloadSendVerifyEmail {
                username: user.username.clone(),
            };
            distributor
                .distribute_task_send_verify_email(&payload, TaskOptions::send_verify_email())
                .await
                .map_err(|e| {
                    AppError::internal("failed to distribute task to send verify email")
                        .with_source(e)
                })?;
        }

        tracing::info!(username = %user.username, role = %user.role, "User created");
        Ok(CreateUserResponse {
            user: UserInfo::from(&user),
        })
    }

    /// Update profile fields of an existing account
    ///
    /// Bankers may update anyone; depositors only themselves. A new password
    /// is re-hashed and bumps `password_changed_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - authorization fails (`AUTH_REQUIRED`, `AUTH_INVALID`, `PERMISSION_DENIED`)
    /// - the request fails validation (`INVALID_INPUT`)
    /// - the user does not exist (`RESOURCE_NOT_FOUND`)
    #[tracing::instrument(skip(self, headers, request), fields(username = %request.username))]
    pub async fn update_user(
        &self,
        headers: &HeaderMap,
        request: UpdateUserRequest,
    ) -> AppResult<UpdateUserResponse> {
        let auth = self.authorize_user(headers, &[Role::Banker, Role::Depositor])?;

        request.validate()?;

        if auth.role() != Role::Banker.as_str() && auth.identity() != request.username {
            AuditLog::policy_violation("cross_account_update", auth.identity(), &request.username);
            return Err(AppError::permission_denied(
                "cannot update other user's info",
            ));
        }

        let (hashed_password, password_changed_at) = match request.password {
            Some(password) => (Some(self.hash(password).await?), Some(Utc::now())),
            None => (None, None),
        };

        let user = self
            .store
            .update_user(UpdateUserParams {
                username: request.username,
                hashed_password,
                password_changed_at,
                full_name: request.full_name,
                email: request.email,
                is_email_verified: None,
            })
            .await?;

        Ok(UpdateUserResponse {
            user: UserInfo::from(&user),
        })
    }
}
