// ABOUTME: Application-level error type with stable codes and HTTP response rendering
// ABOUTME: RPC handlers return AppResult; token failures collapse into a single unauthenticated code
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Application errors
//!
//! Every RPC and gateway handler fails with an [`AppError`]. The [`ErrorCode`]
//! is the contract with clients: it fixes the HTTP status and the `code`
//! string in the JSON body. `message` is for humans, `details` for
//! per-field validation output.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Client-visible failure categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No credential was presented
    AuthRequired,
    /// A credential was presented and rejected
    AuthInvalid,
    /// Caller is known but may not do this
    PermissionDenied,
    /// Request fields failed validation
    InvalidInput,
    /// Looked-up entity is absent
    ResourceNotFound,
    /// Entity with the same key exists
    ResourceAlreadyExists,
    /// Configuration value unusable
    ConfigError,
    /// Configuration value absent
    ConfigMissing,
    /// Unexpected server-side failure
    InternalError,
    /// Persistence layer failure
    DatabaseError,
}

impl ErrorCode {
    /// HTTP status returned by the gateway
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::AuthRequired | Self::AuthInvalid => StatusCode::UNAUTHORIZED,
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::InvalidInput => StatusCode::BAD_REQUEST,
            Self::ResourceNotFound => StatusCode::NOT_FOUND,
            Self::ResourceAlreadyExists => StatusCode::CONFLICT,
            Self::ConfigError | Self::ConfigMissing | Self::InternalError | Self::DatabaseError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Numeric form of [`ErrorCode::status`]
    #[must_use]
    pub const fn http_status(self) -> u16 {
        self.status().as_u16()
    }

    const fn summary(self) -> &'static str {
        match self {
            Self::AuthRequired => "unauthenticated",
            Self::AuthInvalid => "authentication failed",
            Self::PermissionDenied => "permission denied",
            Self::InvalidInput => "invalid argument",
            Self::ResourceNotFound => "not found",
            Self::ResourceAlreadyExists => "already exists",
            Self::ConfigError | Self::ConfigMissing => "misconfigured",
            Self::InternalError => "internal",
            Self::DatabaseError => "storage failure",
        }
    }
}

/// Error returned by RPC handlers
#[derive(Debug, Error)]
pub struct AppError {
    /// Failure category
    pub code: ErrorCode,
    /// Message sent to the client
    pub message: String,
    /// Structured detail, `Null` when absent
    pub details: Value,
    /// Underlying cause, kept server-side
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl AppError {
    /// Error with `code` and `message` and nothing attached
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: Value::Null,
            source: None,
        }
    }

    /// Attach structured details
    #[must_use]
    pub fn with_details(self, details: Value) -> Self {
        Self { details, ..self }
    }

    /// Attach the underlying cause
    #[must_use]
    pub fn with_source(self, source: impl StdError + Send + Sync + 'static) -> Self {
        Self {
            source: Some(Box::new(source)),
            ..self
        }
    }

    /// HTTP status for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// No credential presented
    #[must_use]
    pub fn auth_required() -> Self {
        Self::new(ErrorCode::AuthRequired, "missing authorization header")
    }

    /// Credential rejected
    pub fn auth_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthInvalid, message)
    }

    /// Caller lacks permission
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PermissionDenied, message)
    }

    /// Request failed validation
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Unexpected failure
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Unusable configuration value
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Required environment variable `key` is unset
    #[must_use]
    pub fn config_missing(key: &str) -> Self {
        Self::new(ErrorCode::ConfigMissing, format!("{key} must be set"))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.code.summary(), self.code.http_status(), self.message)
    }
}

/// Result alias used by RPC handlers
pub type AppResult<T> = Result<T, AppError>;

/// JSON body of a failed gateway response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Failure description
    pub error: ErrorBody,
}

/// Inner object of [`ErrorResponse`]
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable code
    pub code: ErrorCode,
    /// Client message
    pub message: String,
    /// Per-field details, omitted when empty
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub details: Value,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        let AppError {
            code,
            message,
            details,
            ..
        } = error;
        Self {
            error: ErrorBody {
                code,
                message,
                details,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.code.status();
        if status.is_server_error() {
            // Causes stay in the log; the client only sees the message.
            tracing::error!(code = ?self.code, error = %self, cause = ?self.source, "RPC failed");
        }
        (status, Json(ErrorResponse::from(self))).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        let message = format!("{error:#}");
        Self::internal(message)
    }
}
