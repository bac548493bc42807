// ABOUTME: System-wide constants and configuration defaults for the transactions API
// ABOUTME: Environment variable names, token defaults, roles and task queue settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Constants Module

/// Service identification
pub mod service_names {
    /// Name used in logs and the health endpoint
    pub const TRANSACTIONS_API: &str = "transactions-api";
}

/// Environment variable names read by the configuration loader
pub mod env_keys {
    /// Deployment environment
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    /// HTTP listen address
    pub const HTTP_ADDRESS: &str = "HTTP_ADDRESS";
    /// Token maker variant (`jwt` or `sealed`)
    pub const TOKEN_MAKER: &str = "TOKEN_MAKER";
    /// Symmetric secret used by the token maker
    pub const TOKEN_SYMMETRIC_KEY: &str = "TOKEN_SYMMETRIC_KEY";
    /// Access token lifetime in minutes
    pub const ACCESS_TOKEN_DURATION_MINUTES: &str = "ACCESS_TOKEN_DURATION_MINUTES";
}

/// Default configuration values
pub mod defaults {
    /// Default HTTP listen address
    pub const HTTP_ADDRESS: &str = "0.0.0.0:8080";
    /// Default access token lifetime in minutes
    pub const ACCESS_TOKEN_DURATION_MINUTES: i64 = 15;
}

/// Request authorization
pub mod auth {
    /// Metadata key carrying the bearer credential
    pub const AUTHORIZATION_HEADER: &str = "authorization";
    /// Accepted authorization scheme, compared case-insensitively
    pub const AUTHORIZATION_BEARER: &str = "bearer";
}

/// Background task routing
pub mod tasks {
    /// Task type for the verification email
    pub const SEND_VERIFY_EMAIL: &str = "task:send_verify_email";
    /// Queue for tasks that must run promptly
    pub const QUEUE_CRITICAL: &str = "critical";
    /// Queue for everything else
    pub const QUEUE_DEFAULT: &str = "default";
    /// Retry budget for the verification email task
    pub const VERIFY_EMAIL_MAX_RETRY: u32 = 10;
    /// Delay before the verification email task becomes runnable
    pub const VERIFY_EMAIL_DELAY_SECS: i64 = 10;
}

/// Request field limits
pub mod limits {
    /// Username length bounds
    pub const USERNAME_MIN: usize = 3;
    /// Username length bounds
    pub const USERNAME_MAX: usize = 100;
    /// Full name length bounds
    pub const FULL_NAME_MIN: usize = 3;
    /// Full name length bounds
    pub const FULL_NAME_MAX: usize = 100;
    /// Password length bounds
    pub const PASSWORD_MIN: usize = 6;
    /// Password length bounds
    pub const PASSWORD_MAX: usize = 100;
    /// Email length bounds
    pub const EMAIL_MIN: usize = 3;
    /// Email length bounds
    pub const EMAIL_MAX: usize = 200;
}
