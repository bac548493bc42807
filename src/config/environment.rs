// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses listen address, token maker selection, symmetric key and token lifetime
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration management for production deployment

use super::types::Environment;
use crate::constants::{defaults, env_keys};
use crate::errors::{AppError, AppResult};
use crate::token::{SealedMaker, TokenMakerKind};
use chrono::Duration;
use std::env;
use std::fmt::{self, Debug, Formatter};
use std::net::SocketAddr;

/// Symmetric key string that never appears in logs
#[derive(Clone, PartialEq, Eq)]
pub struct SymmetricKey(String);

impl SymmetricKey {
    /// Wrap a raw key
    #[must_use]
    pub const fn new(key: String) -> Self {
        Self(key)
    }

    /// Raw key, for handing to a token maker
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for SymmetricKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "SymmetricKey([REDACTED])")
    }
}

/// Token maker configuration
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Which maker to build
    pub maker: TokenMakerKind,
    /// Secret handed to the maker
    pub symmetric_key: SymmetricKey,
    /// Lifetime of issued access tokens
    pub access_token_duration: Duration,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Deployment environment
    pub environment: Environment,
    /// HTTP gateway listen address
    pub http_address: SocketAddr,
    /// Token maker settings
    pub token: TokenConfig,
}

impl ServerConfig {
    /// Load configuration from process environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `TOKEN_SYMMETRIC_KEY` is missing
    /// - any variable holds an unparseable value
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// Same as [`ServerConfig::from_env`]
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup(env_keys::ENVIRONMENT)
            .map(|s| Environment::from_env_value(&s))
            .unwrap_or_default();

        let http_address = lookup(env_keys::HTTP_ADDRESS)
            .unwrap_or_else(|| defaults::HTTP_ADDRESS.to_owned())
            .parse::<SocketAddr>()
            .map_err(|e| {
                AppError::config(format!("Invalid {} value: {e}", env_keys::HTTP_ADDRESS))
            })?;

        let maker = match lookup(env_keys::TOKEN_MAKER) {
            Some(raw) => raw.parse::<TokenMakerKind>().map_err(|e| {
                AppError::config(format!("Invalid {} value: {e}", env_keys::TOKEN_MAKER))
            })?,
            None => TokenMakerKind::default(),
        };

        let symmetric_key = lookup(env_keys::TOKEN_SYMMETRIC_KEY)
            .filter(|key| !key.is_empty())
            .map(SymmetricKey::new)
            .ok_or_else(|| AppError::config_missing(env_keys::TOKEN_SYMMETRIC_KEY))?;

        let minutes = match lookup(env_keys::ACCESS_TOKEN_DURATION_MINUTES) {
            Some(raw) => raw.trim().parse::<i64>().map_err(|e| {
                AppError::config(format!(
                    "Invalid {} value: {e}",
                    env_keys::ACCESS_TOKEN_DURATION_MINUTES
                ))
            })?,
            None => defaults::ACCESS_TOKEN_DURATION_MINUTES,
        };
        if minutes <= 0 {
            return Err(AppError::config(format!(
                "{} must be positive, got {minutes}",
                env_keys::ACCESS_TOKEN_DURATION_MINUTES
            )));
        }

        let config = Self {
            environment,
            http_address,
            token: TokenConfig {
                maker,
                symmetric_key,
                access_token_duration: Duration::minutes(minutes),
            },
        };
        config.warn_on_weak_settings();
        Ok(config)
    }

    fn warn_on_weak_settings(&self) {
        if self.token.maker == TokenMakerKind::Jwt && self.environment.is_production() {
            tracing::warn!(
                "JWT token maker exposes claims to token holders; prefer TOKEN_MAKER=sealed in production"
            );
        }
        if self.token.maker == TokenMakerKind::Sealed
            && self.token.symmetric_key.expose().len() != SealedMaker::KEY_SIZE
        {
            tracing::warn!(
                "{} must be exactly {} bytes for the sealed token maker",
                env_keys::TOKEN_SYMMETRIC_KEY,
                SealedMaker::KEY_SIZE
            );
        }
    }

    /// One-line-per-setting summary for the startup log, without secrets
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Transactions API Configuration:\n\
             - Environment: {}\n\
             - HTTP Address: {}\n\
             - Token Maker: {}\n\
             - Access Token Duration: {} minutes",
            self.environment,
            self.http_address,
            self.token.maker,
            self.token.access_token_duration.num_minutes(),
        )
    }
}
