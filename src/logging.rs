// ABOUTME: Tracing subscriber setup and structured audit events for authentication
// ABOUTME: Output format and filter come from the environment; secrets never reach a log line
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Logging
//!
//! [`LoggingConfig::from_env`] reads `RUST_LOG`, `LOG_FORMAT` and
//! `ENVIRONMENT`; [`LoggingConfig::init`] installs a global subscriber.
//! [`AuditLog`] emits the authentication events operators alert on, with a
//! fixed field vocabulary (`audit.event`, `audit.outcome`, `user.name`).

use crate::config::Environment;
use crate::constants::service_names;
use anyhow::{Context, Result};
use std::env;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// Dependencies that are chatty at `info`
const QUIET_TARGETS: [&str; 3] = ["hyper=warn", "h2=warn", "tower=warn"];

/// Log line encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line human output
    #[default]
    Pretty,
    /// One line per event
    Compact,
    /// Newline-delimited JSON for collectors
    Json,
}

impl LogFormat {
    /// Parse `LOG_FORMAT`; anything unrecognised is [`LogFormat::Pretty`]
    #[must_use]
    pub fn from_env_value(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

/// Subscriber settings
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub directive: String,
    /// Line encoding
    pub format: LogFormat,
    /// Emit file and line of each event
    pub with_location: bool,
    /// Emit span open/close events
    pub with_spans: bool,
    /// Deployment environment, logged at startup
    pub environment: Environment,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directive: "info".to_owned(),
            format: LogFormat::default(),
            with_location: false,
            with_spans: false,
            environment: Environment::default(),
        }
    }
}

impl LoggingConfig {
    /// Read settings from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .map(|raw| Environment::from_env_value(&raw))
            .unwrap_or_default();
        let verbose = environment.is_production();

        Self {
            directive: lookup("RUST_LOG").unwrap_or_else(|| "info".to_owned()),
            format: match lookup("LOG_FORMAT") {
                Some(raw) => LogFormat::from_env_value(&raw),
                None if verbose => LogFormat::Json,
                None => LogFormat::Pretty,
            },
            with_location: verbose || lookup("LOG_INCLUDE_LOCATION").is_some(),
            with_spans: lookup("LOG_INCLUDE_SPANS").is_some(),
            environment,
        }
    }

    fn filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::try_new(&self.directive).unwrap_or_else(|e| {
            eprintln!("Ignoring invalid log directive '{}': {e}", self.directive);
            EnvFilter::new("info")
        });
        for target in QUIET_TARGETS {
            if let Ok(directive) = target.parse() {
                filter = filter.add_directive(directive);
            }
        }
        filter
    }

    fn output_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let spans = if self.with_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };
        let base = fmt::layer()
            .with_file(self.with_location)
            .with_line_number(self.with_location)
            .with_span_events(spans);

        match self.format {
            LogFormat::Pretty => base.boxed(),
            LogFormat::Compact => base.compact().with_target(false).boxed(),
            LogFormat::Json => base.json().with_current_span(true).boxed(),
        }
    }

    /// Install the global subscriber
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> Result<()> {
        tracing_subscriber::registry()
            .with(self.output_layer())
            .with(self.filter())
            .try_init()
            .context("cannot install tracing subscriber")?;

        tracing::info!(
            service.name = service_names::TRANSACTIONS_API,
            service.version = env!("CARGO_PKG_VERSION"),
            environment = %self.environment,
            log.directive = %self.directive,
            log.format = ?self.format,
            "Logging initialized"
        );
        Ok(())
    }
}

/// Initialize logging from the process environment
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init_from_env() -> Result<()> {
    LoggingConfig::from_env().init()
}

/// Structured authentication audit events
pub struct AuditLog;

impl AuditLog {
    /// A password login finished
    pub fn login_attempt(username: &str, failure: Option<&str>) {
        match failure {
            None => tracing::info!(
                audit.event = "login",
                audit.outcome = "success",
                user.name = %username,
                "Login succeeded"
            ),
            Some(reason) => tracing::warn!(
                audit.event = "login",
                audit.outcome = "failure",
                audit.reason = %reason,
                user.name = %username,
                "Login failed"
            ),
        }
    }

    /// A presented access token did not verify; `kind` is the token error kind
    pub fn token_rejected(kind: &str) {
        tracing::warn!(
            audit.event = "access_token_rejected",
            audit.outcome = "failure",
            audit.reason = %kind,
            "Access token rejected"
        );
    }

    /// An authenticated caller attempted something its role forbids
    pub fn policy_violation(event: &str, username: &str, target: &str) {
        tracing::warn!(
            audit.event = %event,
            audit.outcome = "denied",
            audit.target = %target,
            user.name = %username,
            "Authorization denied"
        );
    }
}
