// ABOUTME: Error taxonomy for token issuance and verification
// ABOUTME: Separates authentication failures from expiry so callers can react differently
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::payload::Payload;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

const SECONDS_PER_HOUR: i64 = 3600;

/// Convert a duration to a human-readable format
fn humanize_duration(duration: Duration) -> String {
    let total_secs = duration.num_seconds().abs();
    let hours = total_secs / SECONDS_PER_HOUR;
    let minutes = (total_secs % SECONDS_PER_HOUR) / 60;

    if hours > 0 {
        format!("{hours} hours")
    } else if minutes > 0 {
        format!("{minutes} minutes")
    } else {
        format!("{total_secs} seconds")
    }
}

/// Errors produced by payload construction and token makers
#[derive(Debug, Error)]
pub enum TokenError {
    /// The random identifier source failed; fatal to the current call
    #[error("cannot generate token identifier: {0}")]
    IdentityGeneration(String),

    /// Creation inputs were rejected before any identifier was generated
    #[error("invalid token claims: {0}")]
    InvalidClaims(String),

    /// Malformed, unauthenticated or algorithm-mismatched token
    #[error("token is invalid: {reason}")]
    InvalidToken {
        /// Diagnostic detail, for server-side logs only
        reason: String,
    },

    /// Token authenticated but is past its validity window
    #[error("token has expired {} ago at {}", humanize_duration(*checked_at - *expired_at), expired_at.format("%Y-%m-%d %H:%M:%S UTC"))]
    Expired {
        /// When the token expired
        expired_at: DateTime<Utc>,
        /// Clock reading used for the check
        checked_at: DateTime<Utc>,
    },

    /// Secret key rejected at maker construction
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Serialization or encryption failed after the payload was built
    #[error("cannot encode token: {reason}")]
    Encoding {
        /// Underlying failure
        reason: String,
        /// Payload that was being encoded
        payload: Box<Payload>,
    },
}

impl TokenError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidToken {
            reason: reason.into(),
        }
    }

    pub(crate) fn encoding(reason: impl Into<String>, payload: Payload) -> Self {
        Self::Encoding {
            reason: reason.into(),
            payload: Box::new(payload),
        }
    }

    /// Payload built before the failure, if any
    #[must_use]
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Self::Encoding { payload, .. } => Some(payload),
            _ => None,
        }
    }

    /// True for `InvalidToken`
    #[must_use]
    pub const fn is_invalid(&self) -> bool {
        matches!(self, Self::InvalidToken { .. })
    }

    /// True for `Expired`
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        matches!(self, Self::Expired { .. })
    }

    /// Stable short name used in structured logs
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::IdentityGeneration(_) => "identity_generation",
            Self::InvalidClaims(_) => "invalid_claims",
            Self::InvalidToken { .. } => "invalid_token",
            Self::Expired { .. } => "expired",
            Self::InvalidKey(_) => "invalid_key",
            Self::Encoding { .. } => "encoding",
        }
    }
}
