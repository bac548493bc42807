// ABOUTME: Identity claim carried inside every access token
// ABOUTME: Immutable record of token id, username, role and validity window
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::clock::{Clock, SystemClock};
use super::errors::TokenError;
use super::id::{IdGenerator, SystemIdGenerator};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims embedded in a token
///
/// Fields are private so a payload can only be issued through [`Payload::new`]
/// (or [`Payload::issue`]) or decoded from an authenticated token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    id: Uuid,
    #[serde(rename = "username")]
    identity: String,
    role: String,
    issued_at: DateTime<Utc>,
    #[serde(rename = "expired_at")]
    expires_at: DateTime<Utc>,
}

impl Payload {
    /// Create a payload for `identity` valid for `duration` from now
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `identity` or `role` is empty, or `duration` is not positive
    /// - the random identifier source fails
    pub fn new(identity: &str, role: &str, duration: Duration) -> Result<Self, TokenError> {
        Self::issue(identity, role, duration, &SystemClock, &SystemIdGenerator::new())
    }

    /// Create a payload using explicit time and identifier sources
    ///
    /// # Errors
    ///
    /// Same as [`Payload::new`]
    pub fn issue(
        identity: &str,
        role: &str,
        duration: Duration,
        clock: &dyn Clock,
        ids: &dyn IdGenerator,
    ) -> Result<Self, TokenError> {
        if identity.is_empty() {
            return Err(TokenError::InvalidClaims("identity must not be empty".into()));
        }
        if role.is_empty() {
            return Err(TokenError::InvalidClaims("role must not be empty".into()));
        }
        if duration <= Duration::zero() {
            return Err(TokenError::InvalidClaims(format!(
                "duration must be positive, got {}s",
                duration.num_seconds()
            )));
        }

        let id = ids.generate()?;
        let issued_at = clock.now();
        let expires_at = issued_at
            .checked_add_signed(duration)
            .ok_or_else(|| TokenError::InvalidClaims("duration overflows the calendar".into()))?;

        Ok(Self {
            id,
            identity: identity.to_owned(),
            role: role.to_owned(),
            issued_at,
            expires_at,
        })
    }

    /// Unique token identifier
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Subject username
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Authorization role
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Issuance instant
    #[must_use]
    pub const fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Expiry instant
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Valid against the wall clock
    #[must_use]
    pub fn valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Valid iff `now <= expires_at`
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires_at
    }

    /// Expiry check producing the error kind makers return
    ///
    /// # Errors
    /// Returns [`TokenError::Expired`] when `now` is past `expires_at`
    pub fn validate_at(&self, now: DateTime<Utc>) -> Result<(), TokenError> {
        if self.is_valid_at(now) {
            Ok(())
        } else {
            Err(TokenError::Expired {
                expired_at: self.expires_at,
                checked_at: now,
            })
        }
    }

    /// Structural invariants of a decoded payload
    pub(crate) fn check_well_formed(&self) -> Result<(), TokenError> {
        if self.identity.is_empty() || self.role.is_empty() {
            return Err(TokenError::invalid("payload is missing identity or role"));
        }
        if self.expires_at <= self.issued_at {
            return Err(TokenError::invalid("payload expires before it was issued"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::clock::ManualClock;

    #[derive(Debug)]
    struct ExhaustedIds;

    impl IdGenerator for ExhaustedIds {
        fn generate(&self) -> Result<Uuid, TokenError> {
            Err(TokenError::IdentityGeneration("entropy exhausted".into()))
        }
    }

    #[test]
    fn test_new_payload_sets_window() {
        let clock = ManualClock::starting_now();
        let payload = Payload::issue(
            "alice",
            "depositor",
            Duration::minutes(1),
            &clock,
            &SystemIdGenerator::new(),
        )
        .unwrap();

        assert_eq!(payload.identity(), "alice");
        assert_eq!(payload.role(), "depositor");
        assert_eq!(payload.issued_at(), clock.now());
        assert_eq!(payload.expires_at(), clock.now() + Duration::minutes(1));
        assert!(payload.valid());
    }

    #[test]
    fn test_validity_boundary_is_sharp() {
        let clock = ManualClock::starting_now();
        let payload = Payload::issue(
            "alice",
            "depositor",
            Duration::minutes(1),
            &clock,
            &SystemIdGenerator::new(),
        )
        .unwrap();
        let expires_at = payload.expires_at();

        assert!(payload.is_valid_at(expires_at));
        assert!(payload.validate_at(expires_at).is_ok());
        assert!(!payload.is_valid_at(expires_at + Duration::nanoseconds(1)));
        assert!(payload
            .validate_at(expires_at + Duration::nanoseconds(1))
            .unwrap_err()
            .is_expired());
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert!(matches!(
            Payload::new("", "depositor", Duration::minutes(1)),
            Err(TokenError::InvalidClaims(_))
        ));
        assert!(matches!(
            Payload::new("alice", "", Duration::minutes(1)),
            Err(TokenError::InvalidClaims(_))
        ));
        assert!(matches!(
            Payload::new("alice", "depositor", Duration::zero()),
            Err(TokenError::InvalidClaims(_))
        ));
        assert!(matches!(
            Payload::new("alice", "depositor", Duration::seconds(-5)),
            Err(TokenError::InvalidClaims(_))
        ));
    }

    #[test]
    fn test_identity_generation_failure_is_propagated() {
        let result = Payload::issue(
            "alice",
            "depositor",
            Duration::minutes(1),
            &SystemClock,
            &ExhaustedIds,
        );
        assert!(matches!(result, Err(TokenError::IdentityGeneration(_))));
    }

    #[test]
    fn test_wire_field_names() {
        let payload = Payload::new("alice", "banker", Duration::minutes(5)).unwrap();
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["username"], "alice");
        assert_eq!(json["role"], "banker");
        assert!(json.get("expired_at").is_some());
        assert!(json.get("issued_at").is_some());
        assert_eq!(json["id"], payload.id().to_string());
    }
}
