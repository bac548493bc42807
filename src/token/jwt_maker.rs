// ABOUTME: Signed-token maker producing HS256 JSON Web Tokens
// ABOUTME: Pins the algorithm on verification and performs its own expiry check against the maker clock
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! JWT maker
//!
//! Claims are signed, not encrypted: anyone holding the token can read the
//! payload. The verifier accepts `HS256` only; tokens whose header names any
//! other algorithm are rejected before the signature is considered.

use super::clock::{Clock, SystemClock};
use super::errors::TokenError;
use super::id::{IdGenerator, SystemIdGenerator};
use super::payload::Payload;
use super::{SecretKey, TokenMaker, TokenMakerKind};
use chrono::Duration;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;

/// HMAC-SHA256 JWT maker
#[derive(Debug, Clone)]
pub struct JwtMaker {
    secret: SecretKey,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl JwtMaker {
    /// Shortest accepted secret, in bytes
    pub const MIN_SECRET_SIZE: usize = 32;

    const ALGORITHM: Algorithm = Algorithm::HS256;

    /// Create a maker keyed with `secret`
    ///
    /// # Errors
    /// Returns [`TokenError::InvalidKey`] if `secret` is shorter than [`Self::MIN_SECRET_SIZE`] bytes
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        if secret.len() < Self::MIN_SECRET_SIZE {
            return Err(TokenError::InvalidKey(format!(
                "invalid key size: must be at least {} bytes, got {}",
                Self::MIN_SECRET_SIZE,
                secret.len()
            )));
        }

        Ok(Self {
            secret: SecretKey::new(secret),
            clock: Arc::new(SystemClock),
            ids: Arc::new(SystemIdGenerator::new()),
        })
    }

    /// Replace the time source
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the identifier source
    #[must_use]
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Self::ALGORITHM);
        // Expiry is checked against the maker clock once the signature is trusted
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();
        validation
    }

    /// Convert JWT library errors into the invalid-token kind
    fn convert_jwt_error(e: &JwtError) -> TokenError {
        let reason = match e.kind() {
            ErrorKind::InvalidSignature => "signature verification failed".to_owned(),
            ErrorKind::InvalidAlgorithm => "token algorithm does not match maker".to_owned(),
            ErrorKind::InvalidToken => "token format is invalid".to_owned(),
            ErrorKind::Base64(base64_err) => format!("token contains invalid base64: {base64_err}"),
            ErrorKind::Json(json_err) => format!("token contains invalid JSON: {json_err}"),
            ErrorKind::Utf8(utf8_err) => format!("token contains invalid UTF-8: {utf8_err}"),
            _ => format!("token validation failed: {e}"),
        };
        tracing::debug!(error = ?e, "JWT verification failed");
        TokenError::invalid(reason)
    }
}

impl TokenMaker for JwtMaker {
    fn create_token(
        &self,
        identity: &str,
        role: &str,
        duration: Duration,
    ) -> Result<(String, Payload), TokenError> {
        let payload = Payload::issue(identity, role, duration, self.clock.as_ref(), self.ids.as_ref())?;

        let header = Header::new(Self::ALGORITHM);
        match encode(&header, &payload, &EncodingKey::from_secret(self.secret.as_bytes())) {
            Ok(token) => Ok((token, payload)),
            Err(e) => Err(TokenError::encoding(e.to_string(), payload)),
        }
    }

    fn verify_token(&self, token: &str) -> Result<Payload, TokenError> {
        let payload = decode::<Payload>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Self::validation(),
        )
        .map(|data| data.claims)
        .map_err(|e| Self::convert_jwt_error(&e))?;

        payload.check_well_formed()?;
        payload.validate_at(self.clock.now())?;
        Ok(payload)
    }

    fn kind(&self) -> TokenMakerKind {
        TokenMakerKind::Jwt
    }
}
