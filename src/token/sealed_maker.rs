// ABOUTME: Sealed-token maker encrypting payloads with AES-256-GCM
// ABOUTME: Claims are confidential and tamper-evident; the version header is bound as associated data
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Sealed token maker
//!
//! Wire format: `v1.local.` followed by base64url (no padding) of
//! `nonce (12 bytes) || ciphertext || tag (16 bytes)`. The header is fed to
//! the cipher as associated data, so a token cannot be replayed under a
//! different header without failing authentication.

use super::clock::{Clock, SystemClock};
use super::errors::TokenError;
use super::id::{IdGenerator, SystemIdGenerator};
use super::payload::Payload;
use super::{SecretKey, TokenMaker, TokenMakerKind};
use aes_gcm::aead::{Aead, KeyInit, Payload as AeadPayload};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Duration;
use ring::rand::{SecureRandom, SystemRandom};
use std::sync::Arc;

const HEADER: &str = "v1.local.";
const NONCE_SIZE: usize = 12;
const TAG_SIZE: usize = 16;

/// AES-256-GCM sealed token maker
#[derive(Debug, Clone)]
pub struct SealedMaker {
    key: SecretKey,
    rng: SystemRandom,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl SealedMaker {
    /// Required key length in bytes
    pub const KEY_SIZE: usize = 32;

    /// Create a maker keyed with `symmetric_key`
    ///
    /// # Errors
    /// Returns [`TokenError::InvalidKey`] unless `symmetric_key` is exactly [`Self::KEY_SIZE`] bytes
    pub fn new(symmetric_key: &str) -> Result<Self, TokenError> {
        if symmetric_key.len() != Self::KEY_SIZE {
            return Err(TokenError::InvalidKey(format!(
                "invalid key size: must be exactly {} bytes, got {}",
                Self::KEY_SIZE,
                symmetric_key.len()
            )));
        }

        Ok(Self {
            key: SecretKey::new(symmetric_key),
            rng: SystemRandom::new(),
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

    fn cipher(&self) -> Result<Aes256Gcm, String> {
        debug_assert_eq!(self.key.len(), Self::KEY_SIZE);
        Aes256Gcm::new_from_slice(self.key.as_bytes()).map_err(|e| e.to_string())
    }

    fn seal(&self, payload: &Payload) -> Result<String, String> {
        let plaintext =
            serde_json::to_vec(payload).map_err(|e| format!("payload serialization failed: {e}"))?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| "system RNG failure while generating nonce".to_owned())?;

        let ciphertext = self
            .cipher()?
            .encrypt(
                Nonce::from_slice(&nonce_bytes),
                AeadPayload {
                    msg: &plaintext,
                    aad: HEADER.as_bytes(),
                },
            )
            .map_err(|e| format!("encryption failed: {e}"))?;

        let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);

        Ok(format!("{HEADER}{}", URL_SAFE_NO_PAD.encode(sealed)))
    }

    fn open(&self, token: &str) -> Result<Payload, TokenError> {
        let body = token
            .strip_prefix(HEADER)
            .ok_or_else(|| TokenError::invalid("unsupported token header"))?;

        let sealed = URL_SAFE_NO_PAD
            .decode(body)
            .map_err(|e| TokenError::invalid(format!("token contains invalid base64: {e}")))?;

        if sealed.len() < NONCE_SIZE + TAG_SIZE {
            return Err(TokenError::invalid("token is too short"));
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_SIZE);

        let plaintext = self
            .cipher()
            .map_err(TokenError::invalid)?
            .decrypt(
                Nonce::from_slice(nonce),
                AeadPayload {
                    msg: ciphertext,
                    aad: HEADER.as_bytes(),
                },
            )
            .map_err(|_| TokenError::invalid("token authentication failed"))?;

        serde_json::from_slice(&plaintext)
            .map_err(|e| TokenError::invalid(format!("token contains invalid JSON: {e}")))
    }
}

impl TokenMaker for SealedMaker {
    fn create_token(
        &self,
        identity: &str,
        role: &str,
        duration: Duration,
    ) -> Result<(String, Payload), TokenError> {
        let payload = Payload::issue(identity, role, duration, self.clock.as_ref(), self.ids.as_ref())?;

        match self.seal(&payload) {
            Ok(token) => Ok((token, payload)),
            Err(reason) => Err(TokenError::encoding(reason, payload)),
        }
    }

    fn verify_token(&self, token: &str) -> Result<Payload, TokenError> {
        let payload = self.open(token).inspect_err(|e| {
            tracing::debug!(error = %e, "Sealed token verification failed");
        })?;

        payload.check_well_formed()?;
        payload.validate_at(self.clock.now())?;
        Ok(payload)
    }

    fn kind(&self) -> TokenMakerKind {
        TokenMakerKind::Sealed
    }
}
