// ABOUTME: Token identifier generation backed by the operating system RNG
// ABOUTME: Surfaces RNG failure as an error instead of panicking inside the uuid crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::errors::TokenError;
use ring::rand::{SecureRandom, SystemRandom};
use std::fmt::Debug;
use uuid::{Builder, Uuid};

/// Source of unique token identifiers
pub trait IdGenerator: Send + Sync + Debug {
    /// Produce a fresh identifier
    ///
    /// # Errors
    /// Returns [`TokenError::IdentityGeneration`] when the random source is unavailable
    fn generate(&self) -> Result<Uuid, TokenError>;
}

/// Random 128-bit identifiers laid out as UUID v4
#[derive(Debug, Clone)]
pub struct SystemIdGenerator {
    rng: SystemRandom,
}

impl SystemIdGenerator {
    /// Create a generator over the system RNG
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: SystemRandom::new(),
        }
    }
}

impl Default for SystemIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SystemIdGenerator {
    fn generate(&self) -> Result<Uuid, TokenError> {
        let mut bytes = [0u8; 16];
        self.rng.fill(&mut bytes).map_err(|e| {
            tracing::error!("System RNG failure while generating token id: {e}");
            TokenError::IdentityGeneration("system RNG failure".into())
        })?;
        Ok(Builder::from_random_bytes(bytes).into_uuid())
    }
}
