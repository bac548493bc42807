// ABOUTME: Token maker capability: issue and verify opaque bearer credentials
// ABOUTME: Signed (JWT HS256) and sealed (AES-256-GCM) variants chosen once by configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Access tokens
//!
//! Callers depend on the [`TokenMaker`] trait only. A concrete maker is picked
//! once at startup through [`TokenMakerKind`] and [`build_token_maker`], then
//! shared as `Arc<dyn TokenMaker>` across request handlers. Makers own their
//! secret key and hold no per-token state, so they are used concurrently
//! without locking.
//!
//! ```rust
//! use chrono::Duration;
//! use transactions_api::token::{build_token_maker, TokenMakerKind};
//!
//! let maker = build_token_maker(TokenMakerKind::Sealed, "12345678901234567890123456789012")?;
//! let (token, payload) = maker.create_token("alice", "depositor", Duration::minutes(15))?;
//! let verified = maker.verify_token(&token)?;
//! assert_eq!(verified.id(), payload.id());
//! # Ok::<(), transactions_api::token::TokenError>(())
//! ```

/// Time sources
pub mod clock;
/// Error taxonomy
pub mod errors;
/// Identifier generation
pub mod id;
/// Signed-token maker
pub mod jwt_maker;
/// Token claims
pub mod payload;
/// Sealed-token maker
pub mod sealed_maker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::TokenError;
pub use id::{IdGenerator, SystemIdGenerator};
pub use jwt_maker::JwtMaker;
pub use payload::Payload;
pub use sealed_maker::SealedMaker;

use chrono::Duration;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Create and verify access tokens
pub trait TokenMaker: Send + Sync + Debug {
    /// Issue a token for `identity` with `role`, valid for `duration`
    ///
    /// Returns the opaque token string and the payload it carries.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the payload cannot be built ([`TokenError::InvalidClaims`], [`TokenError::IdentityGeneration`])
    /// - encoding fails ([`TokenError::Encoding`], which carries the payload)
    fn create_token(
        &self,
        identity: &str,
        role: &str,
        duration: Duration,
    ) -> Result<(String, Payload), TokenError>;

    /// Authenticate `token` and return its payload
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidToken`] for malformed, forged or
    /// algorithm-mismatched tokens and [`TokenError::Expired`] for authentic
    /// tokens past their expiry.
    fn verify_token(&self, token: &str) -> Result<Payload, TokenError>;

    /// Which variant this maker implements
    fn kind(&self) -> TokenMakerKind;
}

/// Available token maker variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenMakerKind {
    /// JWT signed with HMAC-SHA256; claims are readable by holders
    Jwt,
    /// AES-256-GCM sealed blob; claims are confidential
    #[default]
    Sealed,
}

impl FromStr for TokenMakerKind {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jwt" | "signed" => Ok(Self::Jwt),
            "sealed" | "paseto" | "local" => Ok(Self::Sealed),
            other => Err(TokenError::InvalidKey(format!(
                "unknown token maker '{other}', expected 'jwt' or 'sealed'"
            ))),
        }
    }
}

impl Display for TokenMakerKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jwt => write!(f, "jwt"),
            Self::Sealed => write!(f, "sealed"),
        }
    }
}

/// Build the configured maker behind the capability trait
///
/// # Errors
/// Returns [`TokenError::InvalidKey`] if `secret` does not fit the variant
pub fn build_token_maker(
    kind: TokenMakerKind,
    secret: &str,
) -> Result<Arc<dyn TokenMaker>, TokenError> {
    let maker: Arc<dyn TokenMaker> = match kind {
        TokenMakerKind::Jwt => Arc::new(JwtMaker::new(secret)?),
        TokenMakerKind::Sealed => Arc::new(SealedMaker::new(secret)?),
    };
    tracing::info!(token_maker = %kind, "Token maker initialized");
    Ok(maker)
}

/// Generate a random alphanumeric secret suitable for either maker
#[must_use]
pub fn random_symmetric_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SealedMaker::KEY_SIZE)
        .map(char::from)
        .collect()
}

/// Secret bytes held by a maker, wiped on drop
#[derive(Clone)]
pub(crate) struct SecretKey(Zeroizing<Vec<u8>>);

impl SecretKey {
    pub(crate) fn new(secret: &str) -> Self {
        Self(Zeroizing::new(secret.as_bytes().to_vec()))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

impl Debug for SecretKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey([REDACTED; {}])", self.0.len())
    }
}
