//! The key-resolution capability consumed by the token verifier.
//!
//! Key lookup is owned by the caller (typically backed by a secrets
//! repository or a JWKS endpoint) and passed in per validation call. The
//! pipeline hands the resolver the *unverified* characteristics of the
//! presented token and receives the key material needed to check its
//! signature, supporting multiple signing keys and tenants without the
//! pipeline itself knowing any key material.

use std::fmt;

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey};
use thiserror::Error;

/// Unverified token characteristics used to select a verification key.
///
/// Peeked from the token before signature verification, so none of these
/// values may be trusted for anything other than key lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    /// The signing algorithm declared in the token header.
    pub algorithm: String,

    /// Key ID (`kid`) from the token header, if present.
    pub key_id: Option<String>,

    /// Issuer (`iss`) claim as declared in the undecoded payload.
    pub issuer: Option<String>,

    /// Audience (`aud`) claim as declared in the undecoded payload. Only
    /// string-valued audiences are surfaced.
    pub audience: Option<String>,
}

/// Key material returned by a [`KeyResolver`].
#[derive(Clone)]
pub struct ResolvedKey {
    /// The verification key.
    pub key: DecodingKey,

    /// The only algorithm the verifier will accept for this key. Pinning
    /// the algorithm to the key defeats algorithm-confusion attacks.
    pub algorithm: Algorithm,
}

impl ResolvedKey {
    /// Pair a verification key with the algorithm it is valid for.
    #[must_use]
    pub fn new(key: DecodingKey, algorithm: Algorithm) -> Self {
        Self { key, algorithm }
    }
}

// Key material is kept out of Debug output.
impl fmt::Debug for ResolvedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedKey")
            .field("key", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

/// Failure reported by a [`KeyResolver`].
///
/// The pipeline collapses every resolver failure into the opaque
/// validation failure so callers cannot probe which keys exist.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyResolutionError {
    /// No key is associated with the presented token's metadata.
    #[error("no key associated with token")]
    NoSuchKey,

    /// The key source could not be reached or answered abnormally.
    #[error("key source unavailable: {0}")]
    Unavailable(String),
}

/// Capability that maps token metadata to verification key material.
///
/// Implementations must be safe for concurrent use; the pipeline invokes
/// the resolver once per validation call and never stores it.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    /// Resolve the verification key for a token with the given metadata.
    ///
    /// # Errors
    ///
    /// Returns [`KeyResolutionError::NoSuchKey`] when no key is associated
    /// with the metadata, or [`KeyResolutionError::Unavailable`] when the
    /// backing key source cannot answer.
    async fn resolve(&self, metadata: &TokenMetadata) -> Result<ResolvedKey, KeyResolutionError>;
}
