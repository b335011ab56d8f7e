//! Deterministic key-resolver fakes
//!
//! Test doubles for the pipeline's key-resolution capability: a static
//! in-memory resolver and an always-failing one. Both count their
//! invocations so tests can assert that short-circuited stages never
//! reach key resolution.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use token_gate::{KeyResolutionError, KeyResolver, ResolvedKey, TokenMetadata};

use crate::crypto_fixtures::TestKeypair;

/// Key resolver backed by fixed in-memory maps.
///
/// Looks up by token `kid` first, then by declared audience, mirroring a
/// multi-tenant secrets repository.
#[derive(Default)]
pub struct StaticKeyResolver {
    by_key_id: HashMap<String, ResolvedKey>,
    by_audience: HashMap<String, ResolvedKey>,
    calls: AtomicUsize,
}

impl StaticKeyResolver {
    /// Create an empty resolver (every lookup fails with `NoSuchKey`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver serving one keypair under its `kid`.
    pub fn for_keypair(keypair: &TestKeypair) -> Self {
        Self::new().with_key(&keypair.key_id, keypair.resolved_key())
    }

    /// Register a key under a key ID.
    pub fn with_key(mut self, key_id: &str, key: ResolvedKey) -> Self {
        self.by_key_id.insert(key_id.to_string(), key);
        self
    }

    /// Register a key under an audience.
    pub fn with_audience_key(mut self, audience: &str, key: ResolvedKey) -> Self {
        self.by_audience.insert(audience.to_string(), key);
        self
    }

    /// How many times `resolve` has been invoked.
    pub fn resolve_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyResolver for StaticKeyResolver {
    async fn resolve(&self, metadata: &TokenMetadata) -> Result<ResolvedKey, KeyResolutionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(key) = metadata
            .key_id
            .as_deref()
            .and_then(|kid| self.by_key_id.get(kid))
        {
            return Ok(key.clone());
        }

        if let Some(key) = metadata
            .audience
            .as_deref()
            .and_then(|aud| self.by_audience.get(aud))
        {
            return Ok(key.clone());
        }

        Err(KeyResolutionError::NoSuchKey)
    }
}

/// Key resolver that always fails with a fixed error.
pub struct FailingKeyResolver {
    error: KeyResolutionError,
    calls: AtomicUsize,
}

impl FailingKeyResolver {
    /// Create a resolver that always returns the given error.
    pub fn new(error: KeyResolutionError) -> Self {
        Self {
            error,
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times `resolve` has been invoked.
    pub fn resolve_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyResolver for FailingKeyResolver {
    async fn resolve(&self, _metadata: &TokenMetadata) -> Result<ResolvedKey, KeyResolutionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata_with_kid(kid: &str) -> TokenMetadata {
        TokenMetadata {
            algorithm: "EdDSA".to_string(),
            key_id: Some(kid.to_string()),
            issuer: None,
            audience: None,
        }
    }

    #[tokio::test]
    async fn test_static_resolver_finds_key_by_kid() {
        let keypair = TestKeypair::new(1, "key-01");
        let resolver = StaticKeyResolver::for_keypair(&keypair);

        let result = resolver.resolve(&metadata_with_kid("key-01")).await;
        assert!(result.is_ok());
        assert_eq!(resolver.resolve_calls(), 1);
    }

    #[tokio::test]
    async fn test_static_resolver_finds_key_by_audience() {
        let keypair = TestKeypair::new(1, "key-01");
        let resolver =
            StaticKeyResolver::new().with_audience_key("tenant-a", keypair.resolved_key());

        let metadata = TokenMetadata {
            algorithm: "EdDSA".to_string(),
            key_id: None,
            issuer: None,
            audience: Some("tenant-a".to_string()),
        };
        assert!(resolver.resolve(&metadata).await.is_ok());
    }

    #[tokio::test]
    async fn test_static_resolver_unknown_key() {
        let resolver = StaticKeyResolver::new();

        let result = resolver.resolve(&metadata_with_kid("missing")).await;
        assert_eq!(result.err(), Some(KeyResolutionError::NoSuchKey));
    }

    #[tokio::test]
    async fn test_failing_resolver_counts_calls() {
        let resolver =
            FailingKeyResolver::new(KeyResolutionError::Unavailable("down".to_string()));

        let _ = resolver.resolve(&metadata_with_kid("any")).await;
        let _ = resolver.resolve(&metadata_with_kid("any")).await;
        assert_eq!(resolver.resolve_calls(), 2);
    }
}
