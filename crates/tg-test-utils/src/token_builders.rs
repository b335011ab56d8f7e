//! Builder patterns for test token construction
//!
//! Provides a fluent API for creating signed test tokens with arbitrary
//! claim shapes, including the malformed shapes the pipeline must reject.

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, Header};
use serde_json::{json, Map, Value};

use crate::crypto_fixtures::TestKeypair;

/// Builder for test access tokens.
///
/// # Example
/// ```rust,ignore
/// let keypair = TestKeypair::new(1, "key-01");
/// let token = TestTokenBuilder::new()
///     .for_subject("user-123")
///     .with_scope("meetings:read")
///     .sign(&keypair);
/// ```
pub struct TestTokenBuilder {
    sub: Option<Value>,
    scope: Option<String>,
    exp: i64,
    iat: i64,
    issuer: Option<String>,
    audience: Option<Value>,
    extra: Map<String, Value>,
}

impl TestTokenBuilder {
    /// Create a builder with defaults: subject `test-subject`, one hour of
    /// validity, issued now.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            sub: Some(json!("test-subject")),
            scope: None,
            exp: (now + Duration::seconds(3600)).timestamp(),
            iat: now.timestamp(),
            issuer: None,
            audience: None,
            extra: Map::new(),
        }
    }

    /// Set the subject.
    pub fn for_subject(mut self, subject: &str) -> Self {
        self.sub = Some(json!(subject));
        self
    }

    /// Omit the `sub` claim entirely.
    pub fn without_subject(mut self) -> Self {
        self.sub = None;
        self
    }

    /// Set `sub` to an arbitrary JSON value (e.g. a number or object) for
    /// wrong-type tests.
    pub fn with_raw_subject(mut self, subject: Value) -> Self {
        self.sub = Some(subject);
        self
    }

    /// Set the scope claim.
    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scope = Some(scope.to_string());
        self
    }

    /// Stamp the issuer's authorization-code marker onto the token.
    pub fn as_authorization_code(self) -> Self {
        self.with_scope("authcode")
    }

    /// Set the issuer claim.
    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.issuer = Some(issuer.to_string());
        self
    }

    /// Set the audience claim.
    pub fn with_audience(mut self, audience: &str) -> Self {
        self.audience = Some(json!(audience));
        self
    }

    /// Set expiration in seconds from now. Negative values produce an
    /// already-expired token.
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self
    }

    /// Set issued-at timestamp.
    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.iat = timestamp;
        self
    }

    /// Add an arbitrary extra claim.
    pub fn with_claim(mut self, name: &str, value: Value) -> Self {
        self.extra.insert(name.to_string(), value);
        self
    }

    /// Build the claims as a JSON value.
    pub fn build(self) -> Value {
        let mut claims = Map::new();
        if let Some(sub) = self.sub {
            claims.insert("sub".to_string(), sub);
        }
        if let Some(scope) = self.scope {
            claims.insert("scope".to_string(), json!(scope));
        }
        if let Some(issuer) = self.issuer {
            claims.insert("iss".to_string(), json!(issuer));
        }
        if let Some(audience) = self.audience {
            claims.insert("aud".to_string(), audience);
        }
        claims.insert("exp".to_string(), json!(self.exp));
        claims.insert("iat".to_string(), json!(self.iat));
        claims.extend(self.extra);
        Value::Object(claims)
    }

    /// Build the claims and sign them with the given keypair, producing a
    /// compact `EdDSA` token whose header names the keypair's `kid`.
    ///
    /// # Panics
    ///
    /// Panics if signing fails (test fixture).
    pub fn sign(self, keypair: &TestKeypair) -> String {
        let claims = self.build();

        let mut header = Header::new(Algorithm::EdDSA);
        header.typ = Some("JWT".to_string());
        header.kid = Some(keypair.key_id.clone());

        encode(&header, &claims, &keypair.encoding_key()).expect("failed to sign test token")
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}
