//! End-to-end validation pipeline tests.
//!
//! Exercises the full header-to-claims pipeline with real signed `EdDSA`
//! tokens and deterministic resolver fakes.

// Test code is allowed to use expect/unwrap for assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use serde_json::json;
use tg_test_utils::{FailingKeyResolver, StaticKeyResolver, TestKeypair, TestTokenBuilder};
use token_gate::{
    subject, validate_access_token, AccessTokenValidator, AuthzError, KeyResolutionError,
    ValidatorOptions,
};

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

// =============================================================================
// Header extraction
// =============================================================================

#[tokio::test]
async fn test_header_without_marker_is_malformed() {
    let resolver = StaticKeyResolver::new();

    let result = validate_access_token("abc.def.ghi", &resolver).await;

    assert!(matches!(result, Err(AuthzError::MalformedHeader)));
    assert_eq!(
        resolver.resolve_calls(),
        0,
        "no key resolution may happen for malformed headers"
    );
}

#[tokio::test]
async fn test_empty_header_is_malformed() {
    let resolver = StaticKeyResolver::new();

    let result = validate_access_token("", &resolver).await;

    assert!(matches!(result, Err(AuthzError::MalformedHeader)));
    assert_eq!(resolver.resolve_calls(), 0);
}

#[tokio::test]
async fn test_duplicate_marker_is_malformed() {
    let keypair = TestKeypair::new(1, "key-01");
    let resolver = StaticKeyResolver::for_keypair(&keypair);
    let token = TestTokenBuilder::new().sign(&keypair);

    let result = validate_access_token(&format!("Bearer Bearer {token}"), &resolver).await;

    assert!(matches!(result, Err(AuthzError::MalformedHeader)));
    assert_eq!(resolver.resolve_calls(), 0);
}

#[tokio::test]
async fn test_basic_scheme_is_malformed() {
    let resolver = StaticKeyResolver::new();

    let result = validate_access_token("Basic dXNlcjpwYXNz", &resolver).await;

    assert!(matches!(result, Err(AuthzError::MalformedHeader)));
}

#[tokio::test]
async fn test_whitespace_around_token_is_tolerated() {
    let keypair = TestKeypair::new(1, "key-01");
    let resolver = StaticKeyResolver::for_keypair(&keypair);
    let token = TestTokenBuilder::new().for_subject("user-123").sign(&keypair);

    let claims = validate_access_token(&format!("Bearer   {token}  "), &resolver)
        .await
        .expect("padded token should validate");

    assert_eq!(subject(&claims), Some("user-123"));
}

// =============================================================================
// Token parsing
// =============================================================================

#[tokio::test]
async fn test_garbage_token_is_parse_error() {
    let resolver = StaticKeyResolver::new();

    let result = validate_access_token("Bearer not-a-jwt", &resolver).await;

    assert!(matches!(result, Err(AuthzError::Parse(_))));
    assert_eq!(
        resolver.resolve_calls(),
        0,
        "structurally invalid tokens must not reach key resolution"
    );
}

#[tokio::test]
async fn test_empty_token_is_parse_error() {
    let resolver = StaticKeyResolver::new();

    let result = validate_access_token("Bearer ", &resolver).await;

    assert!(matches!(result, Err(AuthzError::Parse(_))));
}

#[tokio::test]
async fn test_token_with_undecodable_segments_is_parse_error() {
    let resolver = StaticKeyResolver::new();

    let result = validate_access_token("Bearer abc.def.ghi", &resolver).await;

    assert!(matches!(result, Err(AuthzError::Parse(_))));
}

#[tokio::test]
async fn test_oversized_token_is_parse_error() {
    let resolver = StaticKeyResolver::new();
    let oversized = "a".repeat(16_384);

    let result = validate_access_token(&bearer(&oversized), &resolver).await;

    assert!(matches!(result, Err(AuthzError::Parse(_))));
    assert_eq!(resolver.resolve_calls(), 0);
}

// =============================================================================
// Signature and standard claims
// =============================================================================

#[tokio::test]
async fn test_wrong_signature_fails_validation() {
    let trusted = TestKeypair::new(1, "key-01");
    // Same kid, different private key: the signature cannot verify.
    let forger = TestKeypair::new(2, "key-01");
    let resolver = StaticKeyResolver::for_keypair(&trusted);
    let token = TestTokenBuilder::new().for_subject("user-123").sign(&forger);

    let result = validate_access_token(&bearer(&token), &resolver).await;

    assert!(matches!(result, Err(AuthzError::ValidationFailed)));
}

#[tokio::test]
async fn test_expired_token_fails_validation() {
    let keypair = TestKeypair::new(1, "key-01");
    let resolver = StaticKeyResolver::for_keypair(&keypair);
    let token = TestTokenBuilder::new()
        .for_subject("user-123")
        .expires_in(-3600)
        .sign(&keypair);

    let result = validate_access_token(&bearer(&token), &resolver).await;

    assert!(matches!(result, Err(AuthzError::ValidationFailed)));
}

#[tokio::test]
async fn test_not_yet_valid_token_fails_validation() {
    let keypair = TestKeypair::new(1, "key-01");
    let resolver = StaticKeyResolver::for_keypair(&keypair);
    let in_an_hour = chrono::Utc::now().timestamp() + 3600;
    let token = TestTokenBuilder::new()
        .for_subject("user-123")
        .with_claim("nbf", json!(in_an_hour))
        .sign(&keypair);

    let result = validate_access_token(&bearer(&token), &resolver).await;

    assert!(matches!(result, Err(AuthzError::ValidationFailed)));
}

#[tokio::test]
async fn test_future_issued_at_fails_validation() {
    let keypair = TestKeypair::new(1, "key-01");
    let resolver = StaticKeyResolver::for_keypair(&keypair);
    let token = TestTokenBuilder::new()
        .for_subject("user-123")
        .issued_at(chrono::Utc::now().timestamp() + 86_400)
        .sign(&keypair);

    let result = validate_access_token(&bearer(&token), &resolver).await;

    assert!(matches!(result, Err(AuthzError::ValidationFailed)));
}

#[tokio::test]
async fn test_unknown_key_id_fails_validation() {
    let keypair = TestKeypair::new(1, "key-01");
    let resolver = StaticKeyResolver::new();
    let token = TestTokenBuilder::new().for_subject("user-123").sign(&keypair);

    let result = validate_access_token(&bearer(&token), &resolver).await;

    assert!(matches!(result, Err(AuthzError::ValidationFailed)));
    assert_eq!(resolver.resolve_calls(), 1);
}

#[tokio::test]
async fn test_resolver_outage_is_indistinguishable_from_bad_signature() {
    let keypair = TestKeypair::new(1, "key-01");
    let token = TestTokenBuilder::new().for_subject("user-123").sign(&keypair);

    let outage = FailingKeyResolver::new(KeyResolutionError::Unavailable("down".to_string()));
    let outage_err = validate_access_token(&bearer(&token), &outage)
        .await
        .expect_err("outage must fail validation");

    let forger = TestKeypair::new(2, "key-01");
    let resolver = StaticKeyResolver::for_keypair(&keypair);
    let forged = TestTokenBuilder::new().for_subject("user-123").sign(&forger);
    let forged_err = validate_access_token(&bearer(&forged), &resolver)
        .await
        .expect_err("forged token must fail validation");

    assert!(matches!(outage_err, AuthzError::ValidationFailed));
    assert!(matches!(forged_err, AuthzError::ValidationFailed));
    assert_eq!(
        outage_err.to_string(),
        forged_err.to_string(),
        "failure causes must not be observable from outside"
    );
}

// =============================================================================
// Claim semantics
// =============================================================================

#[tokio::test]
async fn test_authorization_code_is_rejected_as_access_token() {
    let keypair = TestKeypair::new(1, "key-01");
    let resolver = StaticKeyResolver::for_keypair(&keypair);
    let token = TestTokenBuilder::new()
        .for_subject("user-123")
        .as_authorization_code()
        .sign(&keypair);

    let result = validate_access_token(&bearer(&token), &resolver).await;

    assert!(matches!(result, Err(AuthzError::AuthCodeNotAccepted)));
}

#[tokio::test]
async fn test_missing_subject_is_rejected() {
    let keypair = TestKeypair::new(1, "key-01");
    let resolver = StaticKeyResolver::for_keypair(&keypair);
    let token = TestTokenBuilder::new().without_subject().sign(&keypair);

    let result = validate_access_token(&bearer(&token), &resolver).await;

    assert!(matches!(result, Err(AuthzError::MissingSubject)));
}

#[tokio::test]
async fn test_empty_subject_is_rejected() {
    let keypair = TestKeypair::new(1, "key-01");
    let resolver = StaticKeyResolver::for_keypair(&keypair);
    let token = TestTokenBuilder::new().for_subject("").sign(&keypair);

    let result = validate_access_token(&bearer(&token), &resolver).await;

    assert!(matches!(result, Err(AuthzError::MissingSubject)));
}

#[tokio::test]
async fn test_non_string_subject_is_rejected() {
    let keypair = TestKeypair::new(1, "key-01");
    let resolver = StaticKeyResolver::for_keypair(&keypair);
    let token = TestTokenBuilder::new()
        .with_raw_subject(json!(12_345))
        .sign(&keypair);

    let result = validate_access_token(&bearer(&token), &resolver).await;

    assert!(matches!(result, Err(AuthzError::MissingSubject)));
}

// =============================================================================
// Success paths
// =============================================================================

#[tokio::test]
async fn test_valid_access_token_returns_claims() {
    let keypair = TestKeypair::new(1, "key-01");
    let resolver = StaticKeyResolver::for_keypair(&keypair);
    let token = TestTokenBuilder::new()
        .for_subject("user-123")
        .with_scope("meetings:read meetings:create")
        .with_claim("org", json!("acme"))
        .sign(&keypair);

    let claims = validate_access_token(&bearer(&token), &resolver)
        .await
        .expect("valid token should validate");

    assert_eq!(subject(&claims), Some("user-123"));
    assert_eq!(
        claims.get("scope").and_then(|v| v.as_str()),
        Some("meetings:read meetings:create")
    );
    assert_eq!(claims.get("org").and_then(|v| v.as_str()), Some("acme"));
    assert_eq!(resolver.resolve_calls(), 1);
}

#[tokio::test]
async fn test_audience_based_key_resolution() {
    let keypair = TestKeypair::new(3, "unregistered-kid");
    let resolver = StaticKeyResolver::new().with_audience_key("tenant-a", keypair.resolved_key());
    let token = TestTokenBuilder::new()
        .for_subject("user-123")
        .with_audience("tenant-a")
        .sign(&keypair);

    let claims = validate_access_token(&bearer(&token), &resolver)
        .await
        .expect("audience-resolved token should validate");

    assert_eq!(subject(&claims), Some("user-123"));
}

#[tokio::test]
async fn test_validation_is_idempotent() {
    let keypair = TestKeypair::new(1, "key-01");
    let resolver = StaticKeyResolver::for_keypair(&keypair);
    let token = TestTokenBuilder::new().for_subject("user-123").sign(&keypair);
    let header = bearer(&token);

    let first = validate_access_token(&header, &resolver)
        .await
        .expect("first validation should pass");
    let second = validate_access_token(&header, &resolver)
        .await
        .expect("second validation should pass");

    assert_eq!(first, second);
    assert_eq!(resolver.resolve_calls(), 2);
}

// =============================================================================
// Options
// =============================================================================

#[tokio::test]
async fn test_leeway_is_honored_for_recent_expiry() {
    let keypair = TestKeypair::new(1, "key-01");
    let resolver = StaticKeyResolver::for_keypair(&keypair);
    // Expired 100 seconds ago: inside the default 300 second leeway.
    let token = TestTokenBuilder::new()
        .for_subject("user-123")
        .expires_in(-100)
        .sign(&keypair);
    let header = bearer(&token);

    let default_validator = AccessTokenValidator::new();
    assert!(default_validator
        .validate_access_token(&header, &resolver)
        .await
        .is_ok());

    let strict_validator = AccessTokenValidator::with_options(ValidatorOptions {
        leeway: std::time::Duration::ZERO,
        ..ValidatorOptions::default()
    });
    let result = strict_validator.validate_access_token(&header, &resolver).await;
    assert!(matches!(result, Err(AuthzError::ValidationFailed)));
}

#[tokio::test]
async fn test_configured_token_size_limit() {
    let keypair = TestKeypair::new(1, "key-01");
    let resolver = StaticKeyResolver::for_keypair(&keypair);
    let token = TestTokenBuilder::new().for_subject("user-123").sign(&keypair);

    let tiny_validator = AccessTokenValidator::with_options(ValidatorOptions {
        max_token_bytes: 16,
        ..ValidatorOptions::default()
    });

    let result = tiny_validator
        .validate_access_token(&bearer(&token), &resolver)
        .await;
    assert!(matches!(result, Err(AuthzError::Parse(_))));
    assert_eq!(resolver.resolve_calls(), 0);
}
