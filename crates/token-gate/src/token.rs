//! Token verification against resolver-supplied key material.
//!
//! This stage peeks the unverified token metadata, asks the caller's
//! [`KeyResolver`] for the matching key, and hands the token to
//! `jsonwebtoken` for signature and standard-claim checks. Structural
//! failures keep their cause attached; everything past the structural
//! boundary collapses into one opaque validation failure.
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE any base64 or JSON work (DoS prevention)
//! - The accepted algorithm is pinned to the resolved key, never taken from
//!   the token header
//! - Rejected tokens log their cause at debug level only

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::claims::ClaimSet;
use crate::errors::AuthzError;
use crate::resolver::{KeyResolutionError, KeyResolver, TokenMetadata};
use crate::validator::ValidatorOptions;

/// Maximum accepted token size in bytes (8 KiB).
///
/// Typical access tokens are a few hundred bytes; anything larger is
/// rejected before base64 decoding or signature verification so oversized
/// tokens cannot burn CPU or memory.
pub const MAX_TOKEN_SIZE_BYTES: usize = 8192;

/// Structural reasons a token cannot be decoded. Carried as the source of
/// [`AuthzError::Parse`] for server-side diagnostics.
#[derive(Debug, Error)]
enum TokenFormatError {
    #[error("token exceeds the configured size limit")]
    TooLarge,

    #[error("token does not have three dot-separated segments")]
    WrongSegmentCount,

    #[error("token segment is not valid base64url")]
    Base64(#[from] base64::DecodeError),

    #[error("token segment is not valid JSON")]
    Json(#[from] serde_json::Error),
}

/// JOSE header fields needed for key selection.
#[derive(Debug, Deserialize)]
struct PeekedHeader {
    alg: String,
    #[serde(default)]
    kid: Option<String>,
}

/// Payload claims needed for key selection, read without verification.
#[derive(Debug, Deserialize)]
struct PeekedPayload {
    #[serde(default)]
    iss: Option<String>,
    #[serde(default)]
    aud: Option<Value>,
}

fn decode_segment<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, TokenFormatError> {
    let bytes = URL_SAFE_NO_PAD.decode(segment)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Extract unverified metadata from a candidate token.
///
/// None of the returned values are authenticated; they are only good
/// enough to pick a verification key. The signature check afterwards is
/// what makes the token trustworthy.
///
/// # Errors
///
/// Returns [`AuthzError::Parse`] when the token is oversized, is not a
/// three-segment compact serialization, or its header/payload segments do
/// not decode.
pub(crate) fn peek_metadata(
    token: &str,
    max_token_bytes: usize,
) -> Result<TokenMetadata, AuthzError> {
    if token.len() > max_token_bytes {
        tracing::debug!(
            target: "token_gate.token",
            token_size = token.len(),
            max_size = max_token_bytes,
            "token rejected: size exceeds maximum allowed"
        );
        return Err(AuthzError::parse(TokenFormatError::TooLarge));
    }

    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        tracing::debug!(
            target: "token_gate.token",
            segments = segments.len(),
            "token rejected: not a compact three-segment serialization"
        );
        return Err(AuthzError::parse(TokenFormatError::WrongSegmentCount));
    }

    let header_segment = segments
        .first()
        .ok_or_else(|| AuthzError::parse(TokenFormatError::WrongSegmentCount))?;
    let header: PeekedHeader = decode_segment(header_segment).map_err(|e| {
        tracing::debug!(target: "token_gate.token", error = %e, "failed to decode token header");
        AuthzError::parse(e)
    })?;

    let payload_segment = segments
        .get(1)
        .ok_or_else(|| AuthzError::parse(TokenFormatError::WrongSegmentCount))?;
    let payload: PeekedPayload = decode_segment(payload_segment).map_err(|e| {
        tracing::debug!(target: "token_gate.token", error = %e, "failed to decode token payload");
        AuthzError::parse(e)
    })?;

    Ok(TokenMetadata {
        algorithm: header.alg,
        key_id: header.kid.filter(|kid| !kid.is_empty()),
        issuer: payload.iss,
        audience: payload
            .aud
            .and_then(|aud| aud.as_str().map(ToString::to_string)),
    })
}

/// Verify a candidate token and return its claim set.
///
/// The resolver supplies the verification key for the token's metadata;
/// `jsonwebtoken` then checks the signature and the standard claims
/// (expiry, not-before) with the configured leeway. Its accept/reject
/// result is authoritative: there is no path that returns claims from a
/// rejected token.
///
/// # Errors
///
/// - [`AuthzError::Parse`] when the token is not structurally decodable
/// - [`AuthzError::ValidationFailed`] for everything else: unresolvable
///   key, signature mismatch, expiry, not-before, algorithm mismatch, or a
///   future-dated `iat`. The variants are indistinguishable on purpose.
pub(crate) async fn verify_token(
    token: &str,
    resolver: &dyn KeyResolver,
    options: &ValidatorOptions,
) -> Result<ClaimSet, AuthzError> {
    let metadata = peek_metadata(token, options.max_token_bytes)?;

    let resolved = resolver.resolve(&metadata).await.map_err(|e| {
        match &e {
            KeyResolutionError::NoSuchKey => {
                tracing::debug!(
                    target: "token_gate.token",
                    key_id = metadata.key_id.as_deref(),
                    audience = metadata.audience.as_deref(),
                    "no verification key for presented token"
                );
            }
            KeyResolutionError::Unavailable(reason) => {
                tracing::warn!(
                    target: "token_gate.token",
                    reason = %reason,
                    "key source unavailable during token verification"
                );
            }
        }
        AuthzError::ValidationFailed
    })?;

    let mut validation = jsonwebtoken::Validation::new(resolved.algorithm);
    validation.leeway = options.leeway.as_secs();
    validation.validate_exp = true;
    validation.validate_nbf = true;
    // Audience binding happens through key resolution: the resolver hands
    // out keys per audience/tenant, so a token with a foreign audience
    // verifies against the wrong key and fails.
    validation.validate_aud = false;

    let data = jsonwebtoken::decode::<ClaimSet>(token, &resolved.key, &validation).map_err(
        |e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::InvalidToken
            | jsonwebtoken::errors::ErrorKind::Base64(_)
            | jsonwebtoken::errors::ErrorKind::Json(_)
            | jsonwebtoken::errors::ErrorKind::Utf8(_) => {
                tracing::debug!(target: "token_gate.token", error = %e, "unable to parse token");
                AuthzError::parse(e)
            }
            _ => {
                tracing::debug!(target: "token_gate.token", error = %e, "token rejected by verifier");
                AuthzError::ValidationFailed
            }
        },
    )?;

    let claims = data.claims;

    // jsonwebtoken does not police iat; a token issued in the future is a
    // pre-generation or clock-manipulation signal.
    if let Some(iat) = claims.get("iat").and_then(Value::as_i64) {
        validate_iat_at(iat, options.leeway.as_secs(), chrono::Utc::now().timestamp())?;
    }

    Ok(claims)
}

/// Deterministic issued-at check against an explicit `now` timestamp.
///
/// Split out so boundary conditions can be unit-tested without wall-clock
/// dependence.
pub(crate) fn validate_iat_at(iat: i64, leeway_secs: u64, now: i64) -> Result<(), AuthzError> {
    // Leeway is clamped well within i64 range by ValidatorOptions.
    #[allow(clippy::cast_possible_wrap)]
    let max_iat = now + leeway_secs as i64;

    if iat > max_iat {
        tracing::debug!(
            target: "token_gate.token",
            iat = iat,
            max_allowed = max_iat,
            "token rejected: iat too far in the future"
        );
        return Err(AuthzError::ValidationFailed);
    }

    Ok(())
}
