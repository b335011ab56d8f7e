//! Semantic checks on verified claim sets.
//!
//! Claim values are untyped at the transport boundary, so every read here
//! performs an explicit type check instead of trusting a declared schema.

use serde_json::Value;

use crate::errors::AuthzError;

/// A verified token's claims, keyed by claim name.
///
/// Handed to the caller only after signature verification and both
/// semantic checks have passed.
pub type ClaimSet = serde_json::Map<String, Value>;

/// Claim naming the principal the token was issued to.
pub const SUBJECT_CLAIM: &str = "sub";

/// Claim carrying the issuer's token-class indicator.
pub const SCOPE_CLAIM: &str = "scope";

/// Scope value the issuer stamps on authorization-code tokens.
pub const AUTH_CODE_SCOPE: &str = "authcode";

/// Whether the claim set marks an authorization-code token.
///
/// Issuer convention: authorization codes carry the scope `"authcode"`.
/// They are minted for one-time exchange and must never be accepted as
/// access credentials.
#[must_use]
pub fn is_authorization_code(claims: &ClaimSet) -> bool {
    claims.get(SCOPE_CLAIM).and_then(Value::as_str) == Some(AUTH_CODE_SCOPE)
}

/// The `sub` claim, if present as a string.
#[must_use]
pub fn subject(claims: &ClaimSet) -> Option<&str> {
    claims.get(SUBJECT_CLAIM).and_then(Value::as_str)
}

/// Reject authorization-code tokens presented as access credentials.
pub(crate) fn check_token_class(claims: &ClaimSet) -> Result<(), AuthzError> {
    if is_authorization_code(claims) {
        tracing::debug!(
            target: "token_gate.claims",
            "authorization code presented as access token"
        );
        return Err(AuthzError::AuthCodeNotAccepted);
    }
    Ok(())
}

/// Require a non-empty string `sub` claim.
///
/// Missing claim, wrong value type, and empty string fail identically.
pub(crate) fn check_subject(claims: &ClaimSet) -> Result<(), AuthzError> {
    match subject(claims) {
        Some(sub) if !sub.is_empty() => Ok(()),
        _ => {
            tracing::debug!(target: "token_gate.claims", "no usable sub claim in token");
            Err(AuthzError::MissingSubject)
        }
    }
}
