//! Bearer scheme extraction from raw authorization header values.

use crate::errors::AuthzError;

/// The bearer scheme marker expected in authorization headers.
pub const BEARER_SCHEME: &str = "Bearer";

/// Extract the candidate token from an authorization header value.
///
/// The header must contain the `Bearer` marker exactly once; the trimmed
/// text after the marker becomes the candidate token. The candidate may be
/// empty; empty tokens are rejected by the token verifier, not here, so
/// that a bare `"Bearer"` header and a garbage token are not observably
/// different ahead of the parse stage.
///
/// # Errors
///
/// Returns [`AuthzError::MalformedHeader`] if the marker is absent or
/// appears more than once. No key resolution or token parsing happens on
/// this path.
pub fn extract_bearer_token(authorization: &str) -> Result<&str, AuthzError> {
    let parts: Vec<&str> = authorization.split(BEARER_SCHEME).collect();
    if parts.len() != 2 {
        tracing::debug!(
            target: "token_gate.header",
            markers = parts.len().saturating_sub(1),
            "authorization header does not carry a single bearer marker"
        );
        return Err(AuthzError::MalformedHeader);
    }

    let candidate = parts.get(1).ok_or(AuthzError::MalformedHeader)?;
    Ok(candidate.trim())
}
