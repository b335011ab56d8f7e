//! Error taxonomy for the validation pipeline.
//!
//! Each pipeline stage fails with exactly one variant of [`AuthzError`], so
//! callers can pattern-match exhaustively instead of depending on message
//! strings. Display messages are intentionally generic and safe to surface
//! at a transport boundary; diagnostic detail lives only in the [`Parse`]
//! source chain and in debug-level logs.
//!
//! [`Parse`]: AuthzError::Parse

use std::error::Error as StdError;

use thiserror::Error;

/// Terminal outcome of a failed access-token validation.
///
/// Every validation call ends in either a claim set or exactly one of these
/// variants. All of them should be answered with an authentication rejection
/// (401) at the transport boundary.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// The authorization header does not carry a single bearer scheme
    /// marker.
    #[error("unexpected authorization header format, expecting bearer token")]
    MalformedHeader,

    /// The token is not structurally decodable. The underlying cause is
    /// attached for server-side diagnostics and must never be echoed back
    /// to the token bearer.
    #[error("unable to parse access token")]
    Parse(#[source] Box<dyn StdError + Send + Sync + 'static>),

    /// The token decodes but failed signature or standard-claim checks.
    /// Deliberately opaque: exposing which check failed would hand an
    /// attacker an oracle for forging near-valid tokens.
    #[error("access token validation failed")]
    ValidationFailed,

    /// An authorization-code token was presented as an access credential.
    #[error("authorization code presented as access token")]
    AuthCodeNotAccepted,

    /// The claim set has no usable `sub` claim: missing, not a string, or
    /// empty.
    #[error("token claims missing usable subject")]
    MissingSubject,
}

impl AuthzError {
    pub(crate) fn parse(source: impl Into<Box<dyn StdError + Send + Sync + 'static>>) -> Self {
        Self::Parse(source.into())
    }
}
