//! Bearer access-token validation for services.
//!
//! Given a raw `Authorization` header value and a key-resolution
//! capability, this crate confirms that the presented token is well-formed,
//! cryptographically authentic, an access token (not an authorization
//! code), and carries a usable subject, then returns its claim set.
//!
//! # Pipeline
//!
//! ```text
//! header-split -> token-parse -> signature/standard-claim checks
//!              -> class-check -> subject-check -> claims
//! ```
//!
//! Each stage can short-circuit with exactly one [`AuthzError`] variant;
//! there is no path that returns claims from a token that failed any
//! stage. Calls are stateless and safe to run concurrently whenever the
//! supplied [`KeyResolver`] is.
//!
//! # Example
//!
//! ```rust,ignore
//! use token_gate::{validate_access_token, KeyResolver};
//!
//! let claims = validate_access_token(header_value, &resolver).await?;
//! let subject = token_gate::subject(&claims);
//! ```
//!
//! # Security
//!
//! - Signature and standard-claim failures are one opaque error; callers
//!   and token bearers learn nothing about which check failed
//! - The accepted algorithm is pinned to the resolved key, never taken
//!   from the token header
//! - Tokens are size-checked before any decoding work
//! - Rejection causes are logged at debug level, never returned

#![warn(clippy::pedantic)]

/// Module for the error taxonomy
pub mod errors;

/// Module for bearer scheme extraction
pub mod header;

/// Module for the key-resolution capability
pub mod resolver;

/// Module for token verification
pub mod token;

/// Module for semantic claim checks
pub mod claims;

/// Module for pipeline assembly and options
pub mod validator;

pub use claims::{is_authorization_code, subject, ClaimSet};
pub use errors::AuthzError;
pub use header::extract_bearer_token;
pub use resolver::{KeyResolutionError, KeyResolver, ResolvedKey, TokenMetadata};
pub use validator::{validate_access_token, AccessTokenValidator, ValidatorOptions};
