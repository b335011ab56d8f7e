//! Pipeline assembly: header extraction, token verification, claim checks.

use std::time::Duration;

use crate::claims::{self, ClaimSet};
use crate::errors::AuthzError;
use crate::header;
use crate::resolver::KeyResolver;
use crate::token;

/// Default clock skew tolerance (5 minutes per NIST SP 800-63B).
pub const DEFAULT_LEEWAY: Duration = Duration::from_secs(300);

/// Maximum allowed clock skew tolerance (10 minutes).
///
/// Larger configured values are clamped so misconfiguration cannot
/// quietly stretch token lifetimes.
pub const MAX_LEEWAY: Duration = Duration::from_secs(600);

/// Tunables for the validation pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorOptions {
    /// Clock skew tolerance applied to expiry, not-before, and issued-at
    /// checks.
    pub leeway: Duration,

    /// Maximum accepted token size in bytes.
    pub max_token_bytes: usize,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            leeway: DEFAULT_LEEWAY,
            max_token_bytes: token::MAX_TOKEN_SIZE_BYTES,
        }
    }
}

/// Stateless access-token validator.
///
/// Holds only tunables; every call is an independent, pure function of the
/// header value and the supplied resolver, so one validator may serve any
/// number of concurrent tasks.
#[derive(Debug, Clone, Default)]
pub struct AccessTokenValidator {
    options: ValidatorOptions,
}

impl AccessTokenValidator {
    /// Create a validator with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validator with explicit options. Leeway beyond
    /// [`MAX_LEEWAY`] is clamped.
    #[must_use]
    pub fn with_options(options: ValidatorOptions) -> Self {
        let mut options = options;
        if options.leeway > MAX_LEEWAY {
            tracing::debug!(
                target: "token_gate.validator",
                configured_secs = options.leeway.as_secs(),
                max_secs = MAX_LEEWAY.as_secs(),
                "configured leeway clamped to maximum"
            );
            options.leeway = MAX_LEEWAY;
        }
        Self { options }
    }

    /// Validate a bearer access token presented in an authorization header.
    ///
    /// Runs the three pipeline stages in order (header extraction, token
    /// verification against resolver-supplied key material, semantic claim
    /// checks) and returns the full claim set only when all of them pass.
    ///
    /// # Errors
    ///
    /// Exactly one [`AuthzError`] variant per failed stage; see the error
    /// taxonomy for the mapping. Nothing is retried internally.
    pub async fn validate_access_token(
        &self,
        authorization: &str,
        resolver: &dyn KeyResolver,
    ) -> Result<ClaimSet, AuthzError> {
        let candidate = header::extract_bearer_token(authorization)?;

        let claims = token::verify_token(candidate, resolver, &self.options).await?;

        claims::check_token_class(&claims)?;
        claims::check_subject(&claims)?;

        tracing::debug!(target: "token_gate.validator", "access token validated");
        Ok(claims)
    }
}

/// Validate a bearer access token with default options.
///
/// Convenience wrapper over [`AccessTokenValidator::validate_access_token`].
///
/// # Errors
///
/// Same taxonomy as [`AccessTokenValidator::validate_access_token`].
pub async fn validate_access_token(
    authorization: &str,
    resolver: &dyn KeyResolver,
) -> Result<ClaimSet, AuthzError> {
    AccessTokenValidator::new()
        .validate_access_token(authorization, resolver)
        .await
}
