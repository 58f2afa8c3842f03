use thiserror::Error;

use crate::domain::models::claims::ClaimSet;

pub mod jwt_token_verifier;

/// Verifies bearer tokens presented by devices.
///
/// Implementations hold only immutable key material and must be safe to call from many
/// in-flight requests at once.
pub trait TokenVerifier: Send + Sync {
    /// Verifies the value of an `Authorization` header.
    ///
    /// # Arguments
    /// * `header_value` - The raw header value, with or without a `Bearer ` scheme prefix
    ///
    /// # Returns
    /// * `Ok(ClaimSet)` - The claims of a token whose signature and claims checked out
    /// * `Err(TokenError::Parse)` - The token could not be decoded at all
    /// * `Err(TokenError::Verification)` - The token decoded but failed validation
    fn verify(&self, header_value: &str) -> Result<ClaimSet, TokenError>;
}

/// Why a bearer token was rejected.
///
/// The two kinds are reported to clients with different messages and must stay apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The token is structurally invalid.
    #[error("Token could not be parsed: {0}")]
    Parse(String),

    /// The token decoded but its signature or claims were rejected.
    #[error("Token could not be verified: {0}")]
    Verification(String),
}

/// Removes an optional, case-insensitive `Bearer ` scheme prefix.
pub(crate) fn strip_bearer(header_value: &str) -> &str {
    const SCHEME: &str = "bearer ";

    let value = header_value.trim();
    match value.get(..SCHEME.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(SCHEME) => value[SCHEME.len()..].trim_start(),
        _ => value,
    }
}
