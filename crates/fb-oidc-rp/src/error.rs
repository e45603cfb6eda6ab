//! OIDC relying-party error types.

use thiserror::Error;

/// Result type for OIDC operations.
pub type OidcResult<T> = Result<T, OidcError>;

/// OIDC relying-party errors.
#[derive(Debug, Error)]
pub enum OidcError {
    /// Provider discovery failed.
    #[error("discovery failed for {issuer}: {message}")]
    Discovery {
        /// The issuer URL discovery was attempted against.
        issuer: String,
        /// What went wrong.
        message: String,
    },

    /// Client configuration is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The callback carried an error or was missing required parameters.
    #[error("invalid callback: {0}")]
    InvalidCallback(String),

    /// The echoed state parameter did not match the expected value.
    #[error("state parameter mismatch")]
    StateMismatch,

    /// The token endpoint exchange failed.
    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    /// The token response carried no ID token.
    #[error("token response carried no ID token")]
    MissingIdToken,

    /// The ID token could not be decoded.
    #[error("invalid ID token: {0}")]
    InvalidIdToken(String),

    /// The ID token nonce did not match the flow nonce.
    #[error("nonce mismatch")]
    NonceMismatch,
}
