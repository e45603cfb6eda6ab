//! Bridge error taxonomy.

use fb_oidc_rp::OidcError;
use fb_protocol_saml::SamlError;
use thiserror::Error;

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors raised while bridging a login flow.
///
/// Client-class errors (unknown SP, missing/malformed session, malformed
/// state) mean the flow is broken or expired and must restart from the SAML
/// request; nothing here is retried.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The service-provider id is not registered.
    #[error("unknown service provider: {0}")]
    UnknownServiceProvider(String),

    /// The state cookie is absent from the callback.
    #[error("login session is missing")]
    SessionMissing,

    /// The state cookie failed to decrypt or parse.
    #[error("login session is malformed")]
    SessionMalformed,

    /// The recombined state failed reconstruction or shape validation.
    #[error("malformed login state: {0}")]
    MalformedState(String),

    /// Cookie decryption failed (tampering or wrong secret).
    #[error("decryption failed")]
    DecryptionFailed,

    /// SAML collaborator failure.
    #[error(transparent)]
    Saml(SamlError),

    /// OIDC collaborator failure.
    #[error(transparent)]
    Oidc(#[from] OidcError),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::UnknownServiceProvider(_)
            | Self::SessionMissing
            | Self::SessionMalformed
            | Self::MalformedState(_)
            | Self::DecryptionFailed => 400,
            Self::Saml(e) => e.http_status(),
            Self::Oidc(_) => 502,
            Self::Internal(_) => 500,
        }
    }

    /// Returns true if this error is the client's fault.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.http_status() < 500
    }

    /// Short machine-readable tag for logging and error bodies.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnknownServiceProvider(_) => "unknown_service_provider",
            Self::SessionMissing => "session_missing",
            Self::SessionMalformed => "session_malformed",
            Self::MalformedState(_) => "malformed_state",
            Self::DecryptionFailed => "decryption_failed",
            Self::Saml(_) => "saml",
            Self::Oidc(_) => "oidc",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<SamlError> for BridgeError {
    fn from(err: SamlError) -> Self {
        match err {
            SamlError::UnknownServiceProvider(id) => Self::UnknownServiceProvider(id),
            other => Self::Saml(other),
        }
    }
}
