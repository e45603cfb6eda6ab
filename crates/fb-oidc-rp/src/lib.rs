//! OpenID Connect relying-party client for fedbridge.
//!
//! The bridge delegates authentication to one upstream OIDC provider. This
//! crate covers the relying-party half of that conversation:
//!
//! - [`discovery`] - provider metadata from the well-known endpoint
//! - [`client`] - authorization URL construction and authorization-code
//!   exchange
//! - [`claims`] - ID-token claim decoding
//! - [`shared`] - the process-wide lazily-discovered client handle
//!
//! The client never re-verifies the ID token signature: the token arrives
//! over the TLS channel to the provider's token endpoint, which is the trust
//! anchor for this deployment shape. Replay protection comes from the
//! `state` echo check and the `nonce` claim check.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod claims;
pub mod client;
pub mod discovery;
pub mod error;
pub mod shared;

pub use claims::IdentityClaims;
pub use client::{CallbackParams, OidcClient, OidcClientConfig};
pub use discovery::ProviderMetadata;
pub use error::{OidcError, OidcResult};
pub use shared::SharedOidcClient;
