//! SAML 2.0 protocol support for fedbridge.
//!
//! fedbridge plays the identity-provider role toward downstream service
//! providers while delegating the actual authentication upstream. This crate
//! covers the SAML side of that bridge:
//!
//! - **AuthnRequest parsing** - decode and parse inbound authentication
//!   requests from either binding
//! - **Response generation** - build and sign SAML responses carrying the
//!   authenticated identity
//! - **POST and Redirect bindings** - DEFLATE/base64 codecs for both
//!   transport bindings
//! - **IdP metadata** - per-service-provider metadata documents
//!
//! # Architecture
//!
//! - [`types`] - SAML message types and protocol constants
//! - [`bindings`] - HTTP-POST and HTTP-Redirect binding codecs
//! - [`signature`] - XML-DSig signing of outgoing responses
//! - [`provider`] - the [`provider::SamlIdentityProvider`] capability used
//!   by the bridge orchestrator
//! - [`registry`] - registered service-provider configuration
//!
//! Signature *validation* of inbound requests is deliberately absent: the
//! bridge trusts its registered service providers at the transport layer and
//! only ever signs what it issues.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bindings;
pub mod error;
pub mod provider;
pub mod registry;
pub mod signature;
pub mod types;

mod xml;

pub use bindings::{DecodedMessage, HttpPostBinding, HttpRedirectBinding, SamlMessageType};
pub use error::{SamlError, SamlResult};
pub use provider::SamlIdentityProvider;
pub use registry::{AcsEndpoint, ServiceProviderConfig, ServiceProviderRegistry};
pub use types::*;
