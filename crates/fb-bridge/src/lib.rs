//! SAML↔OIDC state bridging for fedbridge.
//!
//! An in-flight SAML login has to survive a round trip through the upstream
//! OIDC provider without any server-side session storage. This crate is that
//! mechanism:
//!
//! - [`state`] - the bridged login state and its split/combine codec: the
//!   state is serialized, compressed, partitioned into two opaque halves,
//!   and reconstructed only when both halves come back together
//! - [`cookie`] - authenticated encryption for the half that rides in the
//!   browser cookie
//! - [`orchestrator`] - the flow state machine tying an inbound SAML
//!   request to the outbound OIDC redirect and, on callback, to the signed
//!   SAML response
//!
//! One half of the state travels as the OIDC `state` parameter (providers
//! echo it opaquely); the other sits in an encrypted, signed cookie on the
//! user agent. Neither half decodes to anything alone, and recombination is
//! a hard validation gate, so each flow is self-contained and tamper-evident
//! with no shared mutable state anywhere in the process.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cookie;
pub mod error;
pub mod orchestrator;
pub mod state;

pub use cookie::SecureCookieCodec;
pub use error::{BridgeError, BridgeResult};
pub use orchestrator::{CompletedLogin, InitiatedLogin, SsoOrchestrator};
pub use state::{SsoService, SsoState, StateCodec};
