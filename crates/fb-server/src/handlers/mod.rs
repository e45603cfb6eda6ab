//! HTTP handlers.
//!
//! Thin axum shims: extract transport inputs, call the orchestrator, render
//! its result. All flow logic lives in `fb-bridge`.

pub mod oidc;
pub mod saml;

/// Name of the signed state cookie.
pub const STATE_COOKIE: &str = "saml_state";
