//! End-to-end integration tests.
//!
//! These tests run the real fedbridge server against a stub OIDC provider
//! and drive complete login flows over HTTP.

mod common;

mod bridge_flow;
mod saml_endpoints;
