//! Router configuration.

use axum::{http::StatusCode, response::Json, routing::get, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Creates the application router.
pub fn create_router(state: AppState) -> Router {
    let health = Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness_check))
        .route("/health/ready", get(readiness_check));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/saml/metadata", get(handlers::saml::metadata))
        .route(
            "/saml/sso",
            get(handlers::saml::sso_redirect).post(handlers::saml::sso_post),
        )
        .route("/oidc/callback", get(handlers::oidc::callback))
        .merge(health)
        .route("/", get(root))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Service information response.
#[derive(Serialize)]
struct ServerInfo {
    name: &'static str,
    version: &'static str,
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn root() -> Json<ServerInfo> {
    Json(ServerInfo {
        name: "fedbridge",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

async fn readiness_check() -> StatusCode {
    // The bridge holds no connections to check; configuration problems fail
    // startup instead.
    StatusCode::OK
}
