//! Error-to-HTTP mapping.
//!
//! Every failure is logged server-side with a correlation id and its full
//! context; the client sees one of four shapes: bad request, validation
//! detail, unknown-SP/bad-session (also 400-class), or a generic server
//! error carrying only the correlation id.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use uuid::Uuid;

use fb_bridge::BridgeError;

/// Error type returned by all handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed transport input; reported with field-level detail.
    Validation {
        /// The offending parameter.
        field: &'static str,
        /// What was wrong with it.
        message: String,
    },
    /// A bridge failure, mapped by its class.
    Bridge {
        /// Correlation id included in the response and the server log.
        correlation_id: Uuid,
        /// The underlying failure.
        source: BridgeError,
    },
}

impl ApiError {
    /// Creates a validation error for a transport parameter.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<BridgeError> for ApiError {
    fn from(source: BridgeError) -> Self {
        Self::Bridge {
            correlation_id: Uuid::new_v4(),
            source,
        }
    }
}

/// Error payload returned to clients.
#[derive(Debug, Serialize)]
struct ErrorBody {
    request_id: String,
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation { field, message } => {
                let body = ErrorBody {
                    request_id: Uuid::new_v4().to_string(),
                    error: "validation",
                    message,
                    field: Some(field),
                };
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            }
            Self::Bridge {
                correlation_id,
                source,
            } => {
                let status = StatusCode::from_u16(source.http_status())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

                if source.is_client_error() {
                    tracing::warn!(
                        correlation_id = %correlation_id,
                        kind = source.kind(),
                        error = %source,
                        "rejected login flow"
                    );
                    let body = ErrorBody {
                        request_id: correlation_id.to_string(),
                        error: source.kind(),
                        message: source.to_string(),
                        field: None,
                    };
                    (status, Json(body)).into_response()
                } else {
                    tracing::error!(
                        correlation_id = %correlation_id,
                        kind = source.kind(),
                        error = %source,
                        "login flow failed"
                    );
                    let message = if status == StatusCode::BAD_GATEWAY {
                        "Service Unavailable"
                    } else {
                        "Internal Server Error"
                    };
                    let body = ErrorBody {
                        request_id: correlation_id.to_string(),
                        error: source.kind(),
                        message: message.to_string(),
                        field: None,
                    };
                    (status, Json(body)).into_response()
                }
            }
        }
    }
}
