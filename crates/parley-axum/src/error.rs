//! Axum-specific error types and mappings.
//!
//! Maps the core synthesis and transcription errors onto HTTP status codes
//! and a JSON body of the form `{ "error": "...", "status": 502 }`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use parley_core::{SynthesisError, TranscriptionError};
use serde::Serialize;
use thiserror::Error;

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Bad request (invalid input).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Upstream service failed.
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    /// Server is at capacity or shutting down.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Upstream service did not answer in time.
    #[error("Gateway timeout: {0}")]
    GatewayTimeout(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HttpError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(self) -> String {
        match self {
            Self::BadRequest(msg)
            | Self::BadGateway(msg)
            | Self::ServiceUnavailable(msg)
            | Self::GatewayTimeout(msg)
            | Self::Internal(msg) => msg,
        }
    }
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(target: "parley.server", status = status.as_u16(), error = %self, "Request failed");
        }

        let body = ErrorBody {
            error: self.message(),
            status: status.as_u16(),
        };
        (status, axum::Json(body)).into_response()
    }
}

impl From<SynthesisError> for HttpError {
    fn from(err: SynthesisError) -> Self {
        let msg = err.to_string();
        match err {
            SynthesisError::MalformedRequest(_) => Self::BadRequest(msg),
            SynthesisError::QueueFull { .. } | SynthesisError::QueueClosed => {
                Self::ServiceUnavailable(msg)
            }
            SynthesisError::BackendUnavailable(_) => Self::BadGateway(msg),
            SynthesisError::Timeout(_) => Self::GatewayTimeout(msg),
        }
    }
}

impl From<TranscriptionError> for HttpError {
    fn from(err: TranscriptionError) -> Self {
        let msg = err.to_string();
        match err {
            TranscriptionError::NotConfigured => Self::ServiceUnavailable(msg),
            TranscriptionError::EmptyAudio => Self::BadRequest(msg),
            TranscriptionError::BackendUnavailable(_) => Self::BadGateway(msg),
        }
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}
