use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::messages::{ErrorBody, ErrorEnvelope, TECHNICAL_FAILURE_CONTENT};

/// Relay errors with appropriate HTTP status codes.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Request used a method other than OPTIONS or POST.
    #[error("Method {0} not allowed")]
    MethodNotAllowed(String),

    /// POST with an empty request body.
    #[error("Empty request body")]
    EmptyBody,

    /// Request body is not JSON, or does not match the expected shape.
    #[error("Invalid JSON in request body")]
    InvalidJson,

    /// The required `message` field is absent or empty.
    #[error("Missing 'message' field")]
    MissingMessage,

    /// The upstream API answered with a non-success status.
    #[error("OpenAI API Error: {status} - {body}")]
    Upstream {
        /// Upstream HTTP status code.
        status: u16,
        /// Raw upstream error body.
        body: String,
    },

    /// The upstream request could not be sent.
    #[error("Failed to send request to upstream: {0}")]
    Connection(String),

    /// The upstream success response could not be read or parsed.
    #[error("Invalid upstream response: {0}")]
    InvalidUpstreamResponse(String),
}

impl RelayError {
    /// Get the appropriate HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::EmptyBody | Self::InvalidJson | Self::MissingMessage => StatusCode::BAD_REQUEST,
            Self::Upstream { .. } | Self::Connection(_) | Self::InvalidUpstreamResponse(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            log::error!("Relay request failed: {self}");
        }

        // Server-side failures carry the envelope shape so the UI can
        // still render choices[0].message.content; client errors get the
        // plain error body.
        let mut response = if status.is_server_error() {
            let envelope = ErrorEnvelope::new(self.to_string(), TECHNICAL_FAILURE_CONTENT);
            (status, Json(envelope)).into_response()
        } else {
            let body = ErrorBody {
                error: self.to_string(),
            };
            (status, Json(body)).into_response()
        };

        response
            .headers_mut()
            .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));

        response
    }
}
