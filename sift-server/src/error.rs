//! Unified API error handling
//!
//! Every failure of the JSON endpoint is rendered here, so the body shapes
//! stay identical across handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use sift_common::{CredentialStatus, SiftError};

/// Standard error response format
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 405
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Request body was not JSON (400)
    #[error("Invalid JSON body")]
    InvalidJson,

    /// Required field missing or blank (400)
    #[error("{0}")]
    Validation(String),

    /// Provider credentials absent at startup (500)
    #[error("API credentials not configured")]
    MissingCredentials(CredentialStatus),

    /// Provider answered with a non-success status (500)
    #[error("API request failed with status {status}")]
    Upstream { status: u16, body: String },

    /// Anything else (500)
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::InvalidJson | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingCredentials(_)
            | ApiError::Upstream { .. }
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Extra context shown below the headline, if any.
    pub fn detail(&self) -> Option<String> {
        match self {
            ApiError::MissingCredentials(status) => Some(format!(
                "API key configured: {}, app id configured: {}",
                status.has_api_key, status.has_app_id
            )),
            ApiError::Upstream { body, .. } => Some(body.clone()),
            ApiError::Internal(message) => Some(message.clone()),
            _ => None,
        }
    }

    pub fn body(&self) -> ErrorResponse {
        let (details, message) = match self {
            ApiError::MissingCredentials(status) => (serde_json::to_value(status).ok(), None),
            ApiError::Upstream { body, .. } => (Some(Value::String(body.clone())), None),
            ApiError::Internal(message) => (None, Some(message.clone())),
            _ => (None, None),
        };
        ErrorResponse {
            error: self.to_string(),
            details,
            message,
        }
    }

    pub(crate) fn log(&self) {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, detail = ?self.detail(), "API error");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "API error");
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        (self.status_code(), Json(self.body())).into_response()
    }
}

impl From<SiftError> for ApiError {
    fn from(err: SiftError) -> Self {
        match err {
            SiftError::Validation(message) => ApiError::Validation(message),
            SiftError::MissingCredentials(status) => ApiError::MissingCredentials(status),
            SiftError::Upstream { status, body } => ApiError::Upstream { status, body },
            SiftError::Internal(message) => ApiError::Internal(message),
            other @ SiftError::Config(_) => ApiError::Internal(other.to_string()),
        }
    }
}
