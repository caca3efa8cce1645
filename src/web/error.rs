// Gateway error type: the only failure that crosses the HTTP boundary.
//
// Everything that goes wrong inside the decision engine degrades to a
// heuristic verdict; a malformed request is the one case where no verdict
// is produced.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Errors returned to gateway callers.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request body was not a JSON object with a string `text` field.
    #[error("invalid input: {message}")]
    InvalidInput { status: StatusCode, message: String },
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::InvalidInput { status, .. } => *status,
        }
    }
}

impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        GatewayError::InvalidInput {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let code = match &self {
            GatewayError::InvalidInput { .. } => "invalid_input",
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (self.status(), axum::Json(body)).into_response()
    }
}
