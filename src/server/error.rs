//! Error-to-HTTP response conversion.
//!
//! Handlers return `Result<_, ApiError>`; failures are rendered as the
//! `{ "success": false, "error": "..." }` envelope. Server-side failures are
//! logged in full and answered with a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reelvault_common::Error;

use super::response::ApiResponse;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct ApiError {
    inner: Error,
    /// What the handler was doing, for the server log.
    operation: Option<&'static str>,
}

impl ApiError {
    pub fn new(inner: Error) -> Self {
        Self {
            inner,
            operation: None,
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(Error::InvalidInput(msg.into()))
    }

    pub fn with_operation(mut self, operation: &'static str) -> Self {
        self.operation = Some(operation);
        self
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.inner.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn inner(&self) -> &Error {
        &self.inner
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self::new(e)
    }
}

impl From<std::io::Error> for ApiError {
    fn from(e: std::io::Error) -> Self {
        Self::new(Error::Io(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self.inner {
            Error::NotFound { entity, .. } => format!("{} not found", capitalize(entity)),
            Error::InvalidInput(msg) | Error::PayloadTooLarge(msg) => msg.clone(),
            _ => {
                tracing::error!(
                    status = %status,
                    operation = self.operation.unwrap_or("request"),
                    error = %self.inner,
                    "Server error in API handler"
                );
                "Internal server error".to_string()
            }
        };

        (status, axum::Json(ApiResponse::<()>::error(message))).into_response()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
