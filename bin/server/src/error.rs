//! Request-level error types and the generic 500 responder.
//!
//! Every uncaught failure, including a handler panic, becomes the same
//! structured body. The underlying cause is logged server-side and never
//! returned to the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log_gateway_access::InvalidOidcUrl;
use log_gateway_core::iso_timestamp;
use serde::Serialize;
use std::any::Any;
use std::fmt;
use tracing::error;

use crate::auth::SessionStoreError;

/// Message returned with every generic 500 response.
const GENERIC_MESSAGE: &str = "An unexpected error occurred";

/// Errors a handler can bubble up to the generic responder.
#[derive(Debug)]
pub enum AppError {
    /// Session persistence failed outside the callback flow.
    Session(SessionStoreError),
    /// A configured URL could not be used.
    Configuration(InvalidOidcUrl),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Session(e) => write!(f, "session error: {}", e),
            Self::Configuration(e) => write!(f, "configuration error: {}", e),
        }
    }
}

impl std::error::Error for AppError {}

impl From<SessionStoreError> for AppError {
    fn from(e: SessionStoreError) -> Self {
        Self::Session(e)
    }
}

impl From<InvalidOidcUrl> for AppError {
    fn from(e: InvalidOidcUrl) -> Self {
        Self::Configuration(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = %self, "request failed");
        internal_error_response()
    }
}

/// Body of a generic 500 response.
#[derive(Debug, Serialize)]
pub struct InternalErrorBody {
    pub error: &'static str,
    pub message: &'static str,
    pub timestamp: String,
}

fn internal_error_response() -> Response {
    let body = InternalErrorBody {
        error: "Internal Server Error",
        message: GENERIC_MESSAGE,
        timestamp: iso_timestamp(),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// Converts a handler panic into the generic 500 response.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic payload"
    };
    error!(panic = %details, "handler panicked");
    internal_error_response()
}
