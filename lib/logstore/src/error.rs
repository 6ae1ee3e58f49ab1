//! Error type for log store reads.

use std::fmt;

/// A failed log store read.
///
/// Carries only what is safe to show a client: the provider's message and
/// its error code and request identifiers when it supplied them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogStoreError {
    message: String,
    code: Option<String>,
    request_id: Option<String>,
    cf_id: Option<String>,
}

impl LogStoreError {
    /// Creates an error with a message and no provider metadata.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            request_id: None,
            cf_id: None,
        }
    }

    /// Sets the provider error code.
    #[must_use]
    pub fn with_code(mut self, code: Option<String>) -> Self {
        self.code = code;
        self
    }

    /// Sets the provider request ID.
    #[must_use]
    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }

    /// Sets the CDN request ID.
    #[must_use]
    pub fn with_cf_id(mut self, cf_id: Option<String>) -> Self {
        self.cf_id = cf_id;
        self
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the provider error code, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Returns the provider request ID, if any.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Returns the CDN request ID, if any.
    #[must_use]
    pub fn cf_id(&self) -> Option<&str> {
        self.cf_id.as_deref()
    }
}

impl fmt::Display for LogStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "log store error ({code}): {}", self.message),
            None => write!(f, "log store error: {}", self.message),
        }
    }
}

impl std::error::Error for LogStoreError {}
