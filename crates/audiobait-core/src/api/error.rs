//! Classified API failures.
//!
//! Every failure coming out of [`ApiClient`](super::ApiClient) carries a
//! `permanent` flag. Callers retry only temporary ones.

use thiserror::Error;

/// Error returned by API calls, with its retry classification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    message: String,
    permanent: bool,
    /// Response status when the exchange completed.
    status: Option<u16>,
}

impl ApiError {
    pub fn new(message: impl Into<String>, permanent: bool) -> Self {
        Self {
            message: message.into(),
            permanent,
            status: None,
        }
    }

    /// A failure that retrying the same request cannot fix.
    pub fn permanent(message: impl Into<String>) -> Self {
        Self::new(message, true)
    }

    /// A failure that may go away on retry.
    pub fn temporary(message: impl Into<String>) -> Self {
        Self::new(message, false)
    }

    /// Classify a completed exchange that returned a non-success status.
    ///
    /// Client errors (4xx) are permanent, anything else is temporary.
    pub fn from_status(status: u16, body: &str) -> Self {
        Self {
            status: Some(status),
            ..Self::new(
                format!("HTTP request failed ({status}): {body}"),
                is_http_client_error(status),
            )
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether retrying is pointless.
    pub fn is_permanent(&self) -> bool {
        self.permanent
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// The backend rejected the token; a fresh one may fix it.
    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_status(status.as_u16(), &err.to_string());
        }
        if err.is_decode() {
            return Self::permanent(format!("decode: {err}"));
        }
        if err.is_builder() {
            return Self::permanent(format!("invalid request: {err}"));
        }
        // The exchange never completed: refused, timed out, reset, DNS.
        Self::temporary(err.to_string())
    }
}

/// Whether `err` is a permanent failure.
///
/// Errors that are not [`ApiError`]s are treated as permanent so unknown
/// failures are never retried automatically.
pub fn is_permanent_error(err: &(dyn std::error::Error + 'static)) -> bool {
    match err.downcast_ref::<ApiError>() {
        Some(api_err) => api_err.is_permanent(),
        None => true,
    }
}

pub(crate) fn is_http_success(code: u16) -> bool {
    (200..300).contains(&code)
}

pub(crate) fn is_http_client_error(code: u16) -> bool {
    (400..500).contains(&code)
}
