//! Error types produced by the request-execution core.

use serde_json::Value;

use super::retry::is_retriable_status;

/// Why a physical attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The per-attempt deadline fired before the response was fully read.
    Timeout,
    /// Connection, DNS, TLS or body-read failure. No HTTP status is available.
    Transport,
    /// The server answered with a non-2xx status.
    Status,
    /// The server answered 2xx but the body is an error message envelope.
    Application,
}

/// Structured error surfaced for any failed API call.
///
/// `status` is `0` when no response was received (timeouts and transport
/// failures); `kind` tells those two apart.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    kind: FailureKind,
    message: String,
    status: u16,
    body: Option<Value>,
    raw_body: Option<String>,
}

impl ApiError {
    pub fn timed_out() -> Self {
        Self {
            kind: FailureKind::Timeout,
            message: "Request timed out".to_string(),
            status: 0,
            body: None,
            raw_body: None,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Transport,
            message: message.into(),
            status: 0,
            body: None,
            raw_body: None,
        }
    }

    /// A non-2xx response.
    pub fn rejected(
        status: u16,
        message: impl Into<String>,
        body: Option<Value>,
        raw_body: impl Into<String>,
    ) -> Self {
        Self {
            kind: FailureKind::Status,
            message: message.into(),
            status,
            body,
            raw_body: Some(raw_body.into()),
        }
    }

    /// A 2xx response whose body carries an error message instead of data.
    pub fn application(
        status: u16,
        message: impl Into<String>,
        body: Option<Value>,
        raw_body: impl Into<String>,
    ) -> Self {
        Self {
            kind: FailureKind::Application,
            message: message.into(),
            status,
            body,
            raw_body: Some(raw_body.into()),
        }
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Decoded response body, if any was received.
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn raw_body(&self) -> Option<&str> {
        self.raw_body.as_deref()
    }

    pub fn is_retriable(&self) -> bool {
        is_retriable_status(self.status)
    }
}

/// Error returned by [`HttpClient`](super::HttpClient) calls.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The request could not be built (bad URL, header, or payload).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The unwrapped payload did not match the expected shape.
    #[error("failed to decode response payload: {0}")]
    Decode(#[source] serde_json::Error),
}

impl Error {
    /// Returns the structured API error, if this is one.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(api) => Some(api),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
