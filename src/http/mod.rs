//! Resilient request execution: endpoint resolution, per-attempt timeouts,
//! retry with exponential backoff, and structured error classification.

mod client;
pub mod endpoint;
mod error;
mod request;
pub mod response;
pub mod retry;
mod transport;

pub use client::HttpClient;
pub use error::{ApiError, Error, FailureKind, Result};
pub use request::RequestDescriptor;
pub use retry::{Backoff, RetryPolicy};
pub use transport::{PreparedRequest, RawResponse, ReqwestTransport, Transport};

#[cfg(test)]
pub use transport::MockTransport;
