//! Request executor: turns one logical call into one or more physical attempts.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use log::{debug, warn};
use reqwest::{
    Client,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{fmt, sync::Arc, time::Duration};
use tokio::time::{Instant, sleep, timeout_at};

use crate::config::ClientConfig;

use super::{
    endpoint,
    error::{ApiError, Error, Result},
    request::RequestDescriptor,
    response::{interpret, unwrap_envelope},
    retry::{Backoff, RetryPolicy, is_retriable},
    transport::{PreparedRequest, ReqwestTransport, Transport},
};

const USER_AGENT: &str = concat!("listmonk-cli/", env!("CARGO_PKG_VERSION"));

/// HTTP client with per-attempt timeouts and retry with exponential backoff.
///
/// Cloning is cheap; clones share the transport and the read-only settings.
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    authorization: HeaderValue,
    timeout: Duration,
    retry: RetryPolicy,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("authorization", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

impl HttpClient {
    /// Creates a client that talks to the network through `reqwest`.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::InvalidRequest(format!("failed to build HTTP client: {}", e)))?;
        Self::with_transport(config, Arc::new(ReqwestTransport::new(client)))
    }

    /// Creates a client on top of an arbitrary transport.
    pub fn with_transport(config: &ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        Ok(Self {
            transport,
            base_url: config.base_url.clone(),
            authorization: basic_authorization(&config.username, &config.api_key)?,
            timeout: config.timeout,
            retry: RetryPolicy::new(config.retry_count),
        })
    }

    /// Replaces the backoff schedule used between attempts.
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.retry = self.retry.with_backoff(backoff);
        self
    }

    /// Executes a logical call and returns the payload with its `data`
    /// envelope removed.
    ///
    /// Retriable failures are retried up to the configured retry count; the
    /// error of the last attempt is returned once attempts run out.
    #[tracing::instrument(skip(self, descriptor), fields(method = %descriptor.method, path = %descriptor.path))]
    pub async fn execute(&self, descriptor: RequestDescriptor) -> Result<Value> {
        let request = self.prepare(&descriptor)?;
        let attempts = self.retry.attempts();
        let mut last_error = None;

        for attempt in 0..attempts {
            let error = match self.attempt(&request).await {
                Ok(body) => return Ok(unwrap_envelope(body)),
                Err(e) => Error::from(e),
            };

            if !is_retriable(&error) {
                debug!(
                    "{} {}: non-retriable error: {}",
                    descriptor.method, descriptor.path, error
                );
                return Err(error);
            }

            if attempt + 1 < attempts {
                let delay = self.retry.delay(attempt);
                warn!(
                    "{} {}: attempt {}/{} failed ({}), retrying in {}ms...",
                    descriptor.method,
                    descriptor.path,
                    attempt + 1,
                    attempts,
                    error,
                    delay.as_millis()
                );
                sleep(delay).await;
            }
            last_error = Some(error);
        }

        Err(last_error.unwrap_or_else(|| {
            Error::InvalidRequest(format!("{}: no attempts were made", descriptor.path))
        }))
    }

    /// Like [`execute`](Self::execute), deserializing the payload into `T`.
    pub async fn execute_as<T: DeserializeOwned>(&self, descriptor: RequestDescriptor) -> Result<T> {
        let payload = self.execute(descriptor).await?;
        serde_json::from_value(payload).map_err(Error::Decode)
    }

    /// Single attempt, bounded by its own deadline.
    async fn attempt(&self, request: &PreparedRequest) -> Result<Value, ApiError> {
        let deadline = Instant::now() + self.timeout;

        let response = match timeout_at(deadline, self.transport.send(request.clone())).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(ApiError::transport(format!("{:#}", e))),
            Err(_) => return Err(ApiError::timed_out()),
        };

        interpret(response.status, response.body)
    }

    fn prepare(&self, descriptor: &RequestDescriptor) -> Result<PreparedRequest> {
        let url = endpoint::resolve(&self.base_url, &descriptor.path)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        for (name, value) in &descriptor.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::InvalidRequest(format!("invalid header name {:?}: {}", name, e)))?;
            if name == AUTHORIZATION {
                continue;
            }
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::InvalidRequest(format!("invalid value for header {}: {}", name, e)))?;
            headers.insert(name, value);
        }
        headers.insert(AUTHORIZATION, self.authorization.clone());

        Ok(PreparedRequest {
            method: descriptor.method.clone(),
            url,
            headers,
            body: descriptor.body.clone(),
        })
    }
}

/// `Basic base64(username:secret)`, marked sensitive so it never shows up in logs.
fn basic_authorization(username: &str, secret: &str) -> Result<HeaderValue> {
    let token = BASE64.encode(format!("{}:{}", username, secret));
    let mut value = HeaderValue::from_str(&format!("Basic {}", token))
        .map_err(|e| Error::InvalidRequest(format!("invalid credentials: {}", e)))?;
    value.set_sensitive(true);
    Ok(value)
}
