//! HTTP transport port
//!
//! Defines the interface the transaction client uses to reach the gateway.
//! Connection pooling and TLS policy are the implementation's business; the
//! core only hands over the URL, the JSON payload and the total timeout.

use std::time::Duration;

use serde_json::Value as JsonValue;
use thiserror::Error;

/// Raw HTTP answer from the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure to get any HTTP answer at all
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Other(String),
}

/// Outbound HTTP transport
///
/// Implementations must not retry: a timed out tokenization may already have
/// been processed by the gateway, and only the caller can decide what to do.
pub trait HttpTransport: Send + Sync {
    /// POST `payload` as JSON to the absolute `url`
    ///
    /// # Arguments
    /// * `url` - Absolute endpoint URL
    /// * `payload` - JSON request body
    /// * `timeout` - Total time allowed for the call
    fn post_json(
        &self,
        url: &str,
        payload: &JsonValue,
        timeout: Duration,
    ) -> std::result::Result<HttpResponse, TransportError>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    fn post_json(
        &self,
        url: &str,
        payload: &JsonValue,
        timeout: Duration,
    ) -> std::result::Result<HttpResponse, TransportError> {
        (**self).post_json(url, payload, timeout)
    }
}

impl<T: HttpTransport + ?Sized> HttpTransport for std::sync::Arc<T> {
    fn post_json(
        &self,
        url: &str,
        payload: &JsonValue,
        timeout: Duration,
    ) -> std::result::Result<HttpResponse, TransportError> {
        (**self).post_json(url, payload, timeout)
    }
}
