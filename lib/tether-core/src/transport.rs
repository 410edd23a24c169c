//! The wire transport contract.
//!
//! The pipeline never touches sockets. It hands a fully encoded
//! [`TransportRequest`] to a [`Transport`] and waits for the future it returns.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::HeaderMap;

use crate::{ClientConfig, Method, Result};

/// Boxed future returned by [`Transport::send`].
pub type TransportFuture = Pin<Box<dyn Future<Output = Result<TransportResponse>> + Send>>;

/// A request ready for the wire.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL, query included.
    pub url: url::Url,
    /// Headers in send order.
    pub headers: Vec<(String, String)>,
    /// Body bytes, if any.
    pub body: Option<Bytes>,
    /// How long the transport may take.
    pub timeout: Duration,
}

/// What came back from the wire.
#[derive(Debug, Clone, Default)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Bytes,
}

impl TransportResponse {
    /// A response with a status and an empty body.
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// Replace the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}

/// Performs HTTP calls on behalf of a client.
///
/// Implementations report failures as [`Error::Connection`](crate::Error::Connection),
/// [`Error::Tls`](crate::Error::Tls) or [`Error::Timeout`](crate::Error::Timeout).
pub trait Transport: Send + Sync + 'static {
    /// Send one request.
    fn send(&self, request: TransportRequest) -> TransportFuture;

    /// An isolated session for a request carrying its own configuration.
    ///
    /// The shared session must not be affected.
    fn session(&self, config: &ClientConfig) -> Arc<dyn Transport>;
}
