//! HTTP response handling.
//!
//! [`Response`] is what the transport produced, tied to the request that
//! caused it. A [`ResponseKind`] re-reads a base response into a richer view,
//! such as [`JsonResponse`].

use bytes::Bytes;
use http::HeaderMap;

use crate::{Error, Request};

/// HTTP response with its originating request, status, headers and body.
///
/// Either side of the pipeline may attach an [`Error`] (for example a
/// non-success status) without discarding the response itself.
#[derive(Debug, Clone)]
pub struct Response {
    request: Request,
    status: u16,
    headers: HeaderMap,
    body: Option<Bytes>,
    error: Option<Error>,
}

impl Response {
    /// Creates a new response.
    #[must_use]
    pub fn new(request: Request, status: u16, headers: HeaderMap, body: Option<Bytes>) -> Self {
        Self {
            request,
            status,
            headers,
            body,
            error: None,
        }
    }

    /// A response with a status and no headers or body.
    #[must_use]
    pub fn with_status(request: Request, status: u16) -> Self {
        Self::new(request, status, HeaderMap::new(), None)
    }

    /// Replace the body.
    #[must_use]
    pub fn body_bytes(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Attach an error.
    #[must_use]
    pub fn error(mut self, error: Error) -> Self {
        self.error = Some(error);
        self
    }

    /// The request that produced this response.
    #[must_use]
    pub const fn request(&self) -> &Request {
        &self.request
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header, if present and valid text.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Response body, if the transport returned one.
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Error attached to this response.
    #[must_use]
    pub const fn attached_error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Detach the error, leaving the response without one.
    #[must_use]
    pub fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }

    /// Consume into (request, status, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (Request, u16, HeaderMap, Option<Bytes>) {
        (self.request, self.status, self.headers, self.body)
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Status is 3xx.
    #[must_use]
    pub const fn is_redirection(&self) -> bool {
        self.status >= 300 && self.status < 400
    }

    /// Status is 4xx.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    /// Status is 5xx.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }

    /// Deserialize the response body as JSON.
    ///
    /// A missing body deserializes like an empty one.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> crate::Result<T> {
        crate::from_json(self.body.as_deref().unwrap_or_default())
    }

    /// Get the response body as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid UTF-8.
    pub fn text(&self) -> Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.as_deref().unwrap_or_default().to_vec())
    }
}

/// A typed view built from a base [`Response`].
///
/// The client converts the final response once, after the interceptors ran.
pub trait ResponseKind: Sized + Send + 'static {
    /// Build this kind from a base response.
    fn from_base(response: Response) -> Self;

    /// The base response.
    fn base(&self) -> &Response;
}

impl ResponseKind for Response {
    fn from_base(response: Response) -> Self {
        response
    }

    fn base(&self) -> &Response {
        self
    }
}

/// A response whose body was parsed as JSON.
///
/// Parsing never fails the call: a malformed body leaves [`JsonResponse::json`]
/// empty and records the reason in [`JsonResponse::parse_error`].
#[derive(Debug, Clone)]
pub struct JsonResponse {
    base: Response,
    json: Option<serde_json::Value>,
    parse_error: Option<Error>,
}

impl JsonResponse {
    /// The parsed body, if any.
    #[must_use]
    pub const fn json(&self) -> Option<&serde_json::Value> {
        self.json.as_ref()
    }

    /// Why the body could not be parsed.
    #[must_use]
    pub const fn parse_error(&self) -> Option<&Error> {
        self.parse_error.as_ref()
    }

    /// Deserialize the body into a concrete type.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> crate::Result<T> {
        self.base.json()
    }

    /// Consume into the base response.
    #[must_use]
    pub fn into_base(self) -> Response {
        self.base
    }
}

impl ResponseKind for JsonResponse {
    fn from_base(response: Response) -> Self {
        let (json, parse_error) = match response.body() {
            Some(body) if !body.is_empty() => match crate::from_json(body) {
                Ok(json) => (Some(json), None),
                Err(err) => (None, Some(err)),
            },
            _ => (None, None),
        };
        Self {
            base: response,
            json,
            parse_error,
        }
    }

    fn base(&self) -> &Response {
        &self.base
    }
}
