//! Error types for tether.
//!
//! Errors are values: a failed dispatch hands an [`Error`] to the caller
//! alongside (or instead of) a response. Nothing in the pipeline unwinds.

use derive_more::{Display, Error};

/// Numeric codes for the errors the pipeline synthesizes itself.
pub mod codes {
    /// A response arrived with a 4xx/5xx status while the client treats those as errors.
    pub const NON_SUCCESS_STATUS: u32 = 905_531;
    /// The request URL could not be turned into a dispatchable call.
    pub const BAD_URL: u32 = 905_532;
}

/// Main error type for tether operations.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum Error {
    /// The request URL (base URL plus encoded query) is not a valid absolute URL.
    #[display("invalid URL '{url}': {message}")]
    BadUrl {
        /// The full URL that failed to parse.
        url: String,
        /// Parser message.
        message: String,
    },

    /// HTTP-level error synthesized from a 4xx/5xx status.
    #[display("HTTP error {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// Network/connection errors reported by the transport.
    #[display("connection error: {_0}")]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors reported by the transport.
    #[display("TLS error: {_0}")]
    Tls(#[error(not(source))] String),

    /// The transport gave up waiting for the response.
    #[display("request timeout")]
    Timeout,

    /// Invalid request configuration or builder state.
    #[display("invalid request: {_0}")]
    InvalidRequest(#[error(not(source))] String),

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    JsonSerialization(#[error(not(source))] String),

    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    JsonDeserialization {
        /// JSON path to the error (e.g., "user.address.city").
        path: String,
        /// Error message.
        message: String,
    },
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonSerialization(err.to_string())
    }
}

impl Error {
    /// Create a bad URL error.
    #[must_use]
    pub fn bad_url(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadUrl {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create the error attached to a non-success status response.
    #[must_use]
    pub fn status_error(status: u16) -> Self {
        Self::Status {
            status,
            message: format!("the server returned with an error status code ({status})"),
        }
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Numeric code for errors synthesized by the pipeline.
    ///
    /// Transport errors are opaque and carry no code.
    #[must_use]
    pub const fn code(&self) -> Option<u32> {
        match self {
            Self::BadUrl { .. } => Some(codes::BAD_URL),
            Self::Status { .. } => Some(codes::NON_SUCCESS_STATUS),
            _ => None,
        }
    }

    /// Returns the HTTP status code if this is a status error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Human readable message, without the category prefix of [`Display`](std::fmt::Display).
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::BadUrl { message, .. }
            | Self::Status { message, .. }
            | Self::JsonDeserialization { message, .. } => message.clone(),
            Self::Connection(message)
            | Self::Tls(message)
            | Self::InvalidRequest(message)
            | Self::JsonSerialization(message) => message.clone(),
            Self::Timeout => "request timeout".to_string(),
        }
    }

    /// Returns `true` if this is a bad URL error.
    #[must_use]
    pub const fn is_bad_url(&self) -> bool {
        matches!(self, Self::BadUrl { .. })
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns `true` if the error came from the transport rather than the pipeline.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Tls(_) | Self::Timeout)
    }

    /// Returns `true` if this is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    /// Returns `true` if this is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| (500..600).contains(&s))
    }

    /// Returns `true` if this is a 404 Not Found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::status_error(404);
        assert_eq!(
            err.to_string(),
            "HTTP error 404: the server returned with an error status code (404)"
        );

        let err = Error::Timeout;
        assert_eq!(err.to_string(), "request timeout");

        let err = Error::connection("failed to connect");
        assert_eq!(err.to_string(), "connection error: failed to connect");

        let err = Error::bad_url("not a url", "relative URL without a base");
        assert_eq!(
            err.to_string(),
            "invalid URL 'not a url': relative URL without a base"
        );

        let err = Error::json_deserialization("user.address.city", "missing field `city`");
        assert_eq!(
            err.to_string(),
            "JSON deserialization error at 'user.address.city': missing field `city`"
        );
    }

    #[test]
    fn error_codes() {
        assert_eq!(Error::bad_url("x", "y").code(), Some(codes::BAD_URL));
        assert_eq!(
            Error::status_error(500).code(),
            Some(codes::NON_SUCCESS_STATUS)
        );
        assert_eq!(Error::Timeout.code(), None);
        assert_eq!(Error::connection("reset").code(), None);
    }

    #[test]
    fn error_status() {
        let err = Error::status_error(404);
        assert_eq!(err.status(), Some(404));
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
        assert!(err.is_not_found());

        let err = Error::status_error(503);
        assert_eq!(err.status(), Some(503));
        assert!(!err.is_client_error());
        assert!(err.is_server_error());

        assert_eq!(
            Error::status_error(404).message(),
            "the server returned with an error status code (404)"
        );

        let err = Error::Timeout;
        assert_eq!(err.status(), None);
        assert!(!err.is_client_error());
        assert!(!err.is_server_error());
    }

    #[test]
    fn error_categories() {
        assert!(Error::Timeout.is_timeout());
        assert!(Error::Timeout.is_transport());
        assert!(Error::connection("failed").is_connection());
        assert!(Error::tls("bad cert").is_transport());
        assert!(Error::bad_url("x", "y").is_bad_url());
        assert!(!Error::bad_url("x", "y").is_transport());
        assert!(!Error::status_error(400).is_transport());
    }

    #[test]
    fn json_error_conversion() {
        let err = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");
        let err = Error::from(err);
        assert!(matches!(err, Error::JsonSerialization(_)));
    }
}
