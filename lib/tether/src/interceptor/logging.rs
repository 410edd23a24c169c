//! Request/response logging interceptor.
//!
//! Logs outgoing requests and incoming responses using the `tracing` crate.

use tracing::{debug, info, warn};

use crate::{Interceptor, Request, RequestFlow, Response, ResponseFlow};

/// Log level for the logging interceptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Log at debug level (headers and body sizes included).
    Debug,
    /// Log at info level (summary only).
    #[default]
    Info,
}

/// Interceptor that logs every request and response.
///
/// # Example
///
/// ```
/// use tether::{Client, LoggingInterceptor};
///
/// let client = Client::new();
/// client.add_interceptor(LoggingInterceptor::new());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingInterceptor {
    level: LogLevel,
}

impl LoggingInterceptor {
    /// Create a logging interceptor at info level.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logging interceptor that logs at debug level.
    #[must_use]
    pub const fn debug() -> Self {
        Self {
            level: LogLevel::Debug,
        }
    }

    /// The level in use.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }
}

impl Interceptor for LoggingInterceptor {
    fn handle_request(&self, request: Request) -> RequestFlow {
        let method = request.method();
        let url = request.full_url();
        match self.level {
            LogLevel::Debug => {
                debug!(
                    method = %method,
                    url = %url,
                    headers = ?request.headers(),
                    body_len = request.body().map(|b| b.content_length()),
                    "sending request"
                );
            }
            LogLevel::Info => {
                info!(method = %method, url = %url, "sending request");
            }
        }
        RequestFlow::proceed(request)
    }

    fn handle_response(&self, response: Response) -> ResponseFlow {
        let status = response.status();
        let url = response.request().full_url();

        if let Some(err) = response.attached_error() {
            warn!(status, url = %url, error = %err, "request failed");
        } else if !response.is_success() {
            warn!(status, url = %url, "request failed with HTTP error");
        } else {
            match self.level {
                LogLevel::Debug => {
                    debug!(
                        status,
                        url = %url,
                        headers = ?response.headers(),
                        body_len = response.body().map(bytes::Bytes::len),
                        "request completed"
                    );
                }
                LogLevel::Info => {
                    info!(status, url = %url, "request completed");
                }
            }
        }
        ResponseFlow::proceed(response)
    }
}
