//! Bearer token authentication interceptor.
//!
//! Adds an `Authorization: Bearer <token>` header to all outgoing requests.

use std::sync::Arc;

use crate::{Interceptor, Request, RequestFlow};

/// Interceptor that adds bearer token authentication to requests.
///
/// # Example
///
/// ```
/// use tether::{BearerAuthInterceptor, Client};
///
/// let client = Client::new();
/// client.add_interceptor(BearerAuthInterceptor::new("my-secret-token"));
/// ```
#[derive(Clone)]
pub struct BearerAuthInterceptor {
    token: Arc<str>,
}

impl std::fmt::Debug for BearerAuthInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerAuthInterceptor")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl BearerAuthInterceptor {
    /// Create a new bearer auth interceptor with the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Arc::from(token.into()),
        }
    }
}

impl Interceptor for BearerAuthInterceptor {
    fn handle_request(&self, request: Request) -> RequestFlow {
        let request = request
            .to_builder()
            .header("Authorization", format!("Bearer {}", self.token))
            .build();
        RequestFlow::proceed(request)
    }
}
