//! Stock interceptors.
//!
//! Interceptors run in registration order before dispatch and again, in the
//! same order, once the response arrives. See [`Interceptor`](crate::Interceptor).
//!
//! - [`LoggingInterceptor`] - Logs requests/responses using `tracing`
//! - [`BearerAuthInterceptor`] - Adds `Authorization: Bearer <token>` header

mod bearer_auth;
mod logging;

pub use bearer_auth::BearerAuthInterceptor;
pub use logging::{LogLevel, LoggingInterceptor};
