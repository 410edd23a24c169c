//! HTTP client with an ordered interceptor chain and pluggable body encoders.
//!
//! Build an immutable [`Request`], hand it to a [`Client`], and get an
//! [`Outcome`] back. Interceptors see the request before it is dispatched
//! and the response after it arrives; either side may rewrite what it sees
//! or halt the chain.
//!
//! # Example
//!
//! ```no_run
//! use tether::prelude::*;
//!
//! # async fn example() -> tether::Result<()> {
//! let client = Client::builder()
//!     .config(ClientConfig::builder().treat_non_success_status_as_error(true).build())
//!     .interceptor(LoggingInterceptor::new())
//!     .build();
//!
//! let form = UrlEncodedBody::new()
//!     .value("name", "Bulbasaur")
//!     .value("types", vec!["grass", "poison"]);
//!
//! let request = Request::builder()
//!     .url("https://api.example.com/pokemon")
//!     .method(Method::Post)
//!     .encoded_body(&form)?
//!     .build();
//!
//! let outcome = client.execute_as::<JsonResponse>(request).await;
//! if let Some(error) = outcome.error {
//!     eprintln!("call failed: {error}");
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod interceptor;
pub mod prelude;
mod transport;

pub use client::{CallHandle, Client, ClientBuilder, Outcome};
pub use interceptor::{BearerAuthInterceptor, LogLevel, LoggingInterceptor};
pub use transport::{BoxedTransportService, HyperTransport, PoolSettings, ServiceTransport};

// Re-export tower for transport middleware composition
pub use tower;

// Re-export core types
pub use tether_core::{
    BinaryBody, BodyEncoder, ClientConfig, ClientConfigBuilder, ContentType,
    DEFAULT_FILENAME, DEFAULT_MULTI_VALUE_SUFFIX, Error, Interceptor, InterceptorChain,
    JsonBody, JsonResponse, KeyPair, Method, MultipartBody, ParamCollection, Part, PreFlight,
    QUERY_COMPONENT, QUERY_STRUCTURE, QueryEncoder, Request, RequestBody, RequestBuilder,
    RequestFlow, Response, ResponseFlow, ResponseKind, Result, Transport, TransportFuture,
    TransportRequest, TransportResponse, UrlEncodedBody, Value, codes, default_extension,
    escape, escape_structure, from_json, full_url, joined_path, parse_query, to_json,
    unescape,
};

// Re-export http types for status codes and headers
pub use tether_core::{HeaderMap, StatusCode, header};

pub use url;
