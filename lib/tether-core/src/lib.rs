//! Core types and traits for the tether HTTP client.
//!
//! This crate provides the I/O-free building blocks used by tether:
//! - [`Value`], [`KeyPair`] and [`ParamCollection`] - parameter model
//! - [`QueryEncoder`] - query-string encoding and nested value flattening
//! - [`BodyEncoder`] and its implementations - request body rendering
//! - [`Request`] and [`RequestBuilder`] - immutable request descriptions
//! - [`Response`] and [`ResponseKind`] - responses and typed views over them
//! - [`Interceptor`] and [`InterceptorChain`] - the pre/post-flight pipeline
//! - [`Transport`] - the contract a wire transport fulfils
//! - [`ClientConfig`] - client and per-request configuration
//! - [`Error`] and [`Result`] - Error handling

mod body;
mod config;
mod error;
mod interceptor;
mod key_pair;
mod method;
mod multipart;
mod params;
pub mod prelude;
mod query;
mod request;
mod response;
mod transport;
mod value;

pub use body::{
    BinaryBody, BodyEncoder, ContentType, JsonBody, RequestBody, UrlEncodedBody, from_json,
    to_json,
};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{Error, Result, codes};
pub use interceptor::{Interceptor, InterceptorChain, PreFlight, RequestFlow, ResponseFlow};
pub use key_pair::{KeyPair, QUERY_COMPONENT, QUERY_STRUCTURE, escape, escape_structure, unescape};
pub use method::Method;
pub use multipart::{DEFAULT_FILENAME, MultipartBody, Part, default_extension};
pub use params::ParamCollection;
pub use query::{DEFAULT_MULTI_VALUE_SUFFIX, QueryEncoder, full_url, joined_path, parse_query};
pub use request::{Request, RequestBuilder};
pub use response::{JsonResponse, Response, ResponseKind};
pub use transport::{Transport, TransportFuture, TransportRequest, TransportResponse};
pub use value::Value;

// Re-export http crate types for status codes and headers
pub use http::{HeaderMap, StatusCode, header};
