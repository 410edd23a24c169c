//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and functions
//! for easy glob importing:
//!
//! ```
//! use tether_core::prelude::*;
//! ```

pub use crate::{
    BinaryBody, BodyEncoder, ClientConfig, Error, Interceptor, JsonBody, JsonResponse, Method,
    MultipartBody, ParamCollection, Request, RequestBody, RequestBuilder, RequestFlow, Response,
    ResponseFlow, ResponseKind, Result, UrlEncodedBody, Value,
};
