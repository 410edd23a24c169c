//! Prelude module for convenient imports.
//!
//! ```
//! use tether::prelude::*;
//! ```

pub use crate::{
    BinaryBody, BodyEncoder, Client, ClientConfig, Error, Interceptor, JsonBody, JsonResponse,
    LoggingInterceptor, Method, MultipartBody, Outcome, ParamCollection, Request, RequestFlow,
    Response, ResponseFlow, ResponseKind, Result, StatusCode, Transport, UrlEncodedBody, Value,
    header,
};
