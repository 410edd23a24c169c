//! Request methods.
//!
//! A [`Request`](crate::Request) carries one of these; transports map it onto
//! [`http::Method`] and the logging interceptor prints its [`Display`] form.

use derive_more::Display;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum Method {
    /// GET method - retrieve a resource.
    #[default]
    #[display("GET")]
    Get,
    /// POST method - create a resource.
    #[display("POST")]
    Post,
    /// PUT method - replace a resource.
    #[display("PUT")]
    Put,
    /// DELETE method - remove a resource.
    #[display("DELETE")]
    Delete,
    /// PATCH method - partially update a resource.
    #[display("PATCH")]
    Patch,
    /// HEAD method - retrieve headers only.
    #[display("HEAD")]
    Head,
    /// OPTIONS method - retrieve allowed methods.
    #[display("OPTIONS")]
    Options,
    /// TRACE method - loop the request back.
    #[display("TRACE")]
    Trace,
    /// CONNECT method - open a tunnel.
    #[display("CONNECT")]
    Connect,
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
            Method::Patch => Self::PATCH,
            Method::Head => Self::HEAD,
            Method::Options => Self::OPTIONS,
            Method::Trace => Self::TRACE,
            Method::Connect => Self::CONNECT,
        }
    }
}

impl TryFrom<http::Method> for Method {
    type Error = crate::Error;

    fn try_from(method: http::Method) -> Result<Self, Self::Error> {
        match method {
            http::Method::GET => Ok(Self::Get),
            http::Method::POST => Ok(Self::Post),
            http::Method::PUT => Ok(Self::Put),
            http::Method::DELETE => Ok(Self::Delete),
            http::Method::PATCH => Ok(Self::Patch),
            http::Method::HEAD => Ok(Self::Head),
            http::Method::OPTIONS => Ok(Self::Options),
            http::Method::TRACE => Ok(Self::Trace),
            http::Method::CONNECT => Ok(Self::Connect),
            other => Err(crate::Error::invalid_request(format!(
                "unsupported HTTP method: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Request;

    const ALL: [Method; 9] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Patch,
        Method::Head,
        Method::Options,
        Method::Trace,
        Method::Connect,
    ];

    #[test]
    fn requests_default_to_get() {
        let request = Request::builder().url("https://api.example.com").build();
        assert_eq!(request.method(), Method::Get);
        assert_eq!(request.method().to_string(), "GET");
    }

    #[test]
    fn method_survives_rebuild() {
        let request = Request::builder()
            .url("https://api.example.com/items")
            .method(Method::Patch)
            .build();
        let rebuilt = request.to_builder().header("X-Trace", "1").build();
        assert_eq!(rebuilt.method(), Method::Patch);
    }

    #[test]
    fn display_matches_wire_token() {
        for method in ALL {
            assert_eq!(method.to_string(), http::Method::from(method).as_str());
        }
    }

    #[test]
    fn wire_method_maps_back() {
        for method in ALL {
            assert_eq!(Method::try_from(http::Method::from(method)).ok(), Some(method));
        }
    }

    #[test]
    fn extension_methods_are_invalid_requests() {
        let custom = http::Method::from_bytes(b"PURGE").expect("valid method token");
        let err = Method::try_from(custom).expect_err("PURGE is not supported");
        assert!(matches!(err, crate::Error::InvalidRequest(_)));
        assert!(err.to_string().contains("PURGE"));
    }
}
