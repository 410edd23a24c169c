//! HTTP request building.
//!
//! Requests are immutable once built. To change one, seed a new builder with
//! [`Request::to_builder`].
//!
//! # Example
//!
//! ```
//! use tether_core::{Method, Request};
//!
//! let request = Request::builder()
//!     .url("https://api.example.com/users")
//!     .method(Method::Get)
//!     .header("Accept", "application/json")
//!     .param("page", 1)
//!     .build();
//!
//! assert_eq!(request.full_url(), "https://api.example.com/users?page=1");
//! ```

use indexmap::IndexMap;

use crate::query::{full_url, parse_query, split_fragment};
use crate::{
    BodyEncoder, ClientConfig, JsonBody, Method, ParamCollection, QueryEncoder, RequestBody, Value,
};

/// An HTTP request description.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    url: String,
    method: Method,
    params: ParamCollection,
    headers: IndexMap<String, String>,
    body: Option<RequestBody>,
    config: Option<ClientConfig>,
}

impl Request {
    /// Creates a new [`RequestBuilder`].
    #[must_use]
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    /// A builder seeded with every field of this request.
    #[must_use]
    pub fn to_builder(&self) -> RequestBuilder {
        RequestBuilder {
            request: self.clone(),
        }
    }

    /// Base URL, without the encoded parameters.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Query parameters.
    #[must_use]
    pub const fn params(&self) -> &ParamCollection {
        &self.params
    }

    /// Request headers in insertion order.
    #[must_use]
    pub const fn headers(&self) -> &IndexMap<String, String> {
        &self.headers
    }

    /// Single header value by name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    /// Per-request configuration override.
    #[must_use]
    pub const fn config(&self) -> Option<&ClientConfig> {
        self.config.as_ref()
    }

    /// URL with the encoded parameters, using the request's own multi-value
    /// suffix when it carries a configuration.
    #[must_use]
    pub fn full_url(&self) -> String {
        let encoder = self
            .config
            .as_ref()
            .map(ClientConfig::query_encoder)
            .unwrap_or_default();
        self.full_url_with(&encoder)
    }

    /// URL with the parameters encoded by `encoder`.
    #[must_use]
    pub fn full_url_with(&self, encoder: &QueryEncoder) -> String {
        full_url(&self.url, &encoder.encode(&self.params))
    }

    /// Headers as sent: request headers, then the body's content type, then
    /// the body's own headers. Later layers replace earlier ones regardless of
    /// name case.
    #[must_use]
    pub fn wire_headers(&self) -> Vec<(String, String)> {
        let mut headers: Vec<(String, String)> = self
            .headers
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        if let Some(body) = &self.body {
            let layers = std::iter::once(("Content-Type", body.content_type())).chain(
                body.headers()
                    .iter()
                    .map(|(name, value)| (name.as_str(), value.as_str())),
            );
            for (name, value) in layers {
                headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
                headers.push((name.to_string(), value.to_string()));
            }
        }
        headers
    }
}

/// Builder for constructing [`Request`] instances.
///
/// Defaults to `GET` with an empty URL. Setters may be called in any order.
#[derive(Debug, Clone, Default)]
pub struct RequestBuilder {
    request: Request,
}

impl RequestBuilder {
    /// Sets the base URL.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.request.url = url.into();
        self
    }

    /// Sets the base URL, moving any query it carries into the parameters.
    ///
    /// A `#fragment` stays on the base URL.
    #[must_use]
    pub fn url_with_params(mut self, url: &str) -> Self {
        let (without_fragment, fragment) = split_fragment(url);
        let base = without_fragment
            .split_once('?')
            .map_or(without_fragment, |(base, _)| base);
        self.request.url = format!("{base}{fragment}");
        self.request.params.extend(parse_query(url));
        self
    }

    /// Sets the HTTP method.
    #[must_use]
    pub const fn method(mut self, method: Method) -> Self {
        self.request.method = method;
        self
    }

    /// Replaces the query parameters.
    #[must_use]
    pub fn params(mut self, params: ParamCollection) -> Self {
        self.request.params = params;
        self
    }

    /// Appends a query parameter. Existing values for the key are kept.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.request.params.append(key, value);
        self
    }

    /// Replaces all headers.
    #[must_use]
    pub fn headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.request.headers = headers
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();
        self
    }

    /// Sets a header. The last write wins.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.headers.insert(name.into(), value.into());
        self
    }

    /// Sets a finalized body.
    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.request.body = Some(body);
        self
    }

    /// Builds `encoder` and sets the result as the body.
    ///
    /// # Errors
    ///
    /// Returns an error if the encoder fails to render its payload.
    pub fn encoded_body(self, encoder: &impl BodyEncoder) -> crate::Result<Self> {
        Ok(self.body(encoder.build()?))
    }

    /// Set a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn json<T: serde::Serialize>(self, value: &T) -> crate::Result<Self> {
        self.encoded_body(&JsonBody::from_serialize(value)?)
    }

    /// Sets a per-request configuration.
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.request.config = Some(config);
        self
    }

    /// Builds the [`Request`].
    #[must_use]
    pub fn build(self) -> Request {
        self.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MultipartBody, UrlEncodedBody};

    #[test]
    fn builder_defaults() {
        let request = Request::builder().build();
        assert_eq!(request.method(), Method::Get);
        assert_eq!(request.url(), "");
        assert!(request.params().is_empty());
        assert!(request.headers().is_empty());
        assert!(request.body().is_none());
        assert!(request.config().is_none());
    }

    #[test]
    fn builder_order_does_not_matter() {
        let a = Request::builder()
            .url("https://api.example.com")
            .method(Method::Post)
            .header("Accept", "application/json")
            .build();
        let b = Request::builder()
            .header("Accept", "application/json")
            .method(Method::Post)
            .url("https://api.example.com")
            .build();
        assert_eq!(a, b);
    }

    #[test]
    fn header_last_write_wins() {
        let request = Request::builder()
            .header("X-A", "1")
            .header("X-B", "2")
            .header("X-A", "3")
            .build();
        let headers: Vec<(&str, &str)> = request
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(headers, [("X-A", "3"), ("X-B", "2")]);
    }

    #[test]
    fn headers_replace() {
        let request = Request::builder()
            .header("X-Old", "1")
            .headers([("X-New", "2")])
            .build();
        assert_eq!(request.header("X-Old"), None);
        assert_eq!(request.header("X-New"), Some("2"));
    }

    #[test]
    fn to_builder_copies_everything() {
        let original = Request::builder()
            .url("https://api.example.com/items")
            .method(Method::Put)
            .param("id", 7)
            .header("Accept", "text/plain")
            .json(&serde_json::json!({"a": 1}))
            .expect("json")
            .config(ClientConfig::default())
            .build();

        let copy = original.to_builder().build();
        assert_eq!(copy, original);

        let changed = original.to_builder().method(Method::Delete).build();
        assert_eq!(changed.method(), Method::Delete);
        assert_eq!(original.method(), Method::Put);
    }

    #[test]
    fn full_url_encodes_params() {
        let request = Request::builder()
            .url("https://www.youtube.com/watch")
            .param("v", "dQw4w9WgXcQ")
            .build();
        assert_eq!(request.full_url(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");

        let request = Request::builder()
            .url("https://api.example.com/search?lang=en")
            .param("tag", "a")
            .param("tag", "b")
            .build();
        assert_eq!(
            request.full_url(),
            "https://api.example.com/search?lang=en&tag[]=a&tag[]=b"
        );
    }

    #[test]
    fn full_url_uses_request_suffix() {
        let request = Request::builder()
            .url("https://api.example.com")
            .param("tag", "a")
            .param("tag", "b")
            .config(ClientConfig::builder().multi_value_suffix("").build())
            .build();
        assert_eq!(request.full_url(), "https://api.example.com?tag=a&tag=b");
    }

    #[test]
    fn url_with_params_moves_query() {
        let request = Request::builder()
            .url_with_params("https://api.example.com/list?page=2&q=a%20b")
            .param("size", 10)
            .build();
        assert_eq!(request.url(), "https://api.example.com/list");
        assert_eq!(request.params().get("q").map(Value::render), Some("a b".to_string()));
        assert_eq!(
            request.full_url(),
            "https://api.example.com/list?page=2&q=a%20b&size=10"
        );
    }

    #[test]
    fn url_with_params_keeps_fragment() {
        let request = Request::builder()
            .url_with_params("https://api.example.com/docs?lang=rust#install")
            .param("v", 2)
            .build();
        assert_eq!(request.url(), "https://api.example.com/docs#install");
        assert_eq!(request.params().len(), 2);
        assert_eq!(
            request.full_url(),
            "https://api.example.com/docs?lang=rust&v=2#install"
        );
    }

    #[test]
    fn wire_headers_body_wins() {
        let form = UrlEncodedBody::new().value("a", 1);
        let request = Request::builder()
            .header("content-type", "text/plain")
            .header("Accept", "*/*")
            .encoded_body(&form)
            .expect("form")
            .build();

        assert_eq!(
            request.wire_headers(),
            [
                ("Accept".to_string(), "*/*".to_string()),
                (
                    "Content-Type".to_string(),
                    "application/x-www-form-urlencoded".to_string()
                ),
            ]
        );
    }

    #[test]
    fn wire_headers_include_multipart_length() {
        let form = MultipartBody::with_boundary("b");
        let request = Request::builder()
            .encoded_body(&form)
            .expect("multipart")
            .build();
        let length = request.body().expect("body").content_length().to_string();

        let headers = request.wire_headers();
        assert!(headers.contains(&(
            "Content-Type".to_string(),
            "multipart/form-data; boundary=b".to_string()
        )));
        assert!(headers.contains(&("Content-Length".to_string(), length)));
        assert_eq!(headers.len(), 2);
    }
}
