//! Request body encoders.
//!
//! A [`BodyEncoder`] collects values and renders them to bytes. Nothing is
//! rendered until [`BodyEncoder::build`] is called, which yields a finalized
//! [`RequestBody`]; encoders themselves expose no payload.
//!
//! # Example
//!
//! ```
//! use tether_core::{BodyEncoder, UrlEncodedBody};
//!
//! let body = UrlEncodedBody::new()
//!     .value("name", "ada")
//!     .value("langs", vec!["rust", "ocaml"])
//!     .build()
//!     .expect("named values");
//!
//! assert_eq!(body.content_type(), "application/x-www-form-urlencoded");
//! assert_eq!(body.payload().as_ref(), b"name=ada&langs[]=rust&langs[]=ocaml");
//! assert_eq!(body.content_length(), body.payload().len());
//! ```

use bytes::Bytes;
use indexmap::IndexMap;

use crate::{QueryEncoder, Result, Value};

/// Content type for request bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// JSON content type (`application/json`).
    Json,
    /// Form URL-encoded content type (`application/x-www-form-urlencoded`).
    FormUrlEncoded,
    /// Binary content type (`application/octet-stream`).
    OctetStream,
}

impl ContentType {
    /// Get the MIME type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::FormUrlEncoded => "application/x-www-form-urlencoded",
            Self::OctetStream => "application/octet-stream",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Renders collected body values to bytes.
pub trait BodyEncoder {
    /// Value for the `Content-Type` header.
    fn content_type(&self) -> String;

    /// Render the payload.
    fn encode(&self) -> Result<Bytes>;

    /// Extra headers to merge into the request, given the rendered payload.
    fn body_headers(&self, _payload: &Bytes) -> IndexMap<String, String> {
        IndexMap::new()
    }

    /// Render the payload and freeze it with its metadata.
    fn build(&self) -> Result<RequestBody> {
        let payload = self.encode()?;
        let headers = self.body_headers(&payload);
        Ok(RequestBody {
            content_type: self.content_type(),
            payload,
            headers,
        })
    }
}

/// A finalized request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
    content_type: String,
    payload: Bytes,
    headers: IndexMap<String, String>,
}

impl RequestBody {
    /// Wrap pre-rendered bytes.
    #[must_use]
    pub fn new(content_type: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            content_type: content_type.into(),
            payload: payload.into(),
            headers: IndexMap::new(),
        }
    }

    /// Value for the `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The rendered bytes.
    #[must_use]
    pub const fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Length of the payload in bytes.
    #[must_use]
    pub fn content_length(&self) -> usize {
        self.payload.len()
    }

    /// Headers the encoder asks to merge into the request.
    #[must_use]
    pub const fn headers(&self) -> &IndexMap<String, String> {
        &self.headers
    }
}

/// `application/x-www-form-urlencoded` body.
///
/// Values are flattened the same way query parameters are, so nested maps
/// and arrays use bracket notation.
#[derive(Debug, Clone, Default)]
pub struct UrlEncodedBody {
    values: Vec<(String, Value)>,
    encoder: QueryEncoder,
}

impl UrlEncodedBody {
    /// Create an empty body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different multi-value suffix (default `[]`).
    #[must_use]
    pub fn with_multi_value_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.encoder = QueryEncoder::new(suffix);
        self
    }

    /// Add a named value, consuming and returning the body.
    #[must_use]
    pub fn value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.add_value(name, value);
        self
    }

    /// Add a named value.
    pub fn add_value(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.push((name.into(), value.into()));
    }

    /// Remove the value at `index`, if any.
    pub fn remove_value(&mut self, index: usize) -> Option<(String, Value)> {
        (index < self.values.len()).then(|| self.values.remove(index))
    }

    /// The named values in insertion order.
    #[must_use]
    pub fn values(&self) -> &[(String, Value)] {
        &self.values
    }
}

impl BodyEncoder for UrlEncodedBody {
    fn content_type(&self) -> String {
        ContentType::FormUrlEncoded.to_string()
    }

    fn encode(&self) -> Result<Bytes> {
        let encoded = self
            .encoder
            .encode_values(self.values.iter().map(|(name, value)| (name.as_str(), value)))?;
        Ok(Bytes::from(encoded))
    }
}

/// `application/json` body.
///
/// An unset body renders as an empty payload, not `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonBody {
    json: Option<serde_json::Value>,
}

impl JsonBody {
    /// Create an empty body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a body holding a serializable value.
    pub fn from_serialize<T: serde::Serialize>(value: &T) -> Result<Self> {
        let mut body = Self::new();
        body.set_json(value)?;
        Ok(body)
    }

    /// Replace the JSON value.
    pub fn set_json<T: serde::Serialize>(&mut self, value: &T) -> Result<()> {
        self.json = Some(serde_json::to_value(value)?);
        Ok(())
    }

    /// Clear the JSON value.
    pub fn clear(&mut self) {
        self.json = None;
    }

    /// The JSON value, if set.
    #[must_use]
    pub const fn json(&self) -> Option<&serde_json::Value> {
        self.json.as_ref()
    }
}

impl From<serde_json::Value> for JsonBody {
    fn from(json: serde_json::Value) -> Self {
        Self { json: Some(json) }
    }
}

impl BodyEncoder for JsonBody {
    fn content_type(&self) -> String {
        ContentType::Json.to_string()
    }

    fn encode(&self) -> Result<Bytes> {
        match &self.json {
            Some(json) => to_json(json),
            None => Ok(Bytes::new()),
        }
    }
}

/// Raw bytes passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryBody {
    data: Bytes,
    content_type: String,
}

impl Default for BinaryBody {
    fn default() -> Self {
        Self::new(Bytes::new())
    }
}

impl BinaryBody {
    /// Create a body of `application/octet-stream` bytes.
    #[must_use]
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            content_type: ContentType::OctetStream.to_string(),
        }
    }

    /// Override the content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Replace the data.
    pub fn set_binary_data(&mut self, data: impl Into<Bytes>) {
        self.data = data.into();
    }
}

impl BodyEncoder for BinaryBody {
    fn content_type(&self) -> String {
        self.content_type.clone()
    }

    fn encode(&self) -> Result<Bytes> {
        Ok(self.data.clone())
    }
}

/// Serialize a value to JSON bytes.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// # Example
///
/// ```
/// use tether_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct User { name: String }
///
/// let user = User { name: "Alice".to_string() };
/// let bytes = to_json(&user).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"name":"Alice"}"#);
/// ```
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Into::into)
}

/// Deserialize JSON bytes to a value with path-aware error messages.
///
/// Uses `serde_path_to_error` to provide detailed error messages that include
/// the exact path to the field that failed to deserialize.
///
/// # Errors
///
/// Returns an error if JSON deserialization fails, with the error message
/// including the path to the problematic field (e.g., "user.address.city").
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}
