//! Multipart form data support for file uploads.
//!
//! # Example
//!
//! ```
//! use tether_core::{BodyEncoder, MultipartBody};
//!
//! let mut form = MultipartBody::with_boundary("xyz");
//! form.add_value("name", "John Doe");
//! form.add_file_part(vec![0x89, 0x50], "avatar", Some("a.png"), Some("image/png"));
//!
//! let body = form.build().expect("multipart always renders");
//! assert_eq!(body.content_type(), "multipart/form-data; boundary=xyz");
//! assert!(body.payload().starts_with(b"--xyz\r\n"));
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use indexmap::IndexMap;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::{BodyEncoder, Result, Value};

/// Filename used for file parts added without one.
pub const DEFAULT_FILENAME: &str = "form_file";

const CRLF: &[u8] = b"\r\n";

/// Bytes escaped inside quoted disposition parameters.
const DISPOSITION_ENCODE_SET: &AsciiSet = &CONTROLS.add(b'"').add(b'%');

/// Default file extension for a MIME type, or `"file"` when unknown.
///
/// ```
/// assert_eq!(tether_core::default_extension(Some("image/pjpeg")), "pjpeg");
/// assert_eq!(tether_core::default_extension(Some("text/plain")), "file");
/// assert_eq!(tether_core::default_extension(None), "file");
/// ```
#[must_use]
pub fn default_extension(mime_type: Option<&str>) -> &'static str {
    match mime_type {
        Some("image/png") => "png",
        Some("image/jpeg") => "jpeg",
        Some("image/pjpeg") => "pjpeg",
        Some("image/gif") => "gif",
        Some("image/bmp") => "bmp",
        Some("image/tiff") => "tiff",
        _ => "file",
    }
}

/// A single part in a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    name: String,
    filename: Option<String>,
    mime_type: Option<String>,
    data: Bytes,
}

impl Part {
    /// Plain value part: only a disposition header.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            filename: None,
            mime_type: None,
            data: match value.into() {
                Value::Bytes(bytes) => bytes,
                other => Bytes::from(other.render()),
            },
        }
    }

    /// File part with a filename and an optional MIME type.
    #[must_use]
    pub fn file(
        name: impl Into<String>,
        data: impl Into<Bytes>,
        filename: impl Into<String>,
        mime_type: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            filename: Some(filename.into()),
            mime_type,
            data: data.into(),
        }
    }

    /// Get the part name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the filename, if set.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Get the MIME type, if set.
    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    /// Get the part data.
    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    fn content_disposition(&self) -> String {
        let mut disposition = format!(
            "form-data; name=\"{}\"",
            utf8_percent_encode(&self.name, DISPOSITION_ENCODE_SET)
        );
        if let Some(filename) = &self.filename {
            disposition.push_str("; filename=\"");
            disposition.extend(utf8_percent_encode(filename, DISPOSITION_ENCODE_SET));
            disposition.push('"');
        }
        disposition
    }

    fn write_to(&self, buf: &mut BytesMut) {
        buf.put_slice(b"Content-Disposition: ");
        buf.put_slice(self.content_disposition().as_bytes());
        if let Some(mime_type) = &self.mime_type {
            buf.put_slice(CRLF);
            buf.put_slice(b"Content-Type: ");
            buf.put_slice(mime_type.as_bytes());
        }
        buf.put_slice(CRLF);
        buf.put_slice(CRLF);
        buf.put_slice(&self.data);
    }
}

/// `multipart/form-data` body.
///
/// Each body gets a random boundary at construction.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    parts: Vec<Part>,
    boundary: String,
}

impl Default for MultipartBody {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartBody {
    /// Create an empty form with a random boundary.
    #[must_use]
    pub fn new() -> Self {
        Self::with_boundary(generate_boundary())
    }

    /// Create an empty form with a fixed boundary.
    ///
    /// The boundary must not appear in any part data.
    #[must_use]
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            parts: Vec::new(),
            boundary: boundary.into(),
        }
    }

    /// Add a plain named value.
    pub fn add_value(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.parts.push(Part::text(name, value));
    }

    /// Add a file part. The filename defaults to [`DEFAULT_FILENAME`].
    pub fn add_file_part(
        &mut self,
        data: impl Into<Bytes>,
        name: impl Into<String>,
        filename: Option<&str>,
        mime_type: Option<&str>,
    ) {
        self.parts.push(Part::file(
            name,
            data,
            filename.unwrap_or(DEFAULT_FILENAME),
            mime_type.map(str::to_string),
        ));
    }

    /// Add a prepared part, consuming and returning the form.
    #[must_use]
    pub fn part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    /// Remove the part at `index`, if any.
    pub fn remove_part(&mut self, index: usize) -> Option<Part> {
        (index < self.parts.len()).then(|| self.parts.remove(index))
    }

    /// Get the boundary string.
    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Get the parts in this form.
    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }
}

impl BodyEncoder for MultipartBody {
    fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    fn encode(&self) -> Result<Bytes> {
        let mut buf = BytesMut::new();

        buf.put_slice(b"--");
        buf.put_slice(self.boundary.as_bytes());
        buf.put_slice(CRLF);

        for (idx, part) in self.parts.iter().enumerate() {
            if idx > 0 {
                buf.put_slice(CRLF);
                buf.put_slice(b"--");
                buf.put_slice(self.boundary.as_bytes());
                buf.put_slice(CRLF);
            }
            part.write_to(&mut buf);
        }

        buf.put_slice(CRLF);
        buf.put_slice(b"--");
        buf.put_slice(self.boundary.as_bytes());
        buf.put_slice(b"--");
        buf.put_slice(CRLF);

        Ok(buf.freeze())
    }

    fn body_headers(&self, payload: &Bytes) -> IndexMap<String, String> {
        let mut headers = IndexMap::new();
        headers.insert("Content-Type".to_string(), self.content_type());
        headers.insert("Content-Length".to_string(), payload.len().to_string());
        headers
    }
}

/// `Boundary+` followed by 128 random bits in hex.
fn generate_boundary() -> String {
    format!(
        "Boundary+{:016x}{:016x}",
        rand::random::<u64>(),
        rand::random::<u64>()
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn sample() -> MultipartBody {
        let mut form = MultipartBody::with_boundary("b0undary");
        form.add_value("field", "val");
        form.add_file_part(
            Bytes::from_static(b"PNGDATA"),
            "file",
            Some("a.png"),
            Some("image/png"),
        );
        form
    }

    #[test]
    fn boundary_format() {
        let form = MultipartBody::new();
        let hex = form
            .boundary()
            .strip_prefix("Boundary+")
            .expect("boundary prefix");
        assert_eq!(hex.len(), 32);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn boundaries_do_not_repeat() {
        let boundaries: HashSet<String> = (0..10_000)
            .map(|_| MultipartBody::new().boundary().to_string())
            .collect();
        assert_eq!(boundaries.len(), 10_000);
    }

    #[test]
    fn payload_layout() {
        let body = sample().build().expect("build");
        let payload = String::from_utf8_lossy(body.payload()).into_owned();
        insta::assert_snapshot!(payload.replace("\r\n", "\\r\\n\n").trim_end(), @r#"
        --b0undary\r\n
        Content-Disposition: form-data; name="field"\r\n
        \r\n
        val\r\n
        --b0undary\r\n
        Content-Disposition: form-data; name="file"; filename="a.png"\r\n
        Content-Type: image/png\r\n
        \r\n
        PNGDATA\r\n
        --b0undary--\r\n
        "#);
    }

    #[test]
    fn two_parts_second_typed() {
        let body = sample().build().expect("build");
        let payload = String::from_utf8_lossy(body.payload()).into_owned();

        let inner = payload
            .strip_prefix("--b0undary\r\n")
            .and_then(|rest| rest.strip_suffix("\r\n--b0undary--\r\n"))
            .expect("framed by opening and closing boundaries");
        let parts: Vec<&str> = inner.split("\r\n--b0undary\r\n").collect();
        assert_eq!(parts.len(), 2);

        let first = parts.first().expect("first part");
        assert!(!first.contains("Content-Type"));
        assert!(first.starts_with("Content-Disposition: form-data; name=\"field\""));

        let second = parts.get(1).expect("second part");
        assert!(second.contains("Content-Type: image/png"));
        assert!(second.contains("filename=\"a.png\""));
    }

    #[test]
    fn body_headers_track_payload() {
        let body = sample().build().expect("build");
        assert_eq!(body.content_type(), "multipart/form-data; boundary=b0undary");
        assert_eq!(
            body.headers().get("Content-Type").map(String::as_str),
            Some("multipart/form-data; boundary=b0undary")
        );
        assert_eq!(
            body.headers().get("Content-Length"),
            Some(&body.content_length().to_string())
        );
    }

    #[test]
    fn file_part_defaults() {
        let mut form = MultipartBody::with_boundary("x");
        form.add_file_part(vec![1, 2, 3], "upload", None, None);

        let part = form.parts().first().expect("one part");
        assert_eq!(part.filename(), Some(DEFAULT_FILENAME));
        assert_eq!(part.mime_type(), None);
        assert_eq!(part.data().as_ref(), &[1, 2, 3]);
    }

    #[test]
    fn empty_form_still_framed() {
        let body = MultipartBody::with_boundary("x").build().expect("build");
        assert_eq!(body.payload().as_ref(), b"--x\r\n\r\n--x--\r\n");
    }

    #[test]
    fn remove_part() {
        let mut form = sample();
        let removed = form.remove_part(0).expect("first part");
        assert_eq!(removed.name(), "field");
        assert_eq!(form.parts().len(), 1);
        assert!(form.remove_part(5).is_none());
    }

    #[test]
    fn disposition_parameters_are_escaped() {
        let mut form = MultipartBody::with_boundary("x");
        form.add_value("a\"; filename=\"evil.sh", "x");
        form.add_file_part(&b"data"[..], "up\r\nload", Some("100%\".png"), None);

        let body = form.build().expect("build");
        let payload = String::from_utf8_lossy(body.payload()).into_owned();
        assert!(payload.contains("name=\"a%22; filename=%22evil.sh\"\r\n"));
        assert!(payload.contains("name=\"up%0D%0Aload\"; filename=\"100%25%22.png\""));
        assert!(!payload.contains("filename=\"evil.sh\""));
    }

    #[test]
    fn byte_values_are_sent_verbatim() {
        let raw: [u8; 4] = [0x89, 0x50, 0xFF, 0x00];
        let mut form = MultipartBody::with_boundary("x");
        form.add_value("blob", Bytes::copy_from_slice(&raw));

        let part = form.parts().first().expect("one part");
        assert_eq!(part.data().as_ref(), &raw);

        let body = form.build().expect("build");
        assert!(body.payload().windows(raw.len()).any(|w| w == raw));
    }

    #[test]
    fn mime_extensions() {
        assert_eq!(default_extension(Some("image/png")), "png");
        assert_eq!(default_extension(Some("image/jpeg")), "jpeg");
        assert_eq!(default_extension(Some("image/gif")), "gif");
        assert_eq!(default_extension(Some("image/bmp")), "bmp");
        assert_eq!(default_extension(Some("image/tiff")), "tiff");
        assert_eq!(default_extension(Some("application/pdf")), "file");
    }
}
