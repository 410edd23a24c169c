//! Single key/value entries with their percent-encoded projections.

use percent_encoding::{
    AsciiSet, NON_ALPHANUMERIC, percent_decode_str, percent_encode, utf8_percent_encode,
};

use crate::Value;

/// Bytes escaped in keys and values.
///
/// Everything except alphanumerics, the unreserved marks `- . _ ~`, and the
/// query-safe `/ ?`. Delimiters such as `&`, `=`, `[`, `]` are literal content here.
pub const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/')
    .remove(b'?');

/// Bytes escaped in key prefixes and suffixes, which carry bracket structure.
pub const QUERY_STRUCTURE: &AsciiSet = &QUERY_COMPONENT.remove(b'[').remove(b']');

/// Percent-encode a key or value.
#[must_use]
pub fn escape(input: &str) -> String {
    utf8_percent_encode(input, QUERY_COMPONENT).to_string()
}

/// Percent-encode a key prefix or suffix, keeping `[` and `]`.
#[must_use]
pub fn escape_structure(input: &str) -> String {
    utf8_percent_encode(input, QUERY_STRUCTURE).to_string()
}

/// Percent-encode a value. Raw bytes are encoded byte for byte.
fn escape_value(value: &Value) -> String {
    match value {
        Value::Bytes(bytes) => percent_encode(bytes, QUERY_COMPONENT).to_string(),
        other => escape(&other.render()),
    }
}

/// Decode a percent-encoded component. Invalid UTF-8 is replaced.
#[must_use]
pub fn unescape(input: &str) -> String {
    percent_decode_str(input).decode_utf8_lossy().into_owned()
}

/// A key/value parameter, optionally bracket-prefixed and suffixed.
///
/// Escaped projections are recomputed by every setter, so they always match
/// the current plain fields.
///
/// ```
/// use tether_core::KeyPair;
///
/// let pair = KeyPair::new("a b", "c&d");
/// assert_eq!(pair.to_part_string(), "a%20b=c%26d");
///
/// let nested = KeyPair::new("city", "Paris").with_prefix("user[address]");
/// assert_eq!(nested.to_part_string(), "user[address][city]=Paris");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct KeyPair {
    key: String,
    value: Value,
    key_prefix: String,
    key_suffix: String,
    escaped_key: String,
    escaped_value: String,
    escaped_key_prefix: String,
    escaped_key_suffix: String,
}

impl KeyPair {
    /// Create a pair with no prefix or suffix.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        Self {
            escaped_key: escape(&key),
            escaped_value: escape_value(&value),
            key,
            value,
            key_prefix: String::new(),
            key_suffix: String::new(),
            escaped_key_prefix: String::new(),
            escaped_key_suffix: String::new(),
        }
    }

    /// Set the key prefix, consuming and returning the pair.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.set_key_prefix(prefix);
        self
    }

    /// Set the key suffix, consuming and returning the pair.
    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.set_key_suffix(suffix);
        self
    }

    /// The plain key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The plain value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// The plain key prefix (empty when unset).
    #[must_use]
    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    /// The plain key suffix (empty when unset).
    #[must_use]
    pub fn key_suffix(&self) -> &str {
        &self.key_suffix
    }

    /// The escaped key.
    #[must_use]
    pub fn escaped_key(&self) -> &str {
        &self.escaped_key
    }

    /// The escaped rendered value.
    #[must_use]
    pub fn escaped_value(&self) -> &str {
        &self.escaped_value
    }

    /// The escaped key prefix.
    #[must_use]
    pub fn escaped_key_prefix(&self) -> &str {
        &self.escaped_key_prefix
    }

    /// The escaped key suffix.
    #[must_use]
    pub fn escaped_key_suffix(&self) -> &str {
        &self.escaped_key_suffix
    }

    /// Replace the key.
    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key = key.into();
        self.escaped_key = escape(&self.key);
    }

    /// Replace the value.
    pub fn set_value(&mut self, value: impl Into<Value>) {
        self.value = value.into();
        self.escaped_value = escape_value(&self.value);
    }

    /// Replace the key prefix.
    pub fn set_key_prefix(&mut self, prefix: impl Into<String>) {
        self.key_prefix = prefix.into();
        self.escaped_key_prefix = escape_structure(&self.key_prefix);
    }

    /// Replace the key suffix.
    pub fn set_key_suffix(&mut self, suffix: impl Into<String>) {
        self.key_suffix = suffix.into();
        self.escaped_key_suffix = escape_structure(&self.key_suffix);
    }

    /// Render as `key=value` using the pair's own prefix and suffix.
    #[must_use]
    pub fn to_part_string(&self) -> String {
        self.part_string_with(&self.escaped_key_prefix, &self.escaped_key_suffix)
    }

    /// Render with an explicit, already escaped, prefix and suffix.
    ///
    /// Produces `prefix[key]suffix=value`, or `keysuffix=value` when `prefix` is empty.
    /// An empty key means the prefix names the value on its own: `prefixsuffix=value`.
    #[must_use]
    pub fn part_string_with(&self, prefix: &str, suffix: &str) -> String {
        if prefix.is_empty() || self.escaped_key.is_empty() {
            format!("{prefix}{}{suffix}={}", self.escaped_key, self.escaped_value)
        } else {
            format!("{prefix}[{}]{suffix}={}", self.escaped_key, self.escaped_value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_delimiters() {
        assert_eq!(escape("a b"), "a%20b");
        assert_eq!(
            escape(":#[]@!$&'()*+,;="),
            "%3A%23%5B%5D%40%21%24%26%27%28%29%2A%2B%2C%3B%3D"
        );
        assert_eq!(escape("safe-._~/?"), "safe-._~/?");
        assert_eq!(escape("é"), "%C3%A9");
    }

    #[test]
    fn structure_keeps_brackets() {
        assert_eq!(escape_structure("user[address]"), "user[address]");
        assert_eq!(escape_structure("a b[]"), "a%20b[]");
    }

    #[test]
    fn unescape_reverses_escape() {
        let raw = "name=Jean & co/é";
        assert_eq!(unescape(&escape(raw)), raw);
    }

    #[test]
    fn part_string_plain() {
        let pair = KeyPair::new("a b", "c&d");
        assert_eq!(pair.to_part_string(), "a%20b=c%26d");
    }

    #[test]
    fn part_string_with_prefix_and_suffix() {
        let pair = KeyPair::new("tags", "x").with_prefix("post").with_suffix("[]");
        assert_eq!(pair.to_part_string(), "post[tags][]=x");

        let pair = KeyPair::new("ids", 3).with_suffix("[]");
        assert_eq!(pair.to_part_string(), "ids[]=3");
    }

    #[test]
    fn part_string_with_explicit_affixes() {
        let pair = KeyPair::new("q", "rust");
        assert_eq!(pair.part_string_with("", "[]"), "q[]=rust");
        assert_eq!(pair.part_string_with("search", ""), "search[q]=rust");

        let unnamed = KeyPair::new("", "x");
        assert_eq!(unnamed.part_string_with("grid[]", "[]"), "grid[][]=x");
    }

    #[test]
    fn escaped_fields_follow_mutations() {
        let mut pair = KeyPair::new("k", "v");
        pair.set_key("new key");
        pair.set_value("a+b");
        pair.set_key_prefix("outer thing");
        pair.set_key_suffix("[]");

        assert_eq!(pair.escaped_key(), escape(pair.key()));
        assert_eq!(pair.escaped_value(), escape(&pair.value().render()));
        assert_eq!(pair.escaped_key_prefix(), "outer%20thing");
        assert_eq!(pair.escaped_key_suffix(), "[]");
        assert_eq!(pair.to_part_string(), "outer%20thing[new%20key][]=a%2Bb");
    }

    #[test]
    fn byte_values_escape_every_byte() {
        let pair = KeyPair::new("b", bytes::Bytes::from_static(&[0xFF, b'a', 0x00]));
        assert_eq!(pair.to_part_string(), "b=%FFa%00");

        let mut pair = KeyPair::new("b", "text");
        pair.set_value(bytes::Bytes::from_static(&[0x89, 0x50]));
        assert_eq!(pair.escaped_value(), "%89P");
    }

    #[test]
    fn scalar_values_render_before_escaping() {
        assert_eq!(KeyPair::new("flag", true).to_part_string(), "flag=true");
        assert_eq!(KeyPair::new("ratio", 0.25).to_part_string(), "ratio=0.25");
    }
}
