//! Query-string and form encoding.
//!
//! [`QueryEncoder::encode`] renders a [`ParamCollection`] as `key=value` parts
//! joined by `&`. Repeated keys get the multi-value suffix (`[]` by default) and
//! nested maps/arrays are flattened into bracket notation:
//!
//! ```
//! use tether_core::{ParamCollection, QueryEncoder, Value};
//!
//! let mut params = ParamCollection::new();
//! params.append("id", 1);
//! params.append("id", 2);
//! params.append("user", [("name", "ada")].into_iter().collect::<Value>());
//!
//! let query = QueryEncoder::default().encode(&params);
//! assert_eq!(query, "id[]=1&id[]=2&user[name]=ada");
//! ```

use crate::key_pair::{escape_structure, unescape};
use crate::{Error, KeyPair, ParamCollection, Result, Value};

/// Suffix appended to keys that carry several values.
pub const DEFAULT_MULTI_VALUE_SUFFIX: &str = "[]";

/// Renders parameter collections and nested values as query strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryEncoder {
    multi_value_suffix: String,
}

impl Default for QueryEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_MULTI_VALUE_SUFFIX)
    }
}

impl QueryEncoder {
    /// Create an encoder with the given multi-value suffix.
    #[must_use]
    pub fn new(multi_value_suffix: impl Into<String>) -> Self {
        Self {
            multi_value_suffix: multi_value_suffix.into(),
        }
    }

    /// The multi-value suffix in use.
    #[must_use]
    pub fn multi_value_suffix(&self) -> &str {
        &self.multi_value_suffix
    }

    /// Encode the collection as `k=v&k2=v2`.
    ///
    /// Container values are flattened first. A pair counts as multi-valued when
    /// another pair shares both its key and its prefix; only such pairs without
    /// a prefix or suffix of their own receive the multi-value suffix.
    #[must_use]
    pub fn encode(&self, params: &ParamCollection) -> String {
        let mut pairs = Vec::with_capacity(params.len());
        for pair in params {
            if pair.value().is_scalar() {
                pairs.push(pair.clone());
            } else {
                let prefix = Some(pair.key_prefix()).filter(|p| !p.is_empty());
                self.push_value(prefix, pair.key(), pair.value(), &mut pairs);
            }
        }
        self.encode_pairs(&pairs)
    }

    /// Encode already flattened pairs.
    #[must_use]
    pub fn encode_pairs(&self, pairs: &[KeyPair]) -> String {
        let multi_suffix = escape_structure(&self.multi_value_suffix);
        pairs
            .iter()
            .map(|pair| {
                let plain = pair.key_prefix().is_empty() && pair.key_suffix().is_empty();
                let suffix = if plain && is_multi_value(pairs, pair) {
                    multi_suffix.as_str()
                } else {
                    pair.escaped_key_suffix()
                };
                pair.part_string_with(pair.escaped_key_prefix(), suffix)
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Flatten a value tree into key pairs.
    ///
    /// With a prefix, the prefix names `value`. Without one, `value` must be a
    /// map whose keys name the entries. Map keys come out sorted.
    ///
    /// ```
    /// use tether_core::{QueryEncoder, Value};
    ///
    /// let tags = Value::from(vec!["a", "b"]);
    /// let pairs = QueryEncoder::default().flatten(Some("tags"), &tags).expect("named");
    /// let parts: Vec<String> = pairs.iter().map(|p| p.to_part_string()).collect();
    /// assert_eq!(parts, ["tags[]=a", "tags[]=b"]);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] for a scalar or an array without a prefix,
    /// since nothing names it.
    pub fn flatten(&self, prefix: Option<&str>, value: &Value) -> Result<Vec<KeyPair>> {
        let mut out = Vec::new();
        match (prefix.filter(|p| !p.is_empty()), value) {
            (Some(name), value) => self.push_value(None, name, value, &mut out),
            (None, Value::Map(map)) => {
                for (key, value) in map {
                    self.push_value(None, key, value, &mut out);
                }
            }
            (None, other) => {
                return Err(Error::invalid_request(format!(
                    "cannot flatten an unnamed value: {}",
                    other.render()
                )));
            }
        }
        Ok(out)
    }

    /// Flatten named values and encode them in one pass.
    ///
    /// # Errors
    ///
    /// Propagates [`QueryEncoder::flatten`] errors.
    pub fn encode_values<'a, I>(&self, values: I) -> Result<String>
    where
        I: IntoIterator<Item = (&'a str, &'a Value)>,
    {
        let mut pairs = Vec::new();
        for (name, value) in values {
            pairs.extend(self.flatten(Some(name), value)?);
        }
        Ok(self.encode_pairs(&pairs))
    }

    fn push_value(&self, prefix: Option<&str>, key: &str, value: &Value, out: &mut Vec<KeyPair>) {
        match value {
            Value::Map(map) => {
                let base = join_key(prefix, key);
                for (sub_key, sub_value) in map {
                    self.push_value(Some(&base), sub_key, sub_value, out);
                }
            }
            Value::Array(items) => {
                for item in items {
                    if item.is_scalar() {
                        let mut pair =
                            KeyPair::new(key, item.clone()).with_suffix(&self.multi_value_suffix);
                        if let Some(prefix) = prefix {
                            pair.set_key_prefix(prefix);
                        }
                        out.push(pair);
                    } else {
                        let element =
                            format!("{}{}", join_key(prefix, key), self.multi_value_suffix);
                        self.push_value(Some(&element), "", item, out);
                    }
                }
            }
            scalar => {
                let mut pair = KeyPair::new(key, scalar.clone());
                if let Some(prefix) = prefix {
                    pair.set_key_prefix(prefix);
                }
                out.push(pair);
            }
        }
    }
}

fn join_key(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) if key.is_empty() => prefix.to_string(),
        Some(prefix) => format!("{prefix}[{key}]"),
        None => key.to_string(),
    }
}

fn is_multi_value(pairs: &[KeyPair], pair: &KeyPair) -> bool {
    pairs
        .iter()
        .filter(|other| other.key() == pair.key() && other.key_prefix() == pair.key_prefix())
        .nth(1)
        .is_some()
}

/// Append an encoded query to a URL.
///
/// Uses `&` when the URL already has a query. An empty query leaves the URL as is.
///
/// ```
/// assert_eq!(tether_core::full_url("https://x.dev/a", "q=1"), "https://x.dev/a?q=1");
/// assert_eq!(tether_core::full_url("https://x.dev/a?p=2", "q=1"), "https://x.dev/a?p=2&q=1");
/// assert_eq!(tether_core::full_url("https://x.dev/a#top", "q=1"), "https://x.dev/a?q=1#top");
/// ```
#[must_use]
pub fn full_url(base: &str, query: &str) -> String {
    let (base, fragment) = split_fragment(base);
    if query.is_empty() {
        format!("{base}{fragment}")
    } else if base.contains('?') {
        format!("{base}&{query}{fragment}")
    } else {
        format!("{base}?{query}{fragment}")
    }
}

/// Append `parts` to `path`, one `/` before each.
///
/// A single trailing `/` on `path` is dropped first. Without parts the path is
/// returned as is.
///
/// ```
/// assert_eq!(tether_core::joined_path("/docs/", ["info", "user"]), "/docs/info/user");
/// assert_eq!(tether_core::joined_path("", ["info"]), "/info");
/// ```
#[must_use]
pub fn joined_path<I>(path: &str, parts: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut parts = parts.into_iter().peekable();
    if parts.peek().is_none() {
        return path.to_string();
    }
    let mut joined = path.strip_suffix('/').unwrap_or(path).to_string();
    for part in parts {
        joined.push('/');
        joined.push_str(part.as_ref());
    }
    joined
}

/// Split a URL before its `#fragment`. The fragment keeps its `#`.
pub(crate) fn split_fragment(url: &str) -> (&str, &str) {
    url.find('#').map_or((url, ""), |at| url.split_at(at))
}

/// Parse the query part of a URL into a collection.
///
/// Parts without exactly one `=` are skipped. Keys and values are percent-decoded.
#[must_use]
pub fn parse_query(url: &str) -> ParamCollection {
    let (url, _) = split_fragment(url);
    let Some((_, query)) = url.split_once('?') else {
        return ParamCollection::new();
    };

    query
        .split('&')
        .filter_map(|part| {
            let (key, value) = part.split_once('=')?;
            if value.contains('=') {
                return None;
            }
            Some(KeyPair::new(unescape(key), unescape(value)))
        })
        .collect()
}
