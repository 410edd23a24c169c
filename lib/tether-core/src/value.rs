//! Parameter and body values.
//!
//! A [`Value`] is what a query parameter or a form field carries: a scalar, raw
//! bytes, or a nested map/array tree that the
//! [`QueryEncoder`](crate::QueryEncoder) flattens into bracket notation.

use std::collections::BTreeMap;

use bytes::Bytes;

/// A parameter value.
///
/// Maps are key-sorted so flattening a tree always yields the same pair order.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text.
    Str(String),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Boolean, rendered as `true`/`false`.
    Bool(bool),
    /// Raw bytes, rendered as lossy UTF-8.
    Bytes(Bytes),
    /// Nested structure keyed by name.
    Map(BTreeMap<String, Value>),
    /// Nested list.
    Array(Vec<Value>),
}

impl Value {
    /// The string form used on the wire.
    ///
    /// Maps and arrays render as compact JSON.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
            Self::Map(_) | Self::Array(_) => serde_json::Value::from(self.clone()).to_string(),
        }
    }

    /// Returns `true` for anything that is not a map or an array.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, Self::Map(_) | Self::Array(_))
    }

    /// Borrow the text if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::Str(String::new())
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or_else(|_| Self::Str(value.to_string()), Self::Int)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        i64::try_from(value).map_or_else(|_| Self::Str(value.to_string()), Self::Int)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Bytes> for Value {
    fn from(value: Bytes) -> Self {
        Self::Bytes(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Self::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<BTreeMap<String, T>> for Value {
    fn from(map: BTreeMap<String, T>) -> Self {
        Self::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Map(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::default(),
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or_else(|| Self::Str(n.to_string())),
            serde_json::Value::String(s) => Self::Str(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Str(s) => Self::String(s),
            Value::Int(i) => Self::from(i),
            Value::Float(f) => Self::from(f),
            Value::Bool(b) => Self::Bool(b),
            Value::Bytes(b) => Self::String(String::from_utf8_lossy(&b).into_owned()),
            Value::Map(map) => Self::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from(v)))
                    .collect(),
            ),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_scalars() {
        assert_eq!(Value::from("plain").render(), "plain");
        assert_eq!(Value::from(42).render(), "42");
        assert_eq!(Value::from(-7_i64).render(), "-7");
        assert_eq!(Value::from(1.5).render(), "1.5");
        assert_eq!(Value::from(true).render(), "true");
        assert_eq!(Value::from(Bytes::from_static(b"raw")).render(), "raw");
    }

    #[test]
    fn render_nested_as_json() {
        let value: Value = [("b", 2), ("a", 1)].into_iter().collect();
        assert_eq!(value.render(), r#"{"a":1,"b":2}"#);

        let value = Value::from(vec!["x", "y"]);
        assert_eq!(value.render(), r#"["x","y"]"#);
    }

    #[test]
    fn huge_unsigned_falls_back_to_text() {
        assert_eq!(Value::from(u64::MAX), Value::Str(u64::MAX.to_string()));
    }

    #[test]
    fn from_json_value() {
        let json = serde_json::json!({
            "name": "tether",
            "tags": ["http", 1],
            "missing": null,
            "ratio": 0.5,
        });
        let value = Value::from(json);
        let Value::Map(map) = value else {
            panic!("expected a map");
        };
        assert_eq!(map.get("name"), Some(&Value::from("tether")));
        assert_eq!(
            map.get("tags"),
            Some(&Value::Array(vec![Value::from("http"), Value::Int(1)]))
        );
        assert_eq!(map.get("missing"), Some(&Value::default()));
        assert_eq!(map.get("ratio"), Some(&Value::Float(0.5)));
    }

    #[test]
    fn scalar_detection() {
        assert!(Value::from("a").is_scalar());
        assert!(!Value::from(vec![1, 2]).is_scalar());
        assert!(!Value::Map(BTreeMap::new()).is_scalar());
    }
}
