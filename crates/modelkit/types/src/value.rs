//! Untyped payloads crossing the model contract boundary.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

/// A payload handed back by a model operation.
///
/// This is a superset of JSON. Besides the JSON-native variants it can hold
/// values a model might produce but the interchange format cannot carry
/// directly (dates, raw bytes, dense numeric arrays). Whether a payload is
/// representable is decided by [`crate::interchange`], not at construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ModelValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    /// Integer above `i64::MAX`; kept exact rather than widened to a float.
    UInt(u64),
    Float(f64),
    Str(String),
    List(Vec<ModelValue>),
    /// Ordered mapping; entries keep declaration order.
    Map(Vec<(String, ModelValue)>),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Bytes(Vec<u8>),
    /// Dense numeric array, e.g. a column of model output.
    NumArray(Vec<f64>),
}

impl ModelValue {
    /// Build a map from ordered entries.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ModelValue)>,
    {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Short type label used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) | Self::UInt(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::List(_) => "list",
            Self::Map(_) => "dict",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
            Self::Bytes(_) => "bytes",
            Self::NumArray(_) => "ndarray",
        }
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Self::Map(_))
    }

    pub fn as_map(&self) -> Option<&[(String, ModelValue)]> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ModelValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a key in a map. Returns `None` for non-maps.
    pub fn get(&self, key: &str) -> Option<&ModelValue> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Keys of a map in declaration order; empty for non-maps.
    pub fn keys(&self) -> Vec<&str> {
        self.as_map()
            .map(|entries| entries.iter().map(|(k, _)| k.as_str()).collect())
            .unwrap_or_default()
    }
}

impl From<Value> for ModelValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => Self::Int(i),
                (None, Some(u)) => Self::UInt(u),
                (None, None) => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Self::Str(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect()),
        }
    }
}

impl From<&str> for ModelValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for ModelValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<bool> for ModelValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for ModelValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for ModelValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<NaiveDate> for ModelValue {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<Vec<ModelValue>> for ModelValue {
    fn from(items: Vec<ModelValue>) -> Self {
        Self::List(items)
    }
}
