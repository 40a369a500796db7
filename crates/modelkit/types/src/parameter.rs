//! A single declared parameter.

use crate::error::SchemaError;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Closed set of parameter value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    #[serde(alias = "string")]
    Str,
    #[serde(alias = "integer")]
    Int,
    Float,
    #[serde(alias = "boolean")]
    Bool,
    Date,
}

impl ParamType {
    /// Whether a scalar JSON value is admissible for this type.
    pub fn admits(&self, value: &Value) -> bool {
        match self {
            Self::Str => value.is_string(),
            Self::Int => value.is_i64() || value.is_u64(),
            Self::Float => value.is_number(),
            Self::Bool => value.is_boolean(),
            Self::Date => value
                .as_str()
                .is_some_and(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Date => "date",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `{value, ...labels}` record of an array-first parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueItem {
    pub value: Value,
    /// Dimension labels, e.g. `{"year": 2024}`.
    #[serde(flatten)]
    pub labels: Map<String, Value>,
}

impl ValueItem {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            labels: Map::new(),
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

/// One named configuration knob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    #[serde(deserialize_with = "value_items")]
    pub value: Vec<ValueItem>,
    /// Validator kind -> validator configuration, in declaration order.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub validators: Map<String, Value>,
    /// Nesting depth of the value itself (0 for scalars).
    #[serde(default, skip_serializing_if = "is_zero")]
    pub number_dims: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkbox: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_2: Option<String>,
    /// Members declared through the schema's `additional_members`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Items(Vec<ValueItem>),
    Scalar(Value),
}

/// Accept either the array-first item list or a bare default.
fn value_items<'de, D>(deserializer: D) -> Result<Vec<ValueItem>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawValue::deserialize(deserializer)? {
        RawValue::Items(items) => items,
        RawValue::Scalar(value) => vec![ValueItem::new(value)],
    })
}

impl ParameterSpec {
    pub fn new(title: impl Into<String>, param_type: ParamType, default: impl Into<Value>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            param_type,
            value: vec![ValueItem::new(default)],
            validators: Map::new(),
            number_dims: 0,
            checkbox: None,
            section_1: None,
            section_2: None,
            extra: Map::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_validator(mut self, kind: impl Into<String>, config: Value) -> Self {
        self.validators.insert(kind.into(), config);
        self
    }

    /// Value of the first item: the default the grid strategies start from.
    pub fn default_value(&self) -> Option<&Value> {
        self.value.first().map(|item| &item.value)
    }

    /// True when the value is a single unlabeled item.
    pub fn is_scalar(&self) -> bool {
        self.value.len() == 1 && self.value[0].labels.is_empty()
    }

    /// Check the declared values against the declared type and dimensions.
    pub fn check(&self, name: &str) -> Result<(), SchemaError> {
        if self.title.trim().is_empty() {
            return Err(SchemaError::InvalidParameter {
                name: name.to_string(),
                reason: "title is empty".to_string(),
            });
        }
        if self.value.is_empty() {
            return Err(SchemaError::MissingValue {
                name: name.to_string(),
            });
        }
        for item in &self.value {
            self.check_dims(name, &item.value, self.number_dims)?;
        }
        for (kind, config) in &self.validators {
            if !config.is_object() {
                return Err(SchemaError::InvalidValidator {
                    name: name.to_string(),
                    kind: kind.clone(),
                    reason: "configuration must be a mapping".to_string(),
                });
            }
        }
        Ok(())
    }

    fn check_dims(&self, name: &str, value: &Value, dims: usize) -> Result<(), SchemaError> {
        if dims == 0 {
            if self.param_type.admits(value) {
                return Ok(());
            }
            return Err(SchemaError::TypeMismatch {
                name: name.to_string(),
                expected: self.param_type,
                found: value.to_string(),
            });
        }
        match value.as_array() {
            Some(items) => items
                .iter()
                .try_for_each(|item| self.check_dims(name, item, dims - 1)),
            None => Err(SchemaError::InvalidParameter {
                name: name.to_string(),
                reason: format!("expected a {}-dimensional value, found {}", dims, value),
            }),
        }
    }
}
