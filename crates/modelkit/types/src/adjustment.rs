//! Partial parameter overrides scoped by major section.

use crate::error::SchemaError;
use crate::parameter_set::json_type;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `section -> (parameter -> new value)`.
///
/// Values may be scalars, nested lists matching the parameter's
/// dimensionality, or array-first item lists; the model decides what it
/// accepts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Adjustment {
    sections: Map<String, Value>,
}

impl Adjustment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one parameter value inside a section, creating the section.
    pub fn set(&mut self, section: &str, param: &str, value: Value) {
        let entry = self
            .sections
            .entry(section.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(params) = entry {
            params.insert(param.to_string(), value);
        }
    }

    /// Builder form of [`Adjustment::set`].
    pub fn with(mut self, section: &str, param: &str, value: impl Into<Value>) -> Self {
        self.set(section, param, value.into());
        self
    }

    pub fn section(&self, name: &str) -> Option<&Map<String, Value>> {
        self.sections.get(name).and_then(Value::as_object)
    }

    pub fn sections(&self) -> impl Iterator<Item = (&str, &Map<String, Value>)> {
        self.sections
            .iter()
            .filter_map(|(name, params)| params.as_object().map(|p| (name.as_str(), p)))
    }

    /// Fold another adjustment in; later values win.
    pub fn merge(&mut self, other: &Adjustment) {
        for (section, params) in other.sections() {
            for (param, value) in params {
                self.set(section, param, value.clone());
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections().all(|(_, params)| params.is_empty())
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.sections.clone())
    }
}

impl TryFrom<Value> for Adjustment {
    type Error = SchemaError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(sections) = value else {
            return Err(SchemaError::InvalidAdjustment(format!(
                "adjustment must be a mapping, found {}",
                json_type(&value)
            )));
        };
        if let Some((name, params)) = sections.iter().find(|(_, params)| !params.is_object()) {
            return Err(SchemaError::InvalidAdjustment(format!(
                "section '{}' must map parameter names to values, found {}",
                name,
                json_type(params)
            )));
        }
        Ok(Self { sections })
    }
}

impl From<Adjustment> for Value {
    fn from(adjustment: Adjustment) -> Self {
        Value::Object(adjustment.sections)
    }
}
