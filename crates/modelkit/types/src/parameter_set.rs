//! Named collections of parameters and the validated factory that builds them.

use crate::error::SchemaError;
use crate::parameter::ParameterSpec;
use serde_json::{Map, Value};

/// Reserved key holding the schema block of a defaults mapping.
pub const SCHEMA_KEY: &str = "schema";

/// Ordered mapping from parameter name to [`ParameterSpec`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    schema: Option<Value>,
    parameters: Vec<(String, ParameterSpec)>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a parameter, keeping first-declaration order.
    pub fn insert(&mut self, name: impl Into<String>, spec: ParameterSpec) {
        let name = name.into();
        match self.parameters.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = spec,
            None => self.parameters.push((name, spec)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, spec)| spec)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Parameter names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterSpec)> {
        self.parameters.iter().map(|(n, spec)| (n.as_str(), spec))
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// The lifted `schema` block, if the defaults carried one.
    pub fn schema(&self) -> Option<&Value> {
        self.schema.as_ref()
    }

    /// Default (first item) value of a parameter.
    pub fn default_value(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(ParameterSpec::default_value)
    }

    /// Render the set as JSON.
    ///
    /// With `meta_data` each entry is the full spec object. Without it each
    /// entry is the parameter's value: a single unlabeled item collapses to
    /// its scalar, anything else stays an item list.
    pub fn specification(&self, meta_data: bool) -> Map<String, Value> {
        self.parameters
            .iter()
            .map(|(name, spec)| {
                let rendered = if meta_data {
                    serde_json::to_value(spec).unwrap_or(Value::Null)
                } else if spec.is_scalar() {
                    spec.value[0].value.clone()
                } else {
                    serde_json::to_value(&spec.value).unwrap_or(Value::Null)
                };
                (name.clone(), rendered)
            })
            .collect()
    }

    /// Members the schema allows beyond the built-in spec fields.
    fn additional_members(&self) -> Vec<&str> {
        self.schema
            .as_ref()
            .and_then(|s| s.get("additional_members"))
            .and_then(Value::as_object)
            .map(|members| members.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// Build a [`ParameterSet`] from a raw defaults mapping.
///
/// The mapping must be a JSON object. A `schema` entry is lifted out; every
/// other entry must be a well-formed [`ParameterSpec`] whose values match its
/// declared type, and whose extra members are declared by the schema.
pub fn build_parameter_set(defaults: &Value) -> Result<ParameterSet, SchemaError> {
    let entries = defaults.as_object().ok_or_else(|| SchemaError::NotAnObject {
        what: "parameter defaults".to_string(),
        found: json_type(defaults),
    })?;

    let mut set = ParameterSet::new();
    if let Some(schema) = entries.get(SCHEMA_KEY) {
        if !schema.is_object() {
            return Err(SchemaError::NotAnObject {
                what: "schema".to_string(),
                found: json_type(schema),
            });
        }
        set.schema = Some(schema.clone());
    }
    let allowed = set
        .additional_members()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();

    for (name, raw) in entries.iter().filter(|(k, _)| k.as_str() != SCHEMA_KEY) {
        let spec: ParameterSpec =
            serde_json::from_value(raw.clone()).map_err(|e| SchemaError::InvalidParameter {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        spec.check(name)?;
        if let Some(member) = spec.extra.keys().find(|k| !allowed.iter().any(|a| a == *k)) {
            return Err(SchemaError::UndeclaredMember {
                name: name.clone(),
                member: member.clone(),
            });
        }
        set.insert(name.clone(), spec);
    }

    tracing::debug!(parameters = set.len(), "built parameter set");
    Ok(set)
}

/// Load every major section of a model-parameters mapping.
///
/// Each section is wrapped in the generic `{"parameters": {...}}` container
/// and built independently; the first failing section is reported by name.
pub fn load_model_parameters(
    model_parameters: &Value,
) -> Result<Vec<(String, ParameterSet)>, SchemaError> {
    let sections = model_parameters
        .as_object()
        .ok_or_else(|| SchemaError::NotAnObject {
            what: "model parameters".to_string(),
            found: json_type(model_parameters),
        })?;

    sections
        .iter()
        .map(|(section, defaults)| {
            let container = serde_json::json!({ "parameters": defaults });
            load_container(&container)
                .map(|set| (section.clone(), set))
                .map_err(|source| SchemaError::InvalidSection {
                    section: section.clone(),
                    source: Box::new(source),
                })
        })
        .collect()
}

/// Load a `{"parameters": {name: spec}}` container.
pub fn load_container(container: &Value) -> Result<ParameterSet, SchemaError> {
    let object = container
        .as_object()
        .ok_or_else(|| SchemaError::InvalidContainer("container must be a mapping".to_string()))?;
    if object.len() != 1 {
        return Err(SchemaError::InvalidContainer(format!(
            "container must hold exactly one key 'parameters', found {:?}",
            object.keys().collect::<Vec<_>>()
        )));
    }
    let parameters = object
        .get("parameters")
        .ok_or_else(|| SchemaError::InvalidContainer("missing key 'parameters'".to_string()))?;
    build_parameter_set(parameters)
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model_defaults() -> Value {
        json!({
            "schema": {"additional_members": {"checkbox": {"type": "bool"}}},
            "model_param": {
                "title": "Model Param",
                "description": "A model param",
                "type": "int",
                "value": [{"value": 1}],
            },
            "checkbox_param": {
                "title": "Checkbox Param",
                "description": "A checkbox param",
                "type": "int",
                "checkbox": true,
                "value": [{"value": 4}],
            },
        })
    }

    #[test]
    fn test_build_keeps_declaration_order() {
        let set = build_parameter_set(&model_defaults()).unwrap();
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["model_param", "checkbox_param"]);
        assert!(set.schema().is_some());
        assert_eq!(set.default_value("checkbox_param"), Some(&json!(4)));
    }

    #[test]
    fn test_build_rejects_non_mapping() {
        let err = build_parameter_set(&json!("hello")).unwrap_err();
        assert!(matches!(err, SchemaError::NotAnObject { found: "str", .. }));
    }

    #[test]
    fn test_build_rejects_malformed_parameter() {
        let err = build_parameter_set(&json!({"p": {"title": "P"}})).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidParameter { ref name, .. } if name == "p"));
    }

    #[test]
    fn test_build_rejects_undeclared_member() {
        let err = build_parameter_set(&json!({
            "p": {"title": "P", "type": "int", "value": 1, "color": "red"}
        }))
        .unwrap_err();
        assert!(matches!(err, SchemaError::UndeclaredMember { ref member, .. } if member == "color"));
    }

    #[test]
    fn test_specification_collapses_scalars() {
        let set = build_parameter_set(&json!({
            "hello_world": {"title": "hello world", "type": "str", "value": "hello, world!"},
            "rate": {"title": "Rate", "type": "float", "value": [{"year": 2024, "value": 0.5}]},
        }))
        .unwrap();
        let spec = set.specification(false);
        assert_eq!(spec["hello_world"], json!("hello, world!"));
        assert_eq!(spec["rate"], json!([{"year": 2024, "value": 0.5}]));

        let full = set.specification(true);
        assert_eq!(full["hello_world"]["title"], json!("hello world"));
    }

    #[test]
    fn test_load_model_parameters_names_section() {
        let err = load_model_parameters(&json!({
            "mock": model_defaults(),
            "broken": {"p": {"title": "P", "type": "int", "value": "x"}},
        }))
        .unwrap_err();
        match err {
            SchemaError::InvalidSection { section, .. } => assert_eq!(section, "broken"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_model_parameters_sections() {
        let sections = load_model_parameters(&json!({"mock": model_defaults()})).unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].0, "mock");
        assert_eq!(sections[0].1.len(), 2);
    }

    #[test]
    fn test_load_container_requires_parameters_key() {
        assert!(load_container(&json!({"params": {}})).is_err());
        assert!(load_container(&json!({"parameters": {}})).unwrap().is_empty());
    }
}
