//! Per-section validation messages.

use crate::error::SchemaError;
use crate::parameter_set::json_type;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Parameter name -> ordered messages.
pub type Messages = BTreeMap<String, Vec<String>>;

/// The `errors` and `warnings` of one major section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionMessages {
    #[serde(default)]
    pub errors: Messages,
    #[serde(default)]
    pub warnings: Messages,
}

impl SectionMessages {
    /// Any parameter listed under `errors` counts, even with no messages.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn add_error(&mut self, param: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(param.into()).or_default().push(message.into());
    }

    pub fn add_warning(&mut self, param: impl Into<String>, message: impl Into<String>) {
        self.warnings
            .entry(param.into())
            .or_default()
            .push(message.into());
    }

    /// Parse one section strictly.
    ///
    /// The entry must be a mapping with an `errors` key, an optional
    /// `warnings` key and nothing else; each holds parameter names mapped to
    /// lists of strings.
    pub fn parse(section: &str, value: &Value) -> Result<Self, SchemaError> {
        let invalid = |reason: String| SchemaError::InvalidMessages {
            section: section.to_string(),
            reason,
        };

        let object = value
            .as_object()
            .ok_or_else(|| invalid(format!("expected a mapping, found {}", json_type(value))))?;
        if let Some(key) = object
            .keys()
            .find(|k| k.as_str() != "errors" && k.as_str() != "warnings")
        {
            return Err(invalid(format!("unknown key '{}'", key)));
        }
        let errors = object
            .get("errors")
            .ok_or_else(|| invalid("missing key 'errors'".to_string()))?;

        Ok(Self {
            errors: parse_messages(errors).map_err(|r| invalid(format!("errors: {}", r)))?,
            warnings: match object.get("warnings") {
                Some(warnings) => {
                    parse_messages(warnings).map_err(|r| invalid(format!("warnings: {}", r)))?
                }
                None => Messages::new(),
            },
        })
    }
}

fn parse_messages(value: &Value) -> Result<Messages, String> {
    let object = value
        .as_object()
        .ok_or_else(|| format!("expected a mapping, found {}", json_type(value)))?;
    let mut messages = Messages::new();
    for (param, list) in object {
        let items = list
            .as_array()
            .ok_or_else(|| format!("'{}' must be a list of strings", param))?;
        let strings = items
            .iter()
            .map(|m| m.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| format!("'{}' must be a list of strings", param))?;
        messages.insert(param.clone(), strings);
    }
    Ok(messages)
}

/// Section name -> [`SectionMessages`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorsWarnings {
    sections: BTreeMap<String, SectionMessages>,
}

impl ErrorsWarnings {
    /// Empty template keyed by every major section.
    pub fn template<I, S>(sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sections: sections
                .into_iter()
                .map(|s| (s.into(), SectionMessages::default()))
                .collect(),
        }
    }

    pub fn section(&self, name: &str) -> Option<&SectionMessages> {
        self.sections.get(name)
    }

    pub fn section_mut(&mut self, name: &str) -> Option<&mut SectionMessages> {
        self.sections.get_mut(name)
    }

    pub fn sections(&self) -> impl Iterator<Item = (&str, &SectionMessages)> {
        self.sections.iter().map(|(name, msgs)| (name.as_str(), msgs))
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn has_errors(&self) -> bool {
        self.sections.values().any(SectionMessages::has_errors)
    }

    /// First section reporting errors, in section-name order.
    pub fn first_with_errors(&self) -> Option<(&str, &SectionMessages)> {
        self.sections().find(|(_, msgs)| msgs.has_errors())
    }

    pub fn error_count(&self) -> usize {
        self.sections
            .values()
            .flat_map(|msgs| msgs.errors.values())
            .map(Vec::len)
            .sum()
    }

    /// Parse a whole report, section by section.
    pub fn parse(value: &Value) -> Result<Self, SchemaError> {
        let object = value.as_object().ok_or_else(|| SchemaError::NotAnObject {
            what: "errors_warnings".to_string(),
            found: json_type(value),
        })?;
        let sections = object
            .iter()
            .map(|(name, entry)| SectionMessages::parse(name, entry).map(|m| (name.clone(), m)))
            .collect::<Result<_, _>>()?;
        Ok(Self { sections })
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_template_is_empty_per_section() {
        let template = ErrorsWarnings::template(["mock", "policy"]);
        assert_eq!(
            template.to_value(),
            json!({
                "mock": {"errors": {}, "warnings": {}},
                "policy": {"errors": {}, "warnings": {}},
            })
        );
        assert!(!template.has_errors());
    }

    #[test]
    fn test_parse_valid_section() {
        let ew = ErrorsWarnings::parse(&json!({
            "mock": {"errors": {"model_param": ["Not a valid integer."]}, "warnings": {}}
        }))
        .unwrap();
        assert!(ew.has_errors());
        assert_eq!(ew.error_count(), 1);
        assert_eq!(ew.first_with_errors().unwrap().0, "mock");
    }

    #[test]
    fn test_warnings_are_optional() {
        let section = SectionMessages::parse("mock", &json!({"errors": {}})).unwrap();
        assert!(section.warnings.is_empty());
    }

    #[test]
    fn test_parse_rejects_unknown_key() {
        let err = SectionMessages::parse("mock", &json!({"errors": {}, "notes": {}})).unwrap_err();
        assert!(err.to_string().contains("unknown key 'notes'"));
    }

    #[test]
    fn test_parse_rejects_missing_errors() {
        assert!(SectionMessages::parse("mock", &json!({"warnings": {}})).is_err());
    }

    #[test]
    fn test_parse_rejects_non_string_messages() {
        let err = SectionMessages::parse("mock", &json!({"errors": {"p": [1]}})).unwrap_err();
        assert!(err.to_string().contains("list of strings"));
    }

    #[test]
    fn test_listed_parameter_is_an_error_without_messages() {
        let section = SectionMessages::parse("mock", &json!({"errors": {"p": []}})).unwrap();
        assert!(section.has_errors());
        let ew = ErrorsWarnings::parse(&json!({"mock": {"errors": {"p": []}}})).unwrap();
        assert_eq!(ew.first_with_errors().map(|(name, _)| name), Some("mock"));
    }
}
