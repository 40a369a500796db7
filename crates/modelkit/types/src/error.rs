//! Error types for schema loading and interchange conversion.

use crate::parameter::ParamType;
use thiserror::Error;

/// Remediation offered with every [`SerializationError`].
pub const SERIALIZABLE_HINT: &str = "try enabling serializable output mode when producing the \
     specification, e.g. pass it through `modelkit_types::normalize` so dates and arrays \
     become JSON values";

/// A declared structure does not have the shape the contract requires.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("{what} must be a mapping, found {found}")]
    NotAnObject { what: String, found: &'static str },

    #[error("parameter '{name}' is invalid: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("parameter '{name}' declares no value")]
    MissingValue { name: String },

    #[error("parameter '{name}' is declared as {expected} but has value {found}")]
    TypeMismatch {
        name: String,
        expected: ParamType,
        found: String,
    },

    #[error("parameter '{name}' has an invalid '{kind}' validator: {reason}")]
    InvalidValidator {
        name: String,
        kind: String,
        reason: String,
    },

    #[error("parameter '{name}' carries member '{member}' which the schema does not declare")]
    UndeclaredMember { name: String, member: String },

    #[error("section '{section}' could not be loaded: {source}")]
    InvalidSection {
        section: String,
        #[source]
        source: Box<SchemaError>,
    },

    #[error("invalid parameter container: {0}")]
    InvalidContainer(String),

    #[error("invalid adjustment: {0}")]
    InvalidAdjustment(String),

    #[error("section '{section}' has malformed errors/warnings: {reason}")]
    InvalidMessages { section: String, reason: String },

    #[error("invalid model result: {0}")]
    InvalidResult(String),
}

/// A value cannot be carried through the JSON interchange format.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{context} must be JSON serializable: \n\n\t{reason} (at {path})\n\nHint: {hint}")]
pub struct SerializationError {
    /// What was being converted (e.g. "Meta parameters").
    pub context: String,
    /// JSON-path-like location of the offending value.
    pub path: String,
    /// Underlying conversion failure.
    pub reason: String,
    pub hint: &'static str,
}

impl SerializationError {
    pub(crate) fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            context: "Value".to_string(),
            path: path.into(),
            reason: reason.into(),
            hint: SERIALIZABLE_HINT,
        }
    }

    /// Replace the context label.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_error_display() {
        let err = SerializationError::new("$.start", "Object of type date is not JSON serializable")
            .with_context("Meta parameters");
        let text = err.to_string();
        assert!(text.starts_with("Meta parameters must be JSON serializable"));
        assert!(text.contains("$.start"));
        assert!(text.contains("serializable output mode"));
    }

    #[test]
    fn test_section_error_display() {
        let err = SchemaError::InvalidSection {
            section: "policy".into(),
            source: Box::new(SchemaError::MissingValue {
                name: "rate".into(),
            }),
        };
        assert!(err.to_string().contains("'policy'"));
        assert!(err.to_string().contains("'rate'"));
    }

    #[test]
    fn test_type_mismatch_display() {
        let err = SchemaError::TypeMismatch {
            name: "rate".into(),
            expected: ParamType::Int,
            found: "\"high\"".into(),
        };
        assert_eq!(
            err.to_string(),
            "parameter 'rate' is declared as int but has value \"high\""
        );
    }
}
