//! Failure taxonomy of the conformance checks.

use crate::model::Operation;
use crate::store::StoreError;
use modelkit_grid::GridError;
use modelkit_types::{Messages, SchemaError, SerializationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Where the current bokeh output convention is documented.
pub const BOKEH_DOCS_URL: &str = "https://docs.compute.studio/publish/outputs/#bokeh";

/// The model broke a structural clause of the contract.
#[derive(Debug, Error)]
pub enum ContractViolation {
    #[error("{operation} must return a mapping, found {found}")]
    NotAMapping {
        operation: Operation,
        found: &'static str,
    },

    #[error("describe_inputs must return exactly the keys {expected:?}, found {actual:?}")]
    InputKeys {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("meta_parameters do not form a valid parameter set: {source}")]
    InvalidMetaParameters {
        #[source]
        source: SchemaError,
    },

    #[error("model_parameters must map section names to parameter sets: {source}")]
    InvalidModelParameters {
        #[source]
        source: SchemaError,
    },

    #[error("model_parameters section '{section}' does not load as a parameter set: {source}")]
    InvalidSection {
        section: String,
        #[source]
        source: SchemaError,
    },

    #[error("validate_adjustment must return an 'errors_warnings' key, found {actual:?}")]
    MissingErrorsWarnings { actual: Vec<String> },

    #[error(
        "validate_adjustment returned unexpected keys {unexpected:?}; \
         only 'errors_warnings' and 'custom_adjustment' are allowed"
    )]
    ValidateKeys { unexpected: Vec<String> },

    #[error("errors_warnings do not have the required shape: {source}")]
    InvalidErrorsWarnings {
        #[source]
        source: SchemaError,
    },

    #[error("custom_adjustment must be a mapping, found {found}")]
    InvalidCustomAdjustment { found: &'static str },

    #[error("the valid adjustment produced errors in section '{section}': {errors:?}")]
    UnexpectedErrors { section: String, errors: Messages },

    #[error("the invalid adjustment produced no errors in any section")]
    MissingErrors,

    #[error("run_model returned a malformed result: {source}")]
    InvalidResult {
        #[source]
        source: SchemaError,
    },

    #[error(
        "output '{title}' uses the legacy bokeh format ('html' and 'javascript'); \
         return a json_item record with 'target_id', 'root_id' and 'doc' instead, see {url}",
        url = BOKEH_DOCS_URL
    )]
    LegacyBokeh { title: String },

    #[error("bokeh output '{title}' must carry exactly 'target_id', 'root_id' and 'doc', found {fields:?}")]
    MalformedBokeh { title: String, fields: Vec<String> },

    #[error("get_version returned an empty version")]
    EmptyVersion,

    #[error("the result store rejected the output: {source}")]
    StoreRejected {
        #[source]
        source: StoreError,
    },
}

/// Any failure that ends a conformance check.
#[derive(Debug, Error)]
pub enum ConformanceError {
    #[error("contract violation: {0}")]
    Contract(#[from] ContractViolation),

    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[error("configuration error: {0}")]
    Configuration(#[from] GridError),

    #[error("{operation} failed: {source:#}")]
    Model {
        operation: Operation,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid conformance config: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConformanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Contract(_) => ErrorKind::Contract,
            Self::Serialization(_) => ErrorKind::Serialization,
            Self::Configuration(_) | Self::Config(_) | Self::Io(_) => ErrorKind::Configuration,
            Self::Model { .. } => ErrorKind::Model,
        }
    }

    /// The contract clause that was broken, if this is a contract failure.
    pub fn violation(&self) -> Option<&ContractViolation> {
        match self {
            Self::Contract(violation) => Some(violation),
            _ => None,
        }
    }
}

/// Coarse classification used in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Contract,
    Serialization,
    Configuration,
    Model,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Contract => write!(f, "ContractError"),
            ErrorKind::Serialization => write!(f, "SerializationError"),
            ErrorKind::Configuration => write!(f, "ConfigurationError"),
            ErrorKind::Model => write!(f, "ModelError"),
        }
    }
}

/// Result type for conformance checks
pub type ConformanceResult<T> = Result<T, ConformanceError>;
