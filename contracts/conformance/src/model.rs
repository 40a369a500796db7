//! The four-operation contract a model must implement.

use crate::error::{ConformanceResult, ContractViolation};
use modelkit_types::{
    assert_round_trippable, build_parameter_set, load_model_parameters, Adjustment,
    ErrorsWarnings, ModelValue, ParameterSet, SchemaError,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Keys `describe_inputs` must return, sorted.
pub const INPUT_KEYS: [&str; 2] = ["meta_parameters", "model_parameters"];

/// Operations of the model contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    GetVersion,
    DescribeInputs,
    ValidateAdjustment,
    RunModel,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::GetVersion => "get_version",
            Operation::DescribeInputs => "describe_inputs",
            Operation::ValidateAdjustment => "validate_adjustment",
            Operation::RunModel => "run_model",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A model under test.
///
/// Payloads are returned as [`ModelValue`] so that the suite can reject
/// shapes and types the contract does not allow. Errors raised by the model
/// itself are reported as [`ConformanceError::Model`](crate::ConformanceError::Model).
pub trait ModelFunctions {
    /// Non-empty version label of the model.
    fn get_version(&self) -> anyhow::Result<String>;

    /// Declare `{"meta_parameters": ..., "model_parameters": {section: ...}}`
    /// for the given meta-parameter values. An empty `meta_config` asks for
    /// the defaults.
    fn describe_inputs(&self, meta_config: &Map<String, Value>) -> anyhow::Result<ModelValue>;

    /// Validate `adjustment`, reporting into `errors_warnings`.
    ///
    /// Must return `{"errors_warnings": ..., "custom_adjustment"?: ...}`.
    fn validate_adjustment(
        &self,
        meta_spec: &Map<String, Value>,
        adjustment: &Adjustment,
        errors_warnings: ErrorsWarnings,
    ) -> anyhow::Result<ModelValue>;

    /// Run the model; must return `{"renderable": [...], "downloadable": [...]}`.
    fn run_model(
        &self,
        meta_spec: &Map<String, Value>,
        adjustment: &Adjustment,
    ) -> anyhow::Result<ModelValue>;
}

impl<M: ModelFunctions + ?Sized> ModelFunctions for &M {
    fn get_version(&self) -> anyhow::Result<String> {
        (**self).get_version()
    }

    fn describe_inputs(&self, meta_config: &Map<String, Value>) -> anyhow::Result<ModelValue> {
        (**self).describe_inputs(meta_config)
    }

    fn validate_adjustment(
        &self,
        meta_spec: &Map<String, Value>,
        adjustment: &Adjustment,
        errors_warnings: ErrorsWarnings,
    ) -> anyhow::Result<ModelValue> {
        (**self).validate_adjustment(meta_spec, adjustment, errors_warnings)
    }

    fn run_model(
        &self,
        meta_spec: &Map<String, Value>,
        adjustment: &Adjustment,
    ) -> anyhow::Result<ModelValue> {
        (**self).run_model(meta_spec, adjustment)
    }
}

/// Adjustments supplied by the model author.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fixtures {
    /// Must validate without errors.
    pub ok_adjustment: Adjustment,
    /// Must produce at least one error.
    pub bad_adjustment: Adjustment,
}

impl Fixtures {
    pub fn new(ok_adjustment: Adjustment, bad_adjustment: Adjustment) -> Self {
        Self {
            ok_adjustment,
            bad_adjustment,
        }
    }

    /// Build fixtures from JSON literals.
    pub fn from_json(ok_adjustment: Value, bad_adjustment: Value) -> Result<Self, SchemaError> {
        Ok(Self {
            ok_adjustment: Adjustment::try_from(ok_adjustment)?,
            bad_adjustment: Adjustment::try_from(bad_adjustment)?,
        })
    }
}

/// A checked `describe_inputs` payload.
#[derive(Debug, Clone)]
pub struct DeclaredInputs {
    pub meta: ParameterSet,
    pub sections: Vec<(String, ParameterSet)>,
}

impl DeclaredInputs {
    /// Check a `describe_inputs` payload.
    ///
    /// The key set must be exactly [`INPUT_KEYS`], both values must survive
    /// a JSON round trip, the meta parameters must build into a
    /// [`ParameterSet`] and every major section must load into the generic
    /// container.
    pub fn from_model_value(value: &ModelValue) -> ConformanceResult<Self> {
        if !value.is_map() {
            return Err(ContractViolation::NotAMapping {
                operation: Operation::DescribeInputs,
                found: value.type_name(),
            }
            .into());
        }

        let mut actual: Vec<String> = value.keys().into_iter().map(str::to_string).collect();
        actual.sort();
        let (Some(meta), Some(model), true) = (
            value.get(INPUT_KEYS[0]),
            value.get(INPUT_KEYS[1]),
            actual.len() == INPUT_KEYS.len(),
        ) else {
            return Err(ContractViolation::InputKeys {
                expected: INPUT_KEYS.iter().map(|k| k.to_string()).collect(),
                actual,
            }
            .into());
        };

        let meta = assert_round_trippable("Meta parameters", meta)?;
        let model = assert_round_trippable("Model parameters", model)?;

        let meta = build_parameter_set(&meta)
            .map_err(|source| ContractViolation::InvalidMetaParameters { source })?;
        let sections = load_model_parameters(&model).map_err(|err| match err {
            SchemaError::InvalidSection { section, source } => ContractViolation::InvalidSection {
                section,
                source: *source,
            },
            source => ContractViolation::InvalidModelParameters { source },
        })?;

        Ok(Self { meta, sections })
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|(name, _)| name.as_str())
    }

    /// Meta-parameter values in the form passed to validation and runs.
    pub fn meta_spec(&self) -> Map<String, Value> {
        self.meta.specification(false)
    }

    /// Empty errors/warnings template keyed by every major section.
    pub fn template(&self) -> ErrorsWarnings {
        ErrorsWarnings::template(self.section_names())
    }
}
