//! Check B: adjustment validation conformance.

use crate::error::{ConformanceResult, ContractViolation};
use crate::model::{ModelFunctions, Operation};
use crate::reports::CheckKind;
use crate::suite::{invoke, CheckOutcome, ConformanceSuite};
use modelkit_types::{assert_round_trippable, Adjustment, ErrorsWarnings, ModelValue};
use serde_json::{Map, Value};

/// Keys `validate_adjustment` may return.
const ERRORS_WARNINGS: &str = "errors_warnings";
const CUSTOM_ADJUSTMENT: &str = "custom_adjustment";

/// A checked `validate_adjustment` payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResponse {
    pub errors_warnings: ErrorsWarnings,
    /// Normalized adjustment the model wants applied instead, if any.
    pub custom_adjustment: Option<Value>,
}

impl ValidationResponse {
    /// Check a `validate_adjustment` payload.
    ///
    /// Only the explicit mapping form is accepted: `errors_warnings` is
    /// required, `custom_adjustment` is optional, nothing else may appear.
    pub fn from_model_value(value: &ModelValue) -> ConformanceResult<Self> {
        if !value.is_map() {
            return Err(ContractViolation::NotAMapping {
                operation: Operation::ValidateAdjustment,
                found: value.type_name(),
            }
            .into());
        }

        let keys = value.keys();
        let unexpected: Vec<String> = keys
            .iter()
            .copied()
            .filter(|k| !matches!(*k, ERRORS_WARNINGS | CUSTOM_ADJUSTMENT))
            .map(|k| k.to_string())
            .collect();
        if !unexpected.is_empty() {
            return Err(ContractViolation::ValidateKeys { unexpected }.into());
        }
        let errors_warnings = value.get(ERRORS_WARNINGS).ok_or_else(|| {
            ContractViolation::MissingErrorsWarnings {
                actual: keys.iter().map(|k| k.to_string()).collect(),
            }
        })?;

        let errors_warnings = assert_round_trippable("Errors and warnings", errors_warnings)?;
        let errors_warnings = ErrorsWarnings::parse(&errors_warnings)
            .map_err(|source| ContractViolation::InvalidErrorsWarnings { source })?;

        let custom_adjustment = match value.get(CUSTOM_ADJUSTMENT) {
            None | Some(ModelValue::Null) => None,
            Some(custom) => {
                if !custom.is_map() {
                    return Err(ContractViolation::InvalidCustomAdjustment {
                        found: custom.type_name(),
                    }
                    .into());
                }
                Some(assert_round_trippable("Custom adjustment", custom)?)
            }
        };

        Ok(Self {
            errors_warnings,
            custom_adjustment,
        })
    }
}

impl<M: ModelFunctions + ?Sized> ConformanceSuite<'_, M> {
    /// Validate the known-valid and known-invalid fixtures.
    ///
    /// The valid adjustment must leave every section without errors; the
    /// invalid one must produce errors in at least one section. Each call
    /// receives its own copy of the empty template.
    pub fn check_validation(&self) -> ConformanceResult<CheckOutcome> {
        let mut outcome = CheckOutcome::new(CheckKind::Validation);

        let declared = self.declaration(&Map::new())?;
        let meta_spec = declared.meta_spec();
        let template = declared.template();

        let ok = self.validate(&meta_spec, &self.fixtures.ok_adjustment, &template)?;
        if let Some((section, messages)) = ok.errors_warnings.first_with_errors() {
            return Err(ContractViolation::UnexpectedErrors {
                section: section.to_string(),
                errors: messages.errors.clone(),
            }
            .into());
        }
        for (section, messages) in ok.errors_warnings.sections() {
            for (param, warnings) in messages.warnings.iter().filter(|(_, w)| !w.is_empty()) {
                outcome.warn(format!(
                    "valid adjustment warns on {}.{}: {}",
                    section,
                    param,
                    warnings.join("; ")
                ));
            }
        }

        let bad = self.validate(&meta_spec, &self.fixtures.bad_adjustment, &template)?;
        if !bad.errors_warnings.has_errors() {
            return Err(ContractViolation::MissingErrors.into());
        }

        outcome.detail("sections", declared.sections.len());
        outcome.detail("bad_adjustment_errors", bad.errors_warnings.error_count());
        outcome.detail(
            "custom_adjustment",
            ok.custom_adjustment.is_some() || bad.custom_adjustment.is_some(),
        );
        tracing::info!(
            errors = bad.errors_warnings.error_count(),
            "validation check passed"
        );
        Ok(outcome)
    }

    /// Call `validate_adjustment` with a fresh copy of `template`.
    pub(crate) fn validate(
        &self,
        meta_spec: &Map<String, Value>,
        adjustment: &Adjustment,
        template: &ErrorsWarnings,
    ) -> ConformanceResult<ValidationResponse> {
        let response = invoke(Operation::ValidateAdjustment, || {
            self.model
                .validate_adjustment(meta_spec, adjustment, template.clone())
        })?;
        ValidationResponse::from_model_value(&response)
    }
}
