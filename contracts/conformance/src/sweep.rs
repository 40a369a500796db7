//! Check D: one adjustment per griddable model parameter.

use crate::error::ConformanceResult;
use crate::model::ModelFunctions;
use crate::reports::CheckKind;
use crate::suite::{CheckOutcome, ConformanceSuite};
use modelkit_grid::{grid_for, GridError};
use modelkit_types::{Adjustment, ParameterSpec};
use serde_json::{Map, Value};

/// Pick a deterministic probe value: the first grid value that differs
/// from the default, else the default itself, wrapped to the parameter's
/// dimensionality.
fn probe_value(spec: &ParameterSpec, grid: &[Value]) -> Option<Value> {
    let default = spec.default_value();
    let value = grid
        .iter()
        .find(|v| Some(*v) != default)
        .or_else(|| grid.first())?
        .clone();
    Some((0..spec.number_dims).fold(value, |v, _| Value::Array(vec![v])))
}

impl<M: ModelFunctions + ?Sized> ConformanceSuite<'_, M> {
    /// Validate a single-parameter adjustment for every model parameter
    /// that has a grid, then all of them together.
    ///
    /// Every response must have the errors/warnings shape. Errors reported
    /// for grid values are advisories: a grid value can be legal on its own
    /// and still be rejected by a cross-parameter rule.
    pub fn check_adjustment_sweep(&self) -> ConformanceResult<CheckOutcome> {
        let mut outcome = CheckOutcome::new(CheckKind::AdjustmentSweep);

        let declared = self.declaration(&Map::new())?;
        let meta_spec = declared.meta_spec();
        let template = declared.template();

        let mut combined = Adjustment::new();
        let mut skipped = 0usize;
        let mut probed = 0usize;

        for (section, parameters) in &declared.sections {
            for (name, spec) in parameters.iter() {
                let grid = match grid_for(parameters, name, &self.registry) {
                    Ok(grid) => grid,
                    Err(GridError::ValidatorCount { .. } | GridError::UnsupportedValidator { .. }) => {
                        skipped += 1;
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                };
                let Some(value) = probe_value(spec, &grid) else {
                    skipped += 1;
                    continue;
                };

                tracing::debug!(section = %section, param = name, value = %value, "probing parameter");
                let adjustment = Adjustment::new().with(section, name, value.clone());
                let response = self.validate(&meta_spec, &adjustment, &template)?;
                if let Some((reported, messages)) = response.errors_warnings.first_with_errors() {
                    outcome.warn(format!(
                        "{}.{} = {} reported errors in '{}': {:?}",
                        section, name, value, reported, messages.errors
                    ));
                }
                combined.set(section, name, value);
                probed += 1;
            }
        }

        if !combined.is_empty() {
            let response = self.validate(&meta_spec, &combined, &template)?;
            if response.errors_warnings.has_errors() {
                outcome.warn(format!(
                    "combined adjustment reported {} errors",
                    response.errors_warnings.error_count()
                ));
            }
        }

        outcome.detail("probed", probed);
        outcome.detail("skipped", skipped);
        tracing::info!(probed, skipped, "adjustment sweep finished");
        Ok(outcome)
    }
}
