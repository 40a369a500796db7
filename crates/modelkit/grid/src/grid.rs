//! Single-parameter grids.

use crate::error::{GridError, GridResult};
use crate::strategy::{GridContext, StrategyRegistry};
use modelkit_types::ParameterSet;
use serde_json::Value;

/// Build the ordered grid of admissible values for `name`.
///
/// The parameter must carry exactly one validator; its kind selects the
/// strategy from `registry`.
pub fn grid_for(
    parameters: &ParameterSet,
    name: &str,
    registry: &StrategyRegistry,
) -> GridResult<Vec<Value>> {
    let spec = parameters.get(name).ok_or_else(|| GridError::UnknownParameter {
        param: name.to_string(),
    })?;

    let validator_count = spec.validators.len();
    let Some((kind, config)) = spec.validators.iter().next().filter(|_| validator_count == 1) else {
        return Err(GridError::ValidatorCount {
            param: name.to_string(),
            count: validator_count,
        });
    };

    let invalid = |reason: &str| GridError::InvalidConfig {
        param: name.to_string(),
        kind: kind.clone(),
        reason: reason.to_string(),
    };
    let config = config
        .as_object()
        .ok_or_else(|| invalid("configuration must be a mapping"))?;
    let default = spec
        .default_value()
        .ok_or_else(|| invalid("parameter has no default value"))?;
    let strategy = registry
        .get(kind)
        .ok_or_else(|| GridError::UnsupportedValidator {
            param: name.to_string(),
            kind: kind.clone(),
        })?;

    let ctx = GridContext {
        param: name,
        kind,
        config,
        spec,
        default,
        parameters,
        max_len: registry.max_grid_len(),
    };
    let grid = strategy.grid(&ctx)?;

    if grid.is_empty() {
        return Err(GridError::EmptyGrid {
            param: name.to_string(),
            kind: kind.clone(),
        });
    }
    if grid.len() > ctx.max_len {
        return Err(GridError::TooLarge {
            param: name.to_string(),
            len: grid.len(),
            limit: ctx.max_len,
        });
    }

    tracing::trace!(param = name, kind = %kind, len = grid.len(), "built parameter grid");
    Ok(grid)
}
