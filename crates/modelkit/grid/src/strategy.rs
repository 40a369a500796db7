//! Grid-construction strategies, keyed by validator kind.

use crate::error::{GridError, GridResult};
use chrono::{Duration, NaiveDate};
use modelkit_types::{ParamType, ParameterSet, ParameterSpec};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Upper bound on the number of values a single grid may hold.
pub const DEFAULT_MAX_GRID_LEN: usize = 10_000;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Everything a strategy may look at while building a grid.
pub struct GridContext<'a> {
    /// Name of the parameter being gridded.
    pub param: &'a str,
    /// Validator kind, e.g. `"choice"`.
    pub kind: &'a str,
    /// The validator's own configuration.
    pub config: &'a Map<String, Value>,
    pub spec: &'a ParameterSpec,
    /// The parameter's default (first item) value.
    pub default: &'a Value,
    /// The full set, for bounds that reference another parameter.
    pub parameters: &'a ParameterSet,
    pub max_len: usize,
}

impl GridContext<'_> {
    pub fn invalid(&self, reason: impl Into<String>) -> GridError {
        GridError::InvalidConfig {
            param: self.param.to_string(),
            kind: self.kind.to_string(),
            reason: reason.into(),
        }
    }

    fn too_large(&self, len: usize) -> GridError {
        GridError::TooLarge {
            param: self.param.to_string(),
            len,
            limit: self.max_len,
        }
    }

    /// Read a bound from the configuration.
    ///
    /// A string naming another parameter in the set resolves to that
    /// parameter's default value; any other value is returned as-is.
    pub fn bound(&self, key: &str) -> GridResult<Option<Value>> {
        match self.config.get(key) {
            None => Ok(None),
            Some(Value::String(reference)) => match self.parameters.get(reference) {
                Some(other) => other.default_value().cloned().map(Some).ok_or_else(|| {
                    GridError::UnresolvedReference {
                        param: self.param.to_string(),
                        reference: reference.clone(),
                    }
                }),
                None => Ok(Some(Value::String(reference.clone()))),
            },
            Some(value) => Ok(Some(value.clone())),
        }
    }

    fn required_bound(&self, key: &str) -> GridResult<Value> {
        self.bound(key)?
            .ok_or_else(|| self.invalid(format!("missing '{}' bound", key)))
    }

    fn unresolved(&self, value: &Value) -> GridError {
        match value {
            Value::String(reference) => GridError::UnresolvedReference {
                param: self.param.to_string(),
                reference: reference.clone(),
            },
            other => self.invalid(format!("bound {} is not usable here", other)),
        }
    }
}

/// Builds the ordered grid of admissible values for one validator kind.
pub trait GridStrategy: Send + Sync {
    fn grid(&self, ctx: &GridContext<'_>) -> GridResult<Vec<Value>>;
}

/// Every declared choice, in declaration order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChoiceGrid;

impl GridStrategy for ChoiceGrid {
    fn grid(&self, ctx: &GridContext<'_>) -> GridResult<Vec<Value>> {
        let choices = ctx
            .config
            .get("choices")
            .and_then(Value::as_array)
            .ok_or_else(|| ctx.invalid("'choices' must be a list"))?;
        if choices.len() > ctx.max_len {
            return Err(ctx.too_large(choices.len()));
        }
        Ok(choices.clone())
    }
}

/// Stepped inclusive range between `min` and `max`; step 1 unless the
/// configuration overrides it.
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeGrid;

impl GridStrategy for RangeGrid {
    fn grid(&self, ctx: &GridContext<'_>) -> GridResult<Vec<Value>> {
        match ctx.spec.param_type {
            ParamType::Int => int_range(ctx),
            ParamType::Float => float_range(ctx),
            ParamType::Date => DateRangeGrid.grid(ctx),
            other => Err(ctx.invalid(format!("range grids need a numeric or date parameter, not {}", other))),
        }
    }
}

fn int_range(ctx: &GridContext<'_>) -> GridResult<Vec<Value>> {
    let min = ctx.required_bound("min")?;
    let max = ctx.required_bound("max")?;
    let min = min.as_i64().ok_or_else(|| ctx.unresolved(&min))?;
    let max = max.as_i64().ok_or_else(|| ctx.unresolved(&max))?;
    let step = match ctx.config.get("step") {
        None => 1,
        Some(step) => step
            .as_i64()
            .filter(|s| *s > 0)
            .ok_or_else(|| ctx.invalid(format!("step {} must be a positive integer", step)))?,
    };
    if min > max {
        return Err(ctx.invalid(format!("min {} exceeds max {}", min, max)));
    }

    let len = (i128::from(max) - i128::from(min)) / i128::from(step) + 1;
    let len = usize::try_from(len).unwrap_or(usize::MAX);
    if len > ctx.max_len {
        return Err(ctx.too_large(len));
    }
    Ok((0..len as i64).map(|i| Value::from(min + i * step)).collect())
}

fn float_range(ctx: &GridContext<'_>) -> GridResult<Vec<Value>> {
    let min = ctx.required_bound("min")?;
    let max = ctx.required_bound("max")?;
    let min = min.as_f64().ok_or_else(|| ctx.unresolved(&min))?;
    let max = max.as_f64().ok_or_else(|| ctx.unresolved(&max))?;
    let step = match ctx.config.get("step") {
        None => 1.0,
        Some(step) => step
            .as_f64()
            .filter(|s| *s > 0.0 && s.is_finite())
            .ok_or_else(|| ctx.invalid(format!("step {} must be a positive number", step)))?,
    };
    if min > max {
        return Err(ctx.invalid(format!("min {} exceeds max {}", min, max)));
    }

    // Tolerance keeps an exact `max` reachable despite float division error.
    let steps = ((max - min) / step + 1e-9).floor();
    if !steps.is_finite() || steps >= ctx.max_len as f64 {
        return Err(ctx.too_large(if steps.is_finite() { steps as usize + 1 } else { usize::MAX }));
    }
    (0..=steps as usize)
        .map(|i| {
            let v = min + i as f64 * step;
            Number::from_f64(v)
                .map(Value::Number)
                .ok_or_else(|| ctx.invalid(format!("value {} is not finite", v)))
        })
        .collect()
}

/// Stepped inclusive range of ISO dates; one day unless `step` carries
/// `days` and/or `weeks`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRangeGrid;

impl DateRangeGrid {
    fn parse(ctx: &GridContext<'_>, key: &str) -> GridResult<NaiveDate> {
        let bound = ctx.required_bound(key)?;
        bound
            .as_str()
            .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
            .ok_or_else(|| ctx.unresolved(&bound))
    }

    fn step_days(ctx: &GridContext<'_>) -> GridResult<i64> {
        let Some(step) = ctx.config.get("step") else {
            return Ok(1);
        };
        let fields = step
            .as_object()
            .ok_or_else(|| ctx.invalid("step must be a mapping such as {\"days\": 1}"))?;
        let mut days = 0i64;
        for (unit, amount) in fields {
            let amount = amount
                .as_i64()
                .ok_or_else(|| ctx.invalid(format!("step '{}' must be an integer", unit)))?;
            let unit_days = match unit.as_str() {
                "days" => Some(amount),
                "weeks" => amount.checked_mul(7),
                other => return Err(ctx.invalid(format!("unsupported step unit '{}'", other))),
            };
            days = unit_days
                .and_then(|d| days.checked_add(d))
                .ok_or_else(|| ctx.invalid("step overflows"))?;
        }
        if days <= 0 {
            return Err(ctx.invalid("step must be positive"));
        }
        Ok(days)
    }
}

impl GridStrategy for DateRangeGrid {
    fn grid(&self, ctx: &GridContext<'_>) -> GridResult<Vec<Value>> {
        let min = Self::parse(ctx, "min")?;
        let max = Self::parse(ctx, "max")?;
        let step = Self::step_days(ctx)?;
        if min > max {
            return Err(ctx.invalid(format!("min {} exceeds max {}", min, max)));
        }

        let len = usize::try_from((max - min).num_days() / step + 1).unwrap_or(usize::MAX);
        if len > ctx.max_len {
            return Err(ctx.too_large(len));
        }
        Ok((0..len as i64)
            .map(|i| {
                let date = min + Duration::days(i * step);
                Value::String(date.format(DATE_FORMAT).to_string())
            })
            .collect())
    }
}

/// Validator kind -> strategy.
#[derive(Clone)]
pub struct StrategyRegistry {
    strategies: BTreeMap<String, Arc<dyn GridStrategy>>,
    max_grid_len: usize,
}

impl StrategyRegistry {
    /// Registry with the built-in `choice`, `range` and `date_range` strategies.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("choice", ChoiceGrid);
        registry.register("range", RangeGrid);
        registry.register("date_range", DateRangeGrid);
        registry
    }

    pub fn empty() -> Self {
        Self {
            strategies: BTreeMap::new(),
            max_grid_len: DEFAULT_MAX_GRID_LEN,
        }
    }

    /// Add or replace the strategy for a validator kind.
    pub fn register(&mut self, kind: impl Into<String>, strategy: impl GridStrategy + 'static) {
        self.strategies.insert(kind.into(), Arc::new(strategy));
    }

    pub fn with_max_grid_len(mut self, max_grid_len: usize) -> Self {
        self.max_grid_len = max_grid_len;
        self
    }

    pub fn max_grid_len(&self) -> usize {
        self.max_grid_len
    }

    pub fn get(&self, kind: &str) -> Option<&dyn GridStrategy> {
        self.strategies.get(kind).map(|s| s.as_ref())
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.strategies.keys().map(String::as_str)
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("kinds", &self.strategies.keys().collect::<Vec<_>>())
            .field("max_grid_len", &self.max_grid_len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::grid_for;
    use modelkit_types::build_parameter_set;
    use serde_json::json;

    fn set(defaults: Value) -> ParameterSet {
        build_parameter_set(&defaults).unwrap()
    }

    #[test]
    fn test_int_range_default_step() {
        let params = set(json!({
            "n": {"title": "N", "type": "int", "value": 2, "validators": {"range": {"min": 0, "max": 4}}}
        }));
        let grid = grid_for(&params, "n", &StrategyRegistry::new()).unwrap();
        assert_eq!(grid, vec![json!(0), json!(1), json!(2), json!(3), json!(4)]);
    }

    #[test]
    fn test_int_range_step_override() {
        let params = set(json!({
            "n": {"title": "N", "type": "int", "value": 0,
                  "validators": {"range": {"min": 0, "max": 10, "step": 5}}}
        }));
        let grid = grid_for(&params, "n", &StrategyRegistry::new()).unwrap();
        assert_eq!(grid, vec![json!(0), json!(5), json!(10)]);
    }

    #[test]
    fn test_float_range_reaches_max() {
        let params = set(json!({
            "r": {"title": "R", "type": "float", "value": 0.0,
                  "validators": {"range": {"min": 0.0, "max": 1.0, "step": 0.25}}}
        }));
        let grid = grid_for(&params, "r", &StrategyRegistry::new()).unwrap();
        assert_eq!(grid.len(), 5);
        assert_eq!(grid.last(), Some(&json!(1.0)));
    }

    #[test]
    fn test_range_bound_references_other_parameter() {
        let params = set(json!({
            "start_year": {"title": "Start", "type": "int", "value": 2020,
                           "validators": {"range": {"min": 2018, "max": 2022}}},
            "end_year": {"title": "End", "type": "int", "value": 2021,
                         "validators": {"range": {"min": "start_year", "max": 2022}}},
        }));
        let grid = grid_for(&params, "end_year", &StrategyRegistry::new()).unwrap();
        assert_eq!(grid, vec![json!(2020), json!(2021), json!(2022)]);
    }

    #[test]
    fn test_range_unknown_reference() {
        let params = set(json!({
            "n": {"title": "N", "type": "int", "value": 1,
                  "validators": {"range": {"min": "missing", "max": 3}}}
        }));
        let err = grid_for(&params, "n", &StrategyRegistry::new()).unwrap_err();
        assert!(matches!(err, GridError::UnresolvedReference { ref reference, .. } if reference == "missing"));
    }

    #[test]
    fn test_range_inverted_bounds() {
        let params = set(json!({
            "n": {"title": "N", "type": "int", "value": 1, "validators": {"range": {"min": 5, "max": 3}}}
        }));
        let err = grid_for(&params, "n", &StrategyRegistry::new()).unwrap_err();
        assert!(matches!(err, GridError::InvalidConfig { .. }));
    }

    #[test]
    fn test_range_too_large() {
        let params = set(json!({
            "n": {"title": "N", "type": "int", "value": 1,
                  "validators": {"range": {"min": 0, "max": 1_000_000_000}}}
        }));
        let err = grid_for(&params, "n", &StrategyRegistry::new()).unwrap_err();
        assert!(matches!(err, GridError::TooLarge { limit: DEFAULT_MAX_GRID_LEN, .. }));
    }

    #[test]
    fn test_date_range_weekly() {
        let params = set(json!({
            "start": {"title": "Start", "type": "date", "value": "2024-01-01",
                      "validators": {"date_range": {"min": "2024-01-01", "max": "2024-01-20",
                                                    "step": {"weeks": 1}}}}
        }));
        let grid = grid_for(&params, "start", &StrategyRegistry::new()).unwrap();
        assert_eq!(
            grid,
            vec![json!("2024-01-01"), json!("2024-01-08"), json!("2024-01-15")]
        );
    }

    #[test]
    fn test_date_range_step_overflow_is_invalid() {
        let params = set(json!({
            "start": {"title": "Start", "type": "date", "value": "2024-01-01",
                      "validators": {"date_range": {"min": "2024-01-01", "max": "2024-01-20",
                                                    "step": {"weeks": i64::MAX}}}}
        }));
        let err = grid_for(&params, "start", &StrategyRegistry::new()).unwrap_err();
        assert!(matches!(err, GridError::InvalidConfig { .. }));
        assert!(err.to_string().contains("step overflows"));

        let params = set(json!({
            "start": {"title": "Start", "type": "date", "value": "2024-01-01",
                      "validators": {"date_range": {"min": "2024-01-01", "max": "2024-01-20",
                                                    "step": {"days": i64::MAX, "weeks": 1}}}}
        }));
        let err = grid_for(&params, "start", &StrategyRegistry::new()).unwrap_err();
        assert!(err.to_string().contains("step overflows"));
    }

    #[test]
    fn test_range_on_date_parameter_delegates() {
        let params = set(json!({
            "start": {"title": "Start", "type": "date", "value": "2024-01-01",
                      "validators": {"range": {"min": "2024-01-01", "max": "2024-01-03"}}}
        }));
        let grid = grid_for(&params, "start", &StrategyRegistry::new()).unwrap();
        assert_eq!(grid.len(), 3);
    }

    #[test]
    fn test_custom_strategy_registration() {
        struct Flip;
        impl GridStrategy for Flip {
            fn grid(&self, _ctx: &GridContext<'_>) -> GridResult<Vec<Value>> {
                Ok(vec![json!(true), json!(false)])
            }
        }

        let params = set(json!({
            "on": {"title": "On", "type": "bool", "value": true, "validators": {"flag": {}}}
        }));
        let mut registry = StrategyRegistry::new();
        assert!(grid_for(&params, "on", &registry).is_err());
        registry.register("flag", Flip);
        assert_eq!(grid_for(&params, "on", &registry).unwrap().len(), 2);
    }

    #[test]
    fn test_registry_debug_lists_kinds() {
        let text = format!("{:?}", StrategyRegistry::new());
        assert!(text.contains("choice"));
        assert!(text.contains("date_range"));
    }
}
