//! Independent conformance checks against one model.

use crate::config::ConformanceConfig;
use crate::error::{ConformanceError, ConformanceResult, ContractViolation};
use crate::model::{DeclaredInputs, Fixtures, ModelFunctions, Operation};
use crate::reports::CheckKind;
use crate::store::{InMemoryResultStore, ResultStore};
use modelkit_grid::StrategyRegistry;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// What a passing check observed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckOutcome {
    pub check: CheckKind,
    /// Advisory findings that do not fail the check.
    pub warnings: Vec<String>,
    pub details: BTreeMap<String, String>,
}

impl CheckOutcome {
    pub fn new(check: CheckKind) -> Self {
        Self {
            check,
            warnings: Vec::new(),
            details: BTreeMap::new(),
        }
    }

    /// Record an advisory and emit it as a warning event.
    pub fn warn(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        tracing::warn!(check = %self.check, "{}", warning);
        self.warnings.push(warning);
    }

    pub fn detail(&mut self, key: impl Into<String>, value: impl ToString) {
        self.details.insert(key.into(), value.to_string());
    }
}

/// The checks of the conformance suite, each runnable on its own.
///
/// Every check re-derives its preconditions by calling `describe_inputs`
/// again; none depends on another having run.
pub struct ConformanceSuite<'a, M: ModelFunctions + ?Sized> {
    pub(crate) model: &'a M,
    pub(crate) fixtures: &'a Fixtures,
    pub(crate) config: ConformanceConfig,
    pub(crate) registry: StrategyRegistry,
    pub(crate) store: Arc<dyn ResultStore>,
}

impl<'a, M: ModelFunctions + ?Sized> ConformanceSuite<'a, M> {
    pub fn new(model: &'a M, fixtures: &'a Fixtures) -> Self {
        let config = ConformanceConfig::default();
        Self {
            model,
            fixtures,
            registry: StrategyRegistry::new().with_max_grid_len(config.max_grid_len),
            config,
            store: Arc::new(InMemoryResultStore::new()),
        }
    }

    pub fn with_config(mut self, config: ConformanceConfig) -> Self {
        self.registry = self.registry.with_max_grid_len(config.max_grid_len);
        self.config = config;
        self
    }

    /// Use a registry with additional grid strategies.
    pub fn with_registry(mut self, registry: StrategyRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Use a different downstream store for Check C.
    pub fn with_store(mut self, store: Arc<dyn ResultStore>) -> Self {
        self.store = store;
        self
    }

    pub fn config(&self) -> &ConformanceConfig {
        &self.config
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// `get_version` must return a non-empty label.
    pub fn check_version(&self) -> ConformanceResult<CheckOutcome> {
        let version = invoke(Operation::GetVersion, || self.model.get_version())?;
        if version.trim().is_empty() {
            return Err(ContractViolation::EmptyVersion.into());
        }

        let mut outcome = CheckOutcome::new(CheckKind::Version);
        outcome.detail("version", &version);
        tracing::info!(version = %version, "version check passed");
        Ok(outcome)
    }

    /// Run one check by kind.
    pub fn run(&self, check: CheckKind) -> ConformanceResult<CheckOutcome> {
        match check {
            CheckKind::Version => self.check_version(),
            CheckKind::Inputs => self.check_inputs(),
            CheckKind::Validation => self.check_validation(),
            CheckKind::Execution => self.check_execution(),
            CheckKind::AdjustmentSweep => self.check_adjustment_sweep(),
        }
    }

    /// Call `describe_inputs` and check the payload.
    pub(crate) fn declaration(
        &self,
        meta_config: &Map<String, Value>,
    ) -> ConformanceResult<DeclaredInputs> {
        let declared = invoke(Operation::DescribeInputs, || {
            self.model.describe_inputs(meta_config)
        })?;
        DeclaredInputs::from_model_value(&declared)
    }
}

/// Run one model operation, attributing its failure to the operation.
pub(crate) fn invoke<T>(
    operation: Operation,
    call: impl FnOnce() -> anyhow::Result<T>,
) -> ConformanceResult<T> {
    tracing::trace!(%operation, "calling model");
    call().map_err(|source| ConformanceError::Model { operation, source })
}
