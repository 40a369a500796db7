//! Conformance test framework

use crate::config::ConformanceConfig;
use crate::model::{Fixtures, ModelFunctions};
use crate::reports::{CheckKind, ConformanceReport, TestResult, TestStatus};
use crate::store::ResultStore;
use crate::suite::ConformanceSuite;
use modelkit_grid::StrategyRegistry;
use std::sync::Arc;
use std::time::Instant;

/// Conformance test runner
pub struct ConformanceRunner {
    config: ConformanceConfig,
    registry: Option<StrategyRegistry>,
    store: Option<Arc<dyn ResultStore>>,
}

impl ConformanceRunner {
    /// Create a new conformance runner
    pub fn new(config: ConformanceConfig) -> Self {
        Self {
            config,
            registry: None,
            store: None,
        }
    }

    /// Grid strategies beyond the built-in ones
    pub fn with_registry(mut self, registry: StrategyRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn ResultStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(&self) -> &ConformanceConfig {
        &self.config
    }

    fn enabled(&self, check: CheckKind) -> bool {
        match check {
            CheckKind::Version => self.config.run_version,
            CheckKind::Inputs => self.config.run_inputs,
            CheckKind::Validation => self.config.run_validation,
            CheckKind::Execution => self.config.run_execution,
            CheckKind::AdjustmentSweep => self.config.run_adjustment_sweep,
        }
    }

    /// Build the suite this runner would use for `model`.
    pub fn suite<'a, M: ModelFunctions + ?Sized>(
        &self,
        model: &'a M,
        fixtures: &'a Fixtures,
    ) -> ConformanceSuite<'a, M> {
        let mut suite = ConformanceSuite::new(model, fixtures).with_config(self.config.clone());
        if let Some(registry) = &self.registry {
            suite = suite.with_registry(registry.clone());
        }
        if let Some(store) = &self.store {
            suite = suite.with_store(Arc::clone(store));
        }
        suite
    }

    /// Run every enabled check against a model
    pub fn run<M: ModelFunctions + ?Sized>(
        &self,
        model_name: &str,
        model: &M,
        fixtures: &Fixtures,
    ) -> ConformanceReport {
        let start = Instant::now();
        let mut report = ConformanceReport::new(model_name);
        let suite = self.suite(model, fixtures);

        tracing::info!(
            model = model_name,
            harness = crate::VERSION,
            types = modelkit_types::VERSION,
            grid = modelkit_grid::VERSION,
            "Starting conformance checks"
        );

        let mut failed = false;
        for check in CheckKind::ALL.into_iter().filter(|c| self.enabled(*c)) {
            if failed && !self.config.continue_on_failure {
                report.push(TestResult::skipped(check, "skipped after an earlier failure"));
                continue;
            }

            tracing::info!(check = %check, "Running check");
            let started = Instant::now();
            let result = TestResult::from_outcome(check, suite.run(check), started.elapsed());
            if result.status == TestStatus::Failed {
                tracing::error!(
                    check = %check,
                    error = result.error.as_deref().unwrap_or_default(),
                    "Check failed"
                );
                failed = true;
            }
            report.push(result);
        }

        report.duration = start.elapsed();
        report.finalize();

        tracing::info!(
            model = model_name,
            passed = report.passed_count(),
            failed = report.failed_count(),
            skipped = report.skipped_count(),
            "Conformance checks complete"
        );

        report
    }
}

impl Default for ConformanceRunner {
    fn default() -> Self {
        Self::new(ConformanceConfig::default())
    }
}
