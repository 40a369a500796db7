//! Test harness for running conformance tests

use crate::model::{Fixtures, ModelFunctions};
use crate::reports::ConformanceReport;
use crate::{ConformanceConfig, ConformanceRunner};

/// Test harness for conformance testing
///
/// Meant for a model author's own `#[test]` functions:
///
/// ```rust
/// use modelkit_conformance::{ReferenceModel, TestHarness};
///
/// let fixtures = ReferenceModel::fixtures();
/// TestHarness::new().assert_conformant("reference", &ReferenceModel, &fixtures);
/// ```
pub struct TestHarness {
    runner: ConformanceRunner,
}

impl TestHarness {
    /// Create a new test harness with default configuration
    pub fn new() -> Self {
        Self {
            runner: ConformanceRunner::new(ConformanceConfig::default()),
        }
    }

    /// Create a test harness with custom configuration
    pub fn with_config(config: ConformanceConfig) -> Self {
        Self {
            runner: ConformanceRunner::new(config),
        }
    }

    /// Create a test harness around a prepared runner
    pub fn with_runner(runner: ConformanceRunner) -> Self {
        Self { runner }
    }

    /// Run conformance tests and return report
    pub fn run<M: ModelFunctions + ?Sized>(
        &self,
        name: &str,
        model: &M,
        fixtures: &Fixtures,
    ) -> ConformanceReport {
        self.runner.run(name, model, fixtures)
    }

    /// Run tests and assert conformance
    pub fn assert_conformant<M: ModelFunctions + ?Sized>(
        &self,
        name: &str,
        model: &M,
        fixtures: &Fixtures,
    ) {
        let report = self.runner.run(name, model, fixtures);

        if !report.is_conformant() {
            panic!(
                "Model '{}' is not conformant:\n{}",
                report.model_name,
                report.to_text()
            );
        }
    }

    /// Run tests for several models and return whether all passed
    pub fn check_all_conformant(
        &self,
        models: &[(&str, &dyn ModelFunctions, &Fixtures)],
    ) -> (bool, Vec<ConformanceReport>) {
        let reports: Vec<_> = models
            .iter()
            .map(|(name, model, fixtures)| self.runner.run(name, *model, fixtures))
            .collect();
        let all_conformant = reports.iter().all(|r| r.is_conformant());
        (all_conformant, reports)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
