//! Check A: input declaration conformance.

use crate::error::ConformanceResult;
use crate::model::{DeclaredInputs, ModelFunctions};
use crate::reports::CheckKind;
use crate::suite::{CheckOutcome, ConformanceSuite};
use modelkit_grid::enumerate_configurations;
use serde_json::{Map, Value};
use std::time::{Duration, Instant};

impl<M: ModelFunctions + ?Sized> ConformanceSuite<'_, M> {
    /// Check the declared inputs for the default meta parameters and for
    /// every sampled meta-parameter combination.
    ///
    /// Slow `describe_inputs` calls and reduced sampling are advisories on
    /// the outcome; every other finding fails the check.
    pub fn check_inputs(&self) -> ConformanceResult<CheckOutcome> {
        let mut outcome = CheckOutcome::new(CheckKind::Inputs);

        let declared = self.timed_declaration(&Map::new(), "default meta parameters", &mut outcome)?;
        let sweep = enumerate_configurations(&declared.meta, &self.registry)?;
        for excluded in sweep.excluded() {
            outcome.warn(format!(
                "meta parameter '{}' excluded from sweep: {}",
                excluded.name, excluded.reason
            ));
        }

        let policy = self.config.sampling;
        let total = sweep.total();
        if policy.is_reduced(total) {
            outcome.warn(format!(
                "{} meta-parameter combinations exceed {}; checking every {} combination only",
                total,
                policy.threshold,
                ordinal(policy.stride.max(1))
            ));
        }
        tracing::info!(
            combinations = total,
            dispatched = policy.dispatched_count(total),
            "checking declared inputs across meta parameters"
        );

        let mut dispatched = 0usize;
        for (index, configuration) in policy.sample(&sweep) {
            tracing::debug!(index, "checking meta-parameter combination");
            let label = format!("combination {} {}", index, Value::Object(configuration.clone()));
            self.timed_declaration(&configuration, &label, &mut outcome)?;
            dispatched += 1;
        }

        outcome.detail("sections", declared.sections.len());
        outcome.detail("meta_parameters", declared.meta.len());
        outcome.detail("combinations", total);
        outcome.detail("dispatched", dispatched);
        Ok(outcome)
    }

    fn timed_declaration(
        &self,
        meta_config: &Map<String, Value>,
        label: &str,
        outcome: &mut CheckOutcome,
    ) -> ConformanceResult<DeclaredInputs> {
        let start = Instant::now();
        let declared = self.declaration(meta_config);
        let elapsed = start.elapsed();

        let limit = self.config.latency_warning();
        if elapsed > limit {
            outcome.warn(latency_warning(label, elapsed, limit));
        }
        declared
    }
}

fn latency_warning(label: &str, elapsed: Duration, limit: Duration) -> String {
    format!(
        "describe_inputs took {:.2}s for {} (limit {:.2}s); aim for sub-second responses",
        elapsed.as_secs_f64(),
        label,
        limit.as_secs_f64()
    )
}

fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (1, 11) | (2, 12) | (3, 13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}
