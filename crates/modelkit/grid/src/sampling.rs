//! Deterministic thinning of large sweeps.

use crate::product::{Configuration, Sweep};
use serde::{Deserialize, Serialize};

/// Which sweep indices are actually dispatched to the model.
///
/// Sweeps of at most `threshold` configurations are dispatched in full;
/// larger ones only at indices divisible by `stride`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingPolicy {
    pub threshold: usize,
    pub stride: usize,
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self {
            threshold: 9,
            stride: 3,
        }
    }
}

impl SamplingPolicy {
    /// Dispatch every configuration regardless of size.
    pub fn exhaustive() -> Self {
        Self {
            threshold: usize::MAX,
            stride: 1,
        }
    }

    pub fn is_reduced(&self, total: usize) -> bool {
        total > self.threshold
    }

    pub fn dispatches(&self, index: usize, total: usize) -> bool {
        !self.is_reduced(total) || index % self.stride.max(1) == 0
    }

    pub fn dispatched_count(&self, total: usize) -> usize {
        if self.is_reduced(total) {
            total.div_ceil(self.stride.max(1))
        } else {
            total
        }
    }

    /// The dispatched `(index, configuration)` pairs, in sweep order.
    pub fn sample<'a>(&self, sweep: &'a Sweep) -> impl Iterator<Item = (usize, Configuration)> + 'a {
        let policy = *self;
        let total = sweep.total();
        sweep
            .iter()
            .filter(move |(index, _)| policy.dispatches(*index, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Axis;
    use serde_json::{json, Value};

    fn sweep(sizes: &[usize]) -> Sweep {
        let axes = sizes
            .iter()
            .enumerate()
            .map(|(i, n)| Axis {
                name: format!("p{}", i),
                grid: (0..*n as i64).map(Value::from).collect(),
            })
            .collect();
        Sweep::new(axes, vec![]).unwrap()
    }

    #[test]
    fn test_small_sweep_is_exhaustive() {
        let sweep = sweep(&[3, 3]);
        let policy = SamplingPolicy::default();
        assert!(!policy.is_reduced(sweep.total()));
        assert_eq!(policy.sample(&sweep).count(), 9);
    }

    #[test]
    fn test_large_sweep_every_third() {
        let sweep = sweep(&[2, 3, 2]);
        let policy = SamplingPolicy::default();
        let indices: Vec<usize> = policy.sample(&sweep).map(|(i, _)| i).collect();
        assert_eq!(indices, vec![0, 3, 6, 9]);
        assert_eq!(policy.dispatched_count(12), 4);
    }

    #[test]
    fn test_sampled_configurations_are_the_indexed_ones() {
        let sweep = sweep(&[2, 3, 2]);
        let (index, config) = SamplingPolicy::default().sample(&sweep).nth(1).unwrap();
        assert_eq!(index, 3);
        assert_eq!(Value::Object(config), json!({"p0": 0, "p1": 1, "p2": 1}));
    }

    #[test]
    fn test_exhaustive_policy() {
        let sweep = sweep(&[5, 5]);
        assert_eq!(SamplingPolicy::exhaustive().sample(&sweep).count(), 25);
    }

    #[test]
    fn test_zero_stride_treated_as_one() {
        let policy = SamplingPolicy {
            threshold: 0,
            stride: 0,
        };
        assert_eq!(policy.dispatched_count(4), 4);
        assert!(policy.dispatches(3, 4));
    }

    #[test]
    fn test_policy_deserializes_with_defaults() {
        let policy: SamplingPolicy = serde_json::from_value(json!({"stride": 5})).unwrap();
        assert_eq!(policy.threshold, 9);
        assert_eq!(policy.stride, 5);
    }
}
