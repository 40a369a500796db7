use modelkit_grid::{Axis, SamplingPolicy, Sweep};
use proptest::prelude::*;
use serde_json::Value;

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

proptest! {
    /// The sweep size is the product of the grid sizes and every
    /// configuration appears exactly once.
    #[test]
    fn sweep_is_full_product(sizes in prop::collection::vec(1usize..5, 0..4)) {
        let sweep = sweep(&sizes);
        let expected: usize = sizes.iter().product();
        prop_assert_eq!(sweep.total(), expected);

        let configs: Vec<_> = sweep.iter().map(|(_, c)| Value::Object(c)).collect();
        prop_assert_eq!(configs.len(), expected);
        let mut unique = configs.iter().map(Value::to_string).collect::<Vec<_>>();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(unique.len(), expected);
    }

    /// Above the threshold exactly the indices divisible by the stride are
    /// dispatched, and the choice is the same on every pass.
    #[test]
    fn sampling_is_deterministic(sizes in prop::collection::vec(1usize..6, 1..4)) {
        let sweep = sweep(&sizes);
        let policy = SamplingPolicy::default();
        let first: Vec<usize> = policy.sample(&sweep).map(|(i, _)| i).collect();
        let second: Vec<usize> = policy.sample(&sweep).map(|(i, _)| i).collect();
        prop_assert_eq!(&first, &second);

        let expected: Vec<usize> = if sweep.total() > 9 {
            (0..sweep.total()).filter(|i| i % 3 == 0).collect()
        } else {
            (0..sweep.total()).collect()
        };
        prop_assert_eq!(first.len(), policy.dispatched_count(sweep.total()));
        prop_assert_eq!(first, expected);
    }
}
