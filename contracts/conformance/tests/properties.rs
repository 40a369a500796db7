use modelkit_conformance::{ConformanceSuite, Fixtures, ReferenceModel};
use modelkit_types::Adjustment;
use proptest::prelude::*;

proptest! {
    /// In-range fixtures pass Check B and out-of-range ones are caught,
    /// whatever the concrete values.
    #[test]
    fn validation_separates_in_and_out_of_range(ok in 0i64..=10, bad in 11i64..10_000) {
        let fixtures = Fixtures::new(
            Adjustment::new().with("mock", "model_param", ok),
            Adjustment::new().with("mock", "model_param", bad),
        );
        let outcome = ConformanceSuite::new(&ReferenceModel, &fixtures).check_validation();
        prop_assert!(outcome.is_ok(), "{:?}", outcome.err());
    }

    /// Swapping the fixtures always fails the check.
    #[test]
    fn swapped_fixtures_fail(ok in 0i64..=10, bad in 11i64..10_000) {
        let fixtures = Fixtures::new(
            Adjustment::new().with("mock", "model_param", bad),
            Adjustment::new().with("mock", "model_param", ok),
        );
        prop_assert!(ConformanceSuite::new(&ReferenceModel, &fixtures).check_validation().is_err());
    }
}
