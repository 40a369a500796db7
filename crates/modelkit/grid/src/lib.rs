//! Modelkit parameter grids.
//!
//! Derives the admissible values of a parameter from its single declared
//! validator, and combines the grids of a meta-parameter set into the full
//! Cartesian sweep of configurations.
//!
//! # Quick Start
//!
//! ```rust
//! use modelkit_grid::{enumerate_configurations, SamplingPolicy, StrategyRegistry};
//! use modelkit_types::build_parameter_set;
//! use serde_json::json;
//!
//! let meta = build_parameter_set(&json!({
//!     "hello_world": {
//!         "title": "hello world",
//!         "type": "str",
//!         "value": "hello, world!",
//!         "validators": {"choice": {"choices": ["hello, world!", "hello, there!"]}},
//!     }
//! }))
//! .unwrap();
//!
//! let sweep = enumerate_configurations(&meta, &StrategyRegistry::new()).unwrap();
//! assert_eq!(sweep.total(), 2);
//! assert_eq!(SamplingPolicy::default().sample(&sweep).count(), 2);
//! ```

pub mod error;
pub mod grid;
pub mod product;
pub mod sampling;
pub mod strategy;

pub use error::{GridError, GridResult};
pub use grid::grid_for;
pub use product::{enumerate_configurations, Axis, Combinations, Configuration, ExcludedParameter, Sweep};
pub use sampling::SamplingPolicy;
pub use strategy::{
    ChoiceGrid, DateRangeGrid, GridContext, GridStrategy, RangeGrid, StrategyRegistry,
    DEFAULT_MAX_GRID_LEN,
};

/// Crate version, stamped at build time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
