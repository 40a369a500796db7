//! Modelkit Conformance Suite
//!
//! Certifies that a model implements the four-operation contract
//! ([`ModelFunctions`]): report a version, declare its inputs, validate an
//! adjustment and run.
//!
//! # Checks
//!
//! Each check is an independent entry point on [`ConformanceSuite`]:
//!
//! - **Version**: `get_version` returns a non-empty label
//! - **Inputs** (A): the declared inputs have the required keys, survive a
//!   JSON round trip and load as parameter sets, for the default and every
//!   sampled meta-parameter combination
//! - **Validation** (B): the known-valid fixture validates cleanly and the
//!   known-invalid one reports errors
//! - **Execution** (C): the run result has the output shape, bokeh outputs
//!   use the json_item format and the result store accepts it
//! - **Adjustment sweep** (D, opt-in): one adjustment per griddable model
//!   parameter
//!
//! # Example
//!
//! ```rust
//! use modelkit_conformance::{ConformanceConfig, ConformanceRunner, ReferenceModel};
//!
//! let fixtures = ReferenceModel::fixtures();
//! let runner = ConformanceRunner::new(ConformanceConfig::default());
//! let report = runner.run("reference", &ReferenceModel, &fixtures);
//! assert!(report.is_conformant());
//! println!("{}", report.to_text());
//! ```

pub mod config;
pub mod error;
pub mod execution;
pub mod framework;
pub mod harness;
pub mod inputs;
pub mod model;
pub mod reference;
pub mod reports;
pub mod store;
pub mod suite;
pub mod sweep;
pub mod validation;

pub use config::ConformanceConfig;
pub use error::{ConformanceError, ConformanceResult, ContractViolation, ErrorKind, BOKEH_DOCS_URL};
pub use execution::check_bokeh;
pub use framework::ConformanceRunner;
pub use harness::TestHarness;
pub use model::{DeclaredInputs, Fixtures, ModelFunctions, Operation};
pub use reference::ReferenceModel;
pub use reports::{CheckKind, ConformanceReport, ReportSummary, TestResult, TestStatus};
pub use store::{InMemoryResultStore, ResultStore, StoreError};
pub use suite::{CheckOutcome, ConformanceSuite};
pub use validation::ValidationResponse;

/// Harness version, stamped at build time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
