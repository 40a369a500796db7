//! Modelkit schema types.
//!
//! Data shapes shared by every part of the model contract:
//!
//! - [`ModelValue`]: the untyped payload a model hands back across the
//!   contract boundary (a superset of JSON)
//! - [`ParameterSpec`] / [`ParameterSet`]: declared parameters and the
//!   validated factory [`build_parameter_set`]
//! - [`Adjustment`]: partial overrides scoped by major section
//! - [`ErrorsWarnings`]: per-section validation messages
//! - [`ModelResult`] / [`OutputItem`]: rendered and downloadable outputs
//!
//! The [`interchange`] module is the serialization guard: it decides
//! whether a [`ModelValue`] survives a JSON round trip.

pub mod adjustment;
pub mod error;
pub mod errors_warnings;
pub mod interchange;
pub mod output;
pub mod parameter;
pub mod parameter_set;
pub mod value;

pub use adjustment::Adjustment;
pub use error::{SchemaError, SerializationError};
pub use errors_warnings::{ErrorsWarnings, Messages, SectionMessages};
pub use interchange::{assert_round_trippable, normalize, to_interchange};
pub use output::{MediaType, ModelResult, OutputData, OutputItem};
pub use parameter::{ParamType, ParameterSpec, ValueItem};
pub use parameter_set::{build_parameter_set, load_model_parameters, ParameterSet};
pub use value::ModelValue;

/// Crate version, stamped at build time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
