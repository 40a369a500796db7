//! Conformance run configuration

use crate::error::{ConformanceError, ConformanceResult};
use modelkit_grid::{SamplingPolicy, DEFAULT_MAX_GRID_LEN};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for conformance testing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConformanceConfig {
    /// Run the version check
    pub run_version: bool,

    /// Run input declaration checks
    pub run_inputs: bool,

    /// Run adjustment validation checks
    pub run_validation: bool,

    /// Run model execution checks
    pub run_execution: bool,

    /// Validate one adjustment per griddable model parameter
    pub run_adjustment_sweep: bool,

    /// Keep running the remaining checks after a failure
    pub continue_on_failure: bool,

    /// A single `describe_inputs` call slower than this is reported
    pub latency_warning_ms: u64,

    /// Which meta-parameter combinations are dispatched
    pub sampling: SamplingPolicy,

    /// Largest grid a single parameter may produce
    pub max_grid_len: usize,
}

impl Default for ConformanceConfig {
    fn default() -> Self {
        Self {
            run_version: true,
            run_inputs: true,
            run_validation: true,
            run_execution: true,
            run_adjustment_sweep: false,
            continue_on_failure: true,
            latency_warning_ms: 1000,
            sampling: SamplingPolicy::default(),
            max_grid_len: DEFAULT_MAX_GRID_LEN,
        }
    }
}

impl ConformanceConfig {
    /// Load configuration from a TOML file; defaults when the file is absent.
    pub fn load(path: impl AsRef<Path>) -> ConformanceResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config = Self::from_toml_str(&contents)?;
            tracing::debug!(path = %path.display(), "loaded conformance config");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(contents: &str) -> ConformanceResult<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| ConformanceError::Config(e.to_string()))?;
        if config.max_grid_len == 0 {
            return Err(ConformanceError::Config(
                "max_grid_len must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn latency_warning(&self) -> Duration {
        Duration::from_millis(self.latency_warning_ms)
    }
}
