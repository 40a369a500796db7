#![allow(dead_code)]

use modelkit_conformance::{ModelFunctions, ReferenceModel};
use modelkit_types::{Adjustment, ErrorsWarnings, ModelValue};
use serde_json::{Map, Value};
use std::cell::RefCell;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install a test subscriber once; `RUST_LOG` picks the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "modelkit=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer().without_time())
        .try_init();
}

/// The reference model with individual operations replaced.
#[derive(Default)]
pub struct Scripted {
    pub describe_inputs: Option<ModelValue>,
    pub validate_adjustment: Option<ModelValue>,
    pub run_model: Option<ModelValue>,
    pub fail: Option<&'static str>,
}

impl Scripted {
    pub fn describing(value: impl Into<ModelValue>) -> Self {
        Self {
            describe_inputs: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn validating(value: impl Into<ModelValue>) -> Self {
        Self {
            validate_adjustment: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn running(value: impl Into<ModelValue>) -> Self {
        Self {
            run_model: Some(value.into()),
            ..Default::default()
        }
    }
}

impl ModelFunctions for Scripted {
    fn get_version(&self) -> anyhow::Result<String> {
        ReferenceModel.get_version()
    }

    fn describe_inputs(&self, meta_config: &Map<String, Value>) -> anyhow::Result<ModelValue> {
        match &self.describe_inputs {
            Some(value) => Ok(value.clone()),
            None => ReferenceModel.describe_inputs(meta_config),
        }
    }

    fn validate_adjustment(
        &self,
        meta_spec: &Map<String, Value>,
        adjustment: &Adjustment,
        errors_warnings: ErrorsWarnings,
    ) -> anyhow::Result<ModelValue> {
        match &self.validate_adjustment {
            Some(value) => Ok(value.clone()),
            None => ReferenceModel.validate_adjustment(meta_spec, adjustment, errors_warnings),
        }
    }

    fn run_model(
        &self,
        meta_spec: &Map<String, Value>,
        adjustment: &Adjustment,
    ) -> anyhow::Result<ModelValue> {
        if let Some(message) = self.fail {
            anyhow::bail!("{}", message);
        }
        match &self.run_model {
            Some(value) => Ok(value.clone()),
            None => ReferenceModel.run_model(meta_spec, adjustment),
        }
    }
}

/// Records every call made to the wrapped model.
pub struct Recording<M> {
    pub inner: M,
    pub meta_configs: RefCell<Vec<Map<String, Value>>>,
    pub templates: RefCell<Vec<ErrorsWarnings>>,
}

impl<M> Recording<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            meta_configs: RefCell::new(Vec::new()),
            templates: RefCell::new(Vec::new()),
        }
    }
}

impl<M: ModelFunctions> ModelFunctions for Recording<M> {
    fn get_version(&self) -> anyhow::Result<String> {
        self.inner.get_version()
    }

    fn describe_inputs(&self, meta_config: &Map<String, Value>) -> anyhow::Result<ModelValue> {
        self.meta_configs.borrow_mut().push(meta_config.clone());
        self.inner.describe_inputs(meta_config)
    }

    fn validate_adjustment(
        &self,
        meta_spec: &Map<String, Value>,
        adjustment: &Adjustment,
        errors_warnings: ErrorsWarnings,
    ) -> anyhow::Result<ModelValue> {
        self.templates.borrow_mut().push(errors_warnings.clone());
        self.inner.validate_adjustment(meta_spec, adjustment, errors_warnings)
    }

    fn run_model(
        &self,
        meta_spec: &Map<String, Value>,
        adjustment: &Adjustment,
    ) -> anyhow::Result<ModelValue> {
        self.inner.run_model(meta_spec, adjustment)
    }
}
