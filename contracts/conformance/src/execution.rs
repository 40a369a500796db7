//! Check C: model execution conformance.

use crate::error::{ConformanceResult, ContractViolation};
use crate::model::{ModelFunctions, Operation};
use crate::reports::CheckKind;
use crate::suite::{invoke, CheckOutcome, ConformanceSuite};
use modelkit_types::{MediaType, ModelResult, OutputData, OutputItem};
use serde_json::Map;

const BOKEH_FIELDS: [&str; 3] = ["doc", "root_id", "target_id"];
const LEGACY_BOKEH_FIELDS: [&str; 2] = ["html", "javascript"];

/// Bokeh outputs must be json_item records; the legacy html/javascript
/// pair is rejected outright.
pub fn check_bokeh(item: &OutputItem) -> Result<(), ContractViolation> {
    if item.media_type != MediaType::Bokeh {
        return Ok(());
    }
    let fields = item.data.field_names();
    if LEGACY_BOKEH_FIELDS.iter().all(|f| fields.contains(f)) {
        return Err(ContractViolation::LegacyBokeh {
            title: item.title.clone(),
        });
    }
    if !matches!(item.data, OutputData::Record(_)) || fields != BOKEH_FIELDS {
        return Err(ContractViolation::MalformedBokeh {
            title: item.title.clone(),
            fields: fields.into_iter().map(str::to_string).collect(),
        });
    }
    Ok(())
}

impl<M: ModelFunctions + ?Sized> ConformanceSuite<'_, M> {
    /// Run the model with the known-valid adjustment and check its result.
    pub fn check_execution(&self) -> ConformanceResult<CheckOutcome> {
        let mut outcome = CheckOutcome::new(CheckKind::Execution);

        let declared = self.declaration(&Map::new())?;
        let meta_spec = declared.meta_spec();
        let raw = invoke(Operation::RunModel, || {
            self.model.run_model(&meta_spec, &self.fixtures.ok_adjustment)
        })?;
        if !raw.is_map() {
            return Err(ContractViolation::NotAMapping {
                operation: Operation::RunModel,
                found: raw.type_name(),
            }
            .into());
        }

        let result = ModelResult::from_model_value(&raw)
            .map_err(|source| ContractViolation::InvalidResult { source })?;
        for item in result.items() {
            check_bokeh(item)?;
        }
        let key = self
            .store
            .write(&result)
            .map_err(|source| ContractViolation::StoreRejected { source })?;

        outcome.detail("renderable", result.renderable.len());
        outcome.detail("downloadable", result.downloadable.len());
        outcome.detail("stored_as", key);
        if let Some(version) = &result.version {
            outcome.detail("result_version", version);
        }
        tracing::info!(
            renderable = result.renderable.len(),
            downloadable = result.downloadable.len(),
            "execution check passed"
        );
        Ok(outcome)
    }
}
