//! A small model that satisfies the whole contract.
//!
//! One meta parameter, `hello_world`, chooses between two greetings; one
//! major section, `mock`, holds an integer `model_param` and a
//! presentation-only `checkbox_param`.

use crate::model::{Fixtures, ModelFunctions};
use anyhow::{anyhow, bail};
use modelkit_types::{Adjustment, ErrorsWarnings, ModelValue};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceModel;

impl ReferenceModel {
    pub const VERSION: &'static str = crate::VERSION;
    pub const GREETINGS: [&'static str; 2] = ["hello, world!", "hello, there!"];
    pub const SECTION: &'static str = "mock";
    const MODEL_PARAM_RANGE: (i64, i64) = (0, 10);

    pub fn meta_parameters() -> Value {
        json!({
            "hello_world": {
                "title": "hello world",
                "description": "Greeting the model is declared for",
                "type": "str",
                "value": Self::GREETINGS[0],
                "validators": {"choice": {"choices": Self::GREETINGS}},
            }
        })
    }

    pub fn model_parameters(greeting: &str) -> Value {
        json!({
            (Self::SECTION): {
                "schema": {
                    "additional_members": {"checkbox": {"type": "bool", "number_dims": 0}}
                },
                "model_param": {
                    "title": "Model Param",
                    "description": format!("A model param ({})", greeting),
                    "type": "int",
                    "value": [{"value": 1}],
                    "validators": {
                        "range": {"min": Self::MODEL_PARAM_RANGE.0, "max": Self::MODEL_PARAM_RANGE.1}
                    },
                },
                "checkbox_param": {
                    "title": "Checkbox Param",
                    "description": "A checkbox param",
                    "type": "int",
                    "value": [{"value": 4}],
                    "checkbox": true,
                },
            }
        })
    }

    /// `model_param = 2` is valid; a string is not.
    pub fn fixtures() -> Fixtures {
        Fixtures::new(
            Adjustment::new().with(Self::SECTION, "model_param", 2),
            Adjustment::new().with(Self::SECTION, "model_param", "not an int"),
        )
    }

    fn greeting(meta: &Map<String, Value>) -> anyhow::Result<&str> {
        match meta.get("hello_world") {
            None => Ok(Self::GREETINGS[0]),
            Some(Value::String(g)) if Self::GREETINGS.contains(&g.as_str()) => Ok(g),
            Some(other) => Err(anyhow!("unknown greeting {}", other)),
        }
    }
}

/// Accepts an integer, a list of them, or array-first `{"value": ...}` items.
fn integer_values(value: &Value) -> Option<Vec<i64>> {
    match value {
        Value::Number(n) => n.as_i64().map(|i| vec![i]),
        Value::Array(items) => items
            .iter()
            .map(integer_values)
            .collect::<Option<Vec<_>>>()
            .map(|lists| lists.concat()),
        Value::Object(item) => item.get("value").and_then(integer_values),
        _ => None,
    }
}

impl ModelFunctions for ReferenceModel {
    fn get_version(&self) -> anyhow::Result<String> {
        Ok(Self::VERSION.to_string())
    }

    fn describe_inputs(&self, meta_config: &Map<String, Value>) -> anyhow::Result<ModelValue> {
        let greeting = Self::greeting(meta_config)?;
        Ok(ModelValue::from(json!({
            "meta_parameters": Self::meta_parameters(),
            "model_parameters": Self::model_parameters(greeting),
        })))
    }

    fn validate_adjustment(
        &self,
        meta_spec: &Map<String, Value>,
        adjustment: &Adjustment,
        mut errors_warnings: ErrorsWarnings,
    ) -> anyhow::Result<ModelValue> {
        Self::greeting(meta_spec)?;

        for (section, params) in adjustment.sections() {
            let messages = errors_warnings
                .section_mut(section)
                .ok_or_else(|| anyhow!("unknown section '{}'", section))?;
            for (param, value) in params {
                if !matches!(param.as_str(), "model_param" | "checkbox_param") {
                    messages.add_error(param, format!("Unknown parameter '{}'.", param));
                    continue;
                }
                let Some(values) = integer_values(value) else {
                    messages.add_error(param, "Not a valid integer.");
                    continue;
                };
                let (min, max) = Self::MODEL_PARAM_RANGE;
                if param == "model_param" {
                    for v in values.into_iter().filter(|v| *v < min || *v > max) {
                        messages.add_error(
                            param,
                            format!("model_param {} must be between {} and {}.", v, min, max),
                        );
                    }
                }
            }
        }

        Ok(ModelValue::map([(
            "errors_warnings",
            ModelValue::from(errors_warnings.to_value()),
        )]))
    }

    fn run_model(
        &self,
        meta_spec: &Map<String, Value>,
        adjustment: &Adjustment,
    ) -> anyhow::Result<ModelValue> {
        let greeting = Self::greeting(meta_spec)?;
        let model_param = match adjustment
            .section(Self::SECTION)
            .and_then(|params| params.get("model_param"))
        {
            Some(value) => integer_values(value)
                .and_then(|v| v.first().copied())
                .ok_or_else(|| anyhow!("model_param must be an integer"))?,
            None => 1,
        };
        if model_param < 0 {
            bail!("model_param must not be negative");
        }

        let csv = format!("greeting,model_param\n{},{}\n", greeting, model_param);
        let plot = ModelValue::map([
            ("target_id", ModelValue::from("model-plot")),
            ("root_id", ModelValue::from("1001")),
            (
                "doc",
                ModelValue::from(json!({"roots": {"references": [], "root_ids": ["1001"]}})),
            ),
        ]);
        let output = |title: &str, media_type: &str, data: ModelValue| {
            ModelValue::map([
                ("title", ModelValue::from(title)),
                ("media_type", ModelValue::from(media_type)),
                ("data", data),
            ])
        };

        Ok(ModelValue::map([
            (
                "renderable",
                ModelValue::List(vec![
                    output("Model plot", "bokeh", plot),
                    output(
                        "Model table",
                        "table",
                        ModelValue::from(format!(
                            "<table><tr><td>{}</td><td>{}</td></tr></table>",
                            greeting, model_param
                        )),
                    ),
                ]),
            ),
            (
                "downloadable",
                ModelValue::List(vec![
                    output("Model data", "CSV", ModelValue::from(csv)),
                    output("Model report", "PDF", ModelValue::Bytes(b"%PDF-1.4\n".to_vec())),
                ]),
            ),
            ("version", ModelValue::from(Self::VERSION)),
        ]))
    }
}
