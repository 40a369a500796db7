//! JSON interchange guard.
//!
//! Anything a model hands across the contract (declared inputs, custom
//! adjustments) must survive an encode/decode cycle through JSON.
//! [`to_interchange`] is the strict conversion, [`normalize`] is the
//! lenient "serializable output mode" a model can apply to its own payload
//! before returning it.

use crate::error::SerializationError;
use crate::value::ModelValue;
use serde_json::{Map, Number, Value};

/// Convert a payload to JSON, failing on anything JSON cannot carry.
///
/// Dense numeric arrays become lists. Dates, datetimes, raw bytes and
/// non-finite floats are rejected with the path of the offending value.
pub fn to_interchange(value: &ModelValue) -> Result<Value, SerializationError> {
    convert(value, "$")
}

fn convert(value: &ModelValue, path: &str) -> Result<Value, SerializationError> {
    match value {
        ModelValue::Null => Ok(Value::Null),
        ModelValue::Bool(b) => Ok(Value::Bool(*b)),
        ModelValue::Int(i) => Ok(Value::from(*i)),
        ModelValue::UInt(u) => Ok(Value::from(*u)),
        ModelValue::Float(f) => finite(*f, path),
        ModelValue::Str(s) => Ok(Value::String(s.clone())),
        ModelValue::List(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| convert(item, &format!("{}[{}]", path, i)))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        ModelValue::Map(entries) => {
            let mut map = Map::with_capacity(entries.len());
            for (key, item) in entries {
                let at = format!("{}.{}", path, key);
                if map.contains_key(key) {
                    return Err(SerializationError::new(
                        at,
                        format!("duplicate key '{}' cannot be represented in a JSON object", key),
                    ));
                }
                map.insert(key.clone(), convert(item, &at)?);
            }
            Ok(Value::Object(map))
        }
        ModelValue::NumArray(values) => values
            .iter()
            .enumerate()
            .map(|(i, f)| finite(*f, &format!("{}[{}]", path, i)))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        ModelValue::Date(_) | ModelValue::DateTime(_) | ModelValue::Bytes(_) => {
            Err(SerializationError::new(
                path,
                format!(
                    "Object of type {} is not JSON serializable",
                    value.type_name()
                ),
            ))
        }
    }
}

fn finite(f: f64, path: &str) -> Result<Value, SerializationError> {
    Number::from_f64(f).map(Value::Number).ok_or_else(|| {
        SerializationError::new(path, format!("Out of range float value {} is not JSON compliant", f))
    })
}

/// Lenient conversion: render every payload as JSON.
///
/// Dates and datetimes become ISO-8601 strings, numeric arrays and bytes
/// become lists of numbers, non-finite floats become `null`.
pub fn normalize(value: &ModelValue) -> Value {
    match value {
        ModelValue::Null => Value::Null,
        ModelValue::Bool(b) => Value::Bool(*b),
        ModelValue::Int(i) => Value::from(*i),
        ModelValue::UInt(u) => Value::from(*u),
        ModelValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        ModelValue::Str(s) => Value::String(s.clone()),
        ModelValue::List(items) => Value::Array(items.iter().map(normalize).collect()),
        ModelValue::Map(entries) => Value::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), normalize(v)))
                .collect(),
        ),
        ModelValue::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
        ModelValue::DateTime(dt) => Value::String(dt.to_rfc3339()),
        ModelValue::Bytes(bytes) => Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()),
        ModelValue::NumArray(values) => Value::Array(
            values
                .iter()
                .map(|f| Number::from_f64(*f).map_or(Value::Null, Value::Number))
                .collect(),
        ),
    }
}

/// Check that `value` survives a JSON round trip and return its JSON form.
///
/// `context` names what is being checked ("Meta parameters", "Custom
/// adjustment") and leads the error message.
pub fn assert_round_trippable(
    context: &str,
    value: &ModelValue,
) -> Result<Value, SerializationError> {
    let json = to_interchange(value).map_err(|e| e.with_context(context))?;

    let encoded = serde_json::to_string(&json)
        .map_err(|e| SerializationError::new("$", e.to_string()).with_context(context))?;
    let decoded: Value = serde_json::from_str(&encoded)
        .map_err(|e| SerializationError::new("$", e.to_string()).with_context(context))?;

    if decoded != json {
        return Err(SerializationError::new("$", "value changed across a JSON round trip")
            .with_context(context));
    }

    tracing::trace!(context, bytes = encoded.len(), "payload is JSON round-trippable");
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn date() -> ModelValue {
        ModelValue::Date(NaiveDate::from_ymd_opt(2023, 6, 30).unwrap())
    }

    #[test]
    fn test_plain_json_passes_through() {
        let source = json!({"a": [1, 2.5, "x", null, {"b": false}]});
        let value = ModelValue::from(source.clone());
        assert_eq!(to_interchange(&value).unwrap(), source);
    }

    #[test]
    fn test_numeric_array_becomes_list() {
        let value = ModelValue::NumArray(vec![1.0, 2.5]);
        assert_eq!(to_interchange(&value).unwrap(), json!([1.0, 2.5]));
    }

    #[test]
    fn test_date_is_rejected_with_path() {
        let value = ModelValue::map([(
            "start",
            ModelValue::List(vec![ModelValue::map([("value", date())])]),
        )]);
        let err = to_interchange(&value).unwrap_err();
        assert_eq!(err.path, "$.start[0].value");
        assert!(err.reason.contains("date"));
    }

    #[test]
    fn test_nan_is_rejected() {
        let err = to_interchange(&ModelValue::Float(f64::NAN)).unwrap_err();
        assert!(err.reason.contains("not JSON compliant"));
    }

    #[test]
    fn test_bytes_are_rejected() {
        assert!(to_interchange(&ModelValue::Bytes(b"pdf".to_vec())).is_err());
    }

    #[test]
    fn test_duplicate_map_key_is_rejected() {
        let value = ModelValue::map([
            ("inner", ModelValue::map([("a", ModelValue::Int(1)), ("a", ModelValue::Int(2))])),
        ]);
        let err = assert_round_trippable("payload", &value).unwrap_err();
        assert_eq!(err.path, "$.inner.a");
        assert!(err.reason.contains("duplicate key 'a'"));
    }

    #[test]
    fn test_large_int_default_survives_guard() {
        let declared = ModelValue::from(json!({
            "big": {"title": "Big", "type": "int", "value": u64::MAX}
        }));
        let json = assert_round_trippable("Model parameters", &declared).unwrap();
        assert_eq!(json["big"]["value"], json!(u64::MAX));
        let set = crate::build_parameter_set(&json).unwrap();
        assert_eq!(set.default_value("big"), Some(&json!(u64::MAX)));
    }

    #[test]
    fn test_normalize_renders_dates() {
        let value = ModelValue::map([("start", date()), ("xs", ModelValue::NumArray(vec![1.0]))]);
        assert_eq!(normalize(&value), json!({"start": "2023-06-30", "xs": [1.0]}));
    }

    #[test]
    fn test_normalized_payload_round_trips() {
        let value = ModelValue::map([("start", date())]);
        let normalized = ModelValue::from(normalize(&value));
        assert!(assert_round_trippable("Meta parameters", &normalized).is_ok());
    }

    #[test]
    fn test_round_trip_error_carries_context() {
        let err = assert_round_trippable("Custom adjustment", &date()).unwrap_err();
        assert_eq!(err.context, "Custom adjustment");
        assert!(err.to_string().contains("serializable"));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// JSON-native payloads always survive the guard unchanged.
            #[test]
            fn native_payloads_round_trip(
                ints in prop::collection::vec(any::<i64>(), 0..8),
                floats in prop::collection::vec(-1e12f64..1e12, 0..8),
                label in ".{0,16}",
            ) {
                let value = ModelValue::map([
                    ("ints", ModelValue::List(ints.iter().copied().map(ModelValue::Int).collect())),
                    ("floats", ModelValue::NumArray(floats.clone())),
                    ("label", ModelValue::Str(label.clone())),
                ]);
                let json = assert_round_trippable("payload", &value).unwrap();
                prop_assert_eq!(json["ints"].as_array().unwrap().len(), ints.len());
                prop_assert_eq!(json["label"].as_str(), Some(label.as_str()));
                let normalized = ModelValue::from(normalize(&value));
                prop_assert_eq!(normalized.keys(), vec!["ints", "floats", "label"]);
            }
        }
    }
}
