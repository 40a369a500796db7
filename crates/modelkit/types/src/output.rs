//! Model outputs: rendered and downloadable artifacts.

use crate::error::SchemaError;
use crate::value::ModelValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of output media types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    #[serde(rename = "bokeh")]
    Bokeh,
    #[serde(rename = "table")]
    Table,
    #[serde(rename = "CSV")]
    Csv,
    #[serde(rename = "PNG")]
    Png,
    #[serde(rename = "JPEG")]
    Jpeg,
    #[serde(rename = "MP3")]
    Mp3,
    #[serde(rename = "MP4")]
    Mp4,
    #[serde(rename = "HDF5")]
    Hdf5,
    #[serde(rename = "PDF")]
    Pdf,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bokeh => "bokeh",
            Self::Table => "table",
            Self::Csv => "CSV",
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Mp3 => "MP3",
            Self::Mp4 => "MP4",
            Self::Hdf5 => "HDF5",
            Self::Pdf => "PDF",
        }
    }

    /// Media types stored as raw bytes rather than text.
    pub fn is_binary(&self) -> bool {
        matches!(
            self,
            Self::Png | Self::Jpeg | Self::Mp3 | Self::Mp4 | Self::Hdf5 | Self::Pdf
        )
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "bokeh" => Self::Bokeh,
            "table" => Self::Table,
            "CSV" => Self::Csv,
            "PNG" => Self::Png,
            "JPEG" => Self::Jpeg,
            "MP3" => Self::Mp3,
            "MP4" => Self::Mp4,
            "HDF5" => Self::Hdf5,
            "PDF" => Self::Pdf,
            other => {
                return Err(SchemaError::InvalidResult(format!(
                    "unknown media_type '{}'",
                    other
                )))
            }
        })
    }
}

/// Payload of an output item.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputData {
    Text(String),
    Bytes(Vec<u8>),
    /// Structured record, e.g. an embedded plot document.
    Record(Vec<(String, ModelValue)>),
}

impl OutputData {
    /// Field names of a record, sorted; empty for text and bytes.
    pub fn field_names(&self) -> Vec<&str> {
        match self {
            Self::Record(fields) => {
                let mut names: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
                names.sort_unstable();
                names
            }
            _ => Vec::new(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Record(_) => "record",
        }
    }
}

/// One rendered or downloadable artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputItem {
    pub title: String,
    pub media_type: MediaType,
    pub data: OutputData,
}

impl OutputItem {
    fn parse(list: &str, index: usize, value: &ModelValue) -> Result<Self, SchemaError> {
        let at = |reason: String| SchemaError::InvalidResult(format!("{}[{}]: {}", list, index, reason));

        let entries = value
            .as_map()
            .ok_or_else(|| at(format!("expected a mapping, found {}", value.type_name())))?;
        if let Some((key, _)) = entries
            .iter()
            .find(|(k, _)| !matches!(k.as_str(), "title" | "media_type" | "data"))
        {
            return Err(at(format!("unknown key '{}'", key)));
        }

        let title = value
            .get("title")
            .and_then(ModelValue::as_str)
            .ok_or_else(|| at("'title' must be a string".to_string()))?
            .to_string();
        let media_type = value
            .get("media_type")
            .and_then(ModelValue::as_str)
            .ok_or_else(|| at("'media_type' must be a string".to_string()))?
            .parse::<MediaType>()
            .map_err(|e| at(e.to_string()))?;
        let data = match value.get("data") {
            Some(ModelValue::Str(s)) => OutputData::Text(s.clone()),
            Some(ModelValue::Bytes(b)) => OutputData::Bytes(b.clone()),
            Some(ModelValue::Map(fields)) => OutputData::Record(fields.clone()),
            Some(other) => {
                return Err(at(format!(
                    "'data' must be text, bytes or a record, found {}",
                    other.type_name()
                )))
            }
            None => return Err(at("missing key 'data'".to_string())),
        };

        Ok(Self {
            title,
            media_type,
            data,
        })
    }
}

/// Complete output of one model run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelResult {
    pub renderable: Vec<OutputItem>,
    pub downloadable: Vec<OutputItem>,
    pub version: Option<String>,
}

impl ModelResult {
    /// Parse a `run_model` payload.
    ///
    /// Requires `renderable` and `downloadable` lists; allows an optional
    /// `version` string; rejects any other key.
    pub fn from_model_value(value: &ModelValue) -> Result<Self, SchemaError> {
        let entries = value.as_map().ok_or_else(|| {
            SchemaError::InvalidResult(format!("expected a mapping, found {}", value.type_name()))
        })?;
        if let Some((key, _)) = entries
            .iter()
            .find(|(k, _)| !matches!(k.as_str(), "renderable" | "downloadable" | "version"))
        {
            return Err(SchemaError::InvalidResult(format!("unknown key '{}'", key)));
        }

        let version = match value.get("version") {
            None | Some(ModelValue::Null) => None,
            Some(ModelValue::Str(v)) => Some(v.clone()),
            Some(other) => {
                return Err(SchemaError::InvalidResult(format!(
                    "'version' must be a string, found {}",
                    other.type_name()
                )))
            }
        };

        Ok(Self {
            renderable: parse_items(value, "renderable")?,
            downloadable: parse_items(value, "downloadable")?,
            version,
        })
    }

    /// Every output item, renderable first.
    pub fn items(&self) -> impl Iterator<Item = &OutputItem> {
        self.renderable.iter().chain(self.downloadable.iter())
    }
}

fn parse_items(value: &ModelValue, key: &str) -> Result<Vec<OutputItem>, SchemaError> {
    let list = value
        .get(key)
        .ok_or_else(|| SchemaError::InvalidResult(format!("missing key '{}'", key)))?
        .as_list()
        .ok_or_else(|| SchemaError::InvalidResult(format!("'{}' must be a list", key)))?;
    list.iter()
        .enumerate()
        .map(|(i, item)| OutputItem::parse(key, i, item))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(media_type: &str, data: ModelValue) -> ModelValue {
        ModelValue::map([
            ("media_type", ModelValue::from(media_type)),
            ("title", ModelValue::from("output")),
            ("data", data),
        ])
    }

    #[test]
    fn test_parse_result() {
        let value = ModelValue::map([
            (
                "renderable",
                ModelValue::List(vec![
                    item("bokeh", json!({"target_id": "abc", "root_id": "123", "doc": "{}"}).into()),
                    item("table", "<table/>".into()),
                ]),
            ),
            (
                "downloadable",
                ModelValue::List(vec![item("PDF", ModelValue::Bytes(b"pdf data".to_vec()))]),
            ),
        ]);
        let result = ModelResult::from_model_value(&value).unwrap();
        assert_eq!(result.renderable.len(), 2);
        assert_eq!(result.items().count(), 3);
        assert_eq!(
            result.renderable[0].data.field_names(),
            vec!["doc", "root_id", "target_id"]
        );
        assert!(result.downloadable[0].media_type.is_binary());
        assert!(result.version.is_none());
    }

    #[test]
    fn test_missing_list_rejected() {
        let value = ModelValue::map([("renderable", ModelValue::List(vec![]))]);
        let err = ModelResult::from_model_value(&value).unwrap_err();
        assert!(err.to_string().contains("downloadable"));
    }

    #[test]
    fn test_unknown_media_type_rejected() {
        let value = ModelValue::map([
            ("renderable", ModelValue::List(vec![item("GIF", "x".into())])),
            ("downloadable", ModelValue::List(vec![])),
        ]);
        let err = ModelResult::from_model_value(&value).unwrap_err();
        assert!(err.to_string().contains("renderable[0]"));
        assert!(err.to_string().contains("GIF"));
    }

    #[test]
    fn test_version_tag() {
        let value = ModelValue::map([
            ("renderable", ModelValue::List(vec![])),
            ("downloadable", ModelValue::List(vec![])),
            ("version", ModelValue::from("1.2.0")),
        ]);
        let result = ModelResult::from_model_value(&value).unwrap();
        assert_eq!(result.version.as_deref(), Some("1.2.0"));
    }

    #[test]
    fn test_media_type_names() {
        assert_eq!("HDF5".parse::<MediaType>().unwrap(), MediaType::Hdf5);
        assert_eq!(MediaType::Csv.to_string(), "CSV");
        assert!(!MediaType::Table.is_binary());
    }
}
