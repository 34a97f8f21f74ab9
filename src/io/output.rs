use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::{Record, record_to_value};

use super::DocumentFormat;

/// Serializes a record collection as a document. TOML nests the records
/// under `records`. Writing the text is left to the caller.
pub fn render_records(records: &[Record], format: DocumentFormat, pretty: bool) -> Result<String> {
    let items = Value::Array(records.iter().map(record_to_value).collect());
    debug!(records = records.len(), %format, "rendering records");
    match format {
        DocumentFormat::Json if pretty => {
            serde_json::to_string_pretty(&items).context("failed to serialize JSON")
        }
        DocumentFormat::Json => serde_json::to_string(&items).context("failed to serialize JSON"),
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => serde_yaml::to_string(&items).context("failed to serialize YAML"),
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => {
            let mut wrapper = Map::new();
            wrapper.insert(super::input::RECORDS_KEY.to_string(), strip_nulls(items));
            let wrapper = Value::Object(wrapper);
            if pretty {
                toml::to_string_pretty(&wrapper).context("failed to serialize TOML")
            } else {
                toml::to_string(&wrapper).context("failed to serialize TOML")
            }
        }
    }
}

/// TOML has no null; drop those keys instead of failing the whole export.
#[cfg_attr(not(feature = "toml"), allow(dead_code))]
fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, value)| !value.is_null())
                .map(|(key, value)| (key, strip_nulls(value)))
                .collect::<Map<_, _>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Vec<Record> {
        vec![
            [("code".to_string(), json!("A")), ("name".to_string(), json!("Alpha"))]
                .into_iter()
                .collect(),
        ]
    }

    #[test]
    fn pretty_flag_controls_json_layout() {
        let compact = render_records(&sample(), DocumentFormat::Json, false).unwrap();
        assert_eq!(compact, r#"[{"code":"A","name":"Alpha"}]"#);

        let pretty = render_records(&sample(), DocumentFormat::Json, true).unwrap();
        assert!(pretty.contains('\n'));
        assert_eq!(serde_json::from_str::<Value>(&pretty).unwrap()[0]["name"], json!("Alpha"));
    }

    #[test]
    fn empty_collection_renders_an_empty_array() {
        assert_eq!(render_records(&[], DocumentFormat::Json, false).unwrap(), "[]");
    }

    #[cfg(feature = "toml")]
    #[test]
    fn toml_output_wraps_records_and_drops_nulls() {
        let mut records = sample();
        records[0].insert("note".to_string(), Value::Null);
        let text = render_records(&records, DocumentFormat::Toml, true).unwrap();
        assert!(text.contains("[[records]]"));
        assert!(!text.contains("note"));
    }
}
