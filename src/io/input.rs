use anyhow::{Context, Result, bail};
use serde_json::Value;
use tracing::debug;

use crate::domain::{Record, ScreenSchema, record_from_value};

use super::DocumentFormat;

/// Key a TOML record set lives under, since TOML has no top-level arrays.
pub const RECORDS_KEY: &str = "records";

/// Parse structured data in any supported format into a `serde_json::Value`.
pub fn parse_document_str(contents: &str, format: DocumentFormat) -> Result<Value> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str::<Value>(contents).with_context(|| "failed to parse JSON document")
        }
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => {
            serde_yaml::from_str::<Value>(contents).with_context(|| "failed to parse YAML document")
        }
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => contents
            .parse::<toml::Table>()
            .with_context(|| "failed to parse TOML document")
            .and_then(|value| {
                serde_json::to_value(value).context("failed to convert TOML to JSON")
            }),
    }
}

/// Read an annotated JSON Schema document and build the screen it describes.
pub fn load_screen_str(contents: &str, format: DocumentFormat) -> Result<ScreenSchema> {
    let document = parse_document_str(contents, format)?;
    let screen = ScreenSchema::from_json_schema(&document)
        .with_context(|| format!("failed to build screen from {format} schema"))?;
    debug!(screen = %screen.id, fields = screen.fields.len(), "screen loaded");
    Ok(screen)
}

/// Read a record set: either a top-level array of objects or an object
/// holding that array under `records`.
pub fn load_records_str(contents: &str, format: DocumentFormat) -> Result<Vec<Record>> {
    let document = parse_document_str(contents, format)?;
    records_from_value(document)
}

pub fn records_from_value(document: Value) -> Result<Vec<Record>> {
    let items = match document {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(RECORDS_KEY) {
            Some(Value::Array(items)) => items,
            Some(_) => bail!("`{RECORDS_KEY}` must be an array of objects"),
            None => bail!("record document has no `{RECORDS_KEY}` array"),
        },
        _ => bail!("record document must be an array or an object"),
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            record_from_value(item).with_context(|| format!("record {index} is not an object"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_bare_and_wrapped_record_sets() {
        let bare = load_records_str(r#"[{"code": "A"}, {"code": "B"}]"#, DocumentFormat::Json)
            .unwrap();
        assert_eq!(bare.len(), 2);
        assert_eq!(bare[1]["code"], json!("B"));

        let wrapped =
            load_records_str(r#"{"records": [{"code": "A"}]}"#, DocumentFormat::Json).unwrap();
        assert_eq!(wrapped.len(), 1);
    }

    #[test]
    fn rejects_non_object_records() {
        let err = load_records_str(r#"[{"code": "A"}, 3]"#, DocumentFormat::Json).unwrap_err();
        assert!(err.to_string().contains("record 1"));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn reads_toml_record_tables() {
        let contents = "[[records]]\ncode = \"A\"\n\n[[records]]\ncode = \"B\"\n";
        let records = load_records_str(contents, DocumentFormat::Toml).unwrap();
        assert_eq!(records.len(), 2);
    }
}
