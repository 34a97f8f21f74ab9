use anyhow::{Context, Result, bail};
use schemars::schema::{InstanceType, RootSchema, Schema, SchemaObject, SingleOrVec};
use serde::Deserialize;
use serde_json::Value;

use super::schema::{
    EntrySchema, FieldKind, FieldRule, FieldSchema, KeyCompare, Pattern, ScreenSchema, SortKey,
    UniqueKey, prettify_label,
};

const DEFAULT_PATTERN_MESSAGE: &str = "{field} has an invalid format";

/// Build a screen from a JSON Schema document describing one record.
///
/// Besides the standard keywords (`required`, `maxLength`, `minLength`,
/// `pattern`, `minimum`, `maximum`, `format`, `minItems`) a few extensions
/// are understood:
///
/// * root `x-screen`, `x-unique`, `x-sort`
/// * field `x-key`, `x-provenance`, `x-before`, `x-not-past-on-add`,
///   `x-pattern-message`
/// * array items `x-entry-key`, `x-entry-sequence`
pub fn parse_screen_schema(document: &Value) -> Result<ScreenSchema> {
    let root: RootSchema = serde_json::from_value(document.clone())
        .context("screen definition is not a valid JSON Schema document")?;
    let schema = &root.schema;
    if !is_object_schema(schema) {
        bail!("screen schema must describe an object");
    }

    let title = schema.metadata.as_ref().and_then(|meta| meta.title.clone());
    let id = extension_string(schema, "x-screen")
        .or_else(|| title.as_deref().map(slugify))
        .unwrap_or_else(|| "screen".to_string());
    let title = title.unwrap_or_else(|| prettify_label(&id));

    let mut screen = ScreenSchema::new(id, title);
    for field in parse_fields(schema)? {
        screen = screen.with_field(field);
    }
    for key in unique_keys(schema)? {
        if screen.field(&key.field).is_none() {
            bail!("x-unique refers to unknown field `{}`", key.field);
        }
        screen = screen.with_unique(key);
    }
    if let Some(fields) = extension_strings(schema, "x-sort") {
        screen = screen.with_sort(SortKey::by(fields));
    }
    Ok(screen.with_document(document.clone()))
}

fn parse_fields(schema: &SchemaObject) -> Result<Vec<FieldSchema>> {
    let object = schema
        .object
        .as_ref()
        .context("object schema must define properties")?;
    let mut fields = Vec::with_capacity(object.properties.len());
    for (name, property) in &object.properties {
        let Schema::Object(property) = property else {
            bail!("field `{name}` must be described by a schema object");
        };
        let required = object.required.contains(name);
        fields.push(build_field(name, property, required)?);
    }
    Ok(fields)
}

fn build_field(name: &str, schema: &SchemaObject, required: bool) -> Result<FieldSchema> {
    let kind = detect_kind(name, schema)?;
    let mut field = FieldSchema::new(name, kind);

    if let Some(meta) = schema.metadata.as_ref() {
        if let Some(title) = &meta.title {
            field.title = title.clone();
        }
        field.description = meta.description.clone();
        field.default = meta.default.clone();
    }
    if required {
        field = field.required();
    }

    if let Some(string) = schema.string.as_ref() {
        if let Some(min) = string.min_length {
            field = field.min_length(min as usize);
        }
        if let Some(max) = string.max_length {
            field = field.max_length(max as usize);
        }
        if let Some(source) = &string.pattern {
            let message = extension_string(schema, "x-pattern-message")
                .unwrap_or_else(|| DEFAULT_PATTERN_MESSAGE.to_string());
            let pattern = Pattern::new(source, message)
                .with_context(|| format!("field `{name}` has an invalid pattern"))?;
            field = field.pattern(pattern);
        }
    }
    if schema.format.as_deref() == Some("email") {
        field = field.pattern(Pattern::email()?);
    }
    if let Some(number) = schema.number.as_ref()
        && (number.minimum.is_some() || number.maximum.is_some())
    {
        field = field.rule(FieldRule::Range {
            min: number.minimum,
            max: number.maximum,
        });
    }

    if let Some(other) = extension_string(schema, "x-before") {
        field = field.before(other);
    }
    if extension_bool(schema, "x-not-past-on-add") {
        field = field.not_past_on_add();
    }
    if extension_bool(schema, "x-key") {
        field = field.key();
    }
    if extension_bool(schema, "x-provenance") {
        field = field.provenance();
    }
    Ok(field)
}

fn detect_kind(name: &str, schema: &SchemaObject) -> Result<FieldKind> {
    if schema.format.as_deref() == Some("date") {
        return Ok(FieldKind::Date);
    }
    match instance_type(schema) {
        Some(InstanceType::String) | None => Ok(FieldKind::Text),
        Some(InstanceType::Integer) => Ok(FieldKind::Integer),
        Some(InstanceType::Number) => Ok(FieldKind::Number),
        Some(InstanceType::Boolean) => Ok(FieldKind::Boolean),
        Some(InstanceType::Array) => {
            let array = schema
                .array
                .as_ref()
                .with_context(|| format!("array field `{name}` must define items"))?;
            let item = match array.items.as_ref() {
                Some(SingleOrVec::Single(item)) => item.as_ref(),
                Some(SingleOrVec::Vec(items)) => items
                    .first()
                    .with_context(|| format!("array field `{name}` has empty items"))?,
                None => bail!("array field `{name}` must define items"),
            };
            let Schema::Object(item) = item else {
                bail!("items of `{name}` must be a schema object");
            };
            if !is_object_schema(item) {
                bail!("items of `{name}` must describe objects");
            }
            let mut entry = EntrySchema::new(parse_fields(item)?)
                .with_min_entries(array.min_items.unwrap_or(0) as usize);
            if let Some(key) = extension_string(item, "x-entry-key") {
                entry = entry.with_key(key);
            }
            if let Some(sequence) = extension_string(item, "x-entry-sequence") {
                entry = entry.with_sequence(sequence);
            }
            Ok(FieldKind::Entries(Box::new(entry)))
        }
        Some(other) => bail!("field `{name}` has unsupported type {other:?}"),
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UniqueDecl {
    Field(String),
    Detailed {
        field: String,
        #[serde(default)]
        scope: Vec<String>,
        #[serde(default)]
        compare: Option<String>,
    },
}

fn unique_keys(schema: &SchemaObject) -> Result<Vec<UniqueKey>> {
    let Some(raw) = schema.extensions.get("x-unique") else {
        return Ok(Vec::new());
    };
    let decls: Vec<UniqueDecl> =
        serde_json::from_value(raw.clone()).context("x-unique must be a list of keys")?;
    decls
        .into_iter()
        .map(|decl| match decl {
            UniqueDecl::Field(field) => Ok(UniqueKey::new(field)),
            UniqueDecl::Detailed {
                field,
                scope,
                compare,
            } => {
                let compare = match compare.as_deref() {
                    None | Some("ignore-case") => KeyCompare::IgnoreCase,
                    Some("numeric") => KeyCompare::Numeric,
                    Some("exact") => KeyCompare::Exact,
                    Some(other) => bail!("unknown key comparison `{other}` for `{field}`"),
                };
                let mut key = UniqueKey::new(field).compared(compare);
                for scope_field in scope {
                    key = key.scoped_by(scope_field);
                }
                Ok(key)
            }
        })
        .collect()
}

fn is_object_schema(schema: &SchemaObject) -> bool {
    match instance_type(schema) {
        Some(InstanceType::Object) => true,
        None => schema.object.is_some(),
        _ => false,
    }
}

fn instance_type(schema: &SchemaObject) -> Option<InstanceType> {
    schema.instance_type.as_ref().and_then(|kind| match kind {
        SingleOrVec::Single(single) => Some(**single),
        SingleOrVec::Vec(items) => items
            .iter()
            .cloned()
            .find(|item| *item != InstanceType::Null),
    })
}

fn extension_string(schema: &SchemaObject, key: &str) -> Option<String> {
    schema
        .extensions
        .get(key)
        .and_then(|value| value.as_str().map(str::to_string))
}

fn extension_strings(schema: &SchemaObject, key: &str) -> Option<Vec<String>> {
    match schema.extensions.get(key)? {
        Value::String(single) => Some(vec![single.clone()]),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    }
}

fn extension_bool(schema: &SchemaObject, key: &str) -> bool {
    schema
        .extensions
        .get(key)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn slugify(title: &str) -> String {
    title
        .split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
