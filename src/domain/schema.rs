use std::{fmt, sync::Arc};

use regex::Regex;
use serde_json::Value;

use super::record::Record;

/// Everything the engine needs to know about one editor screen.
#[derive(Debug, Clone)]
pub struct ScreenSchema {
    pub id: String,
    pub title: String,
    pub fields: Vec<FieldSchema>,
    pub unique_keys: Vec<UniqueKey>,
    pub sort: Option<SortKey>,
    /// JSON Schema the screen was parsed from, used for structural checks.
    pub document: Option<Value>,
}

impl ScreenSchema {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            fields: Vec::new(),
            unique_keys: Vec::new(),
            sort: None,
            document: None,
        }
    }

    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Registers a uniqueness constraint and marks its field as a key field.
    pub fn with_unique(mut self, key: UniqueKey) -> Self {
        if let Some(field) = self.fields.iter_mut().find(|field| field.name == key.field) {
            field.key = true;
        }
        self.unique_keys.push(key);
        self
    }

    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_document(mut self, document: Value) -> Self {
        self.document = Some(document);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn key_fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter().filter(|field| field.key)
    }

    pub fn provenance_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|field| field.provenance)
            .map(|field| field.name.as_str())
    }

    /// Label for a field name, falling back to the raw name.
    pub fn title_of(&self, name: &str) -> String {
        self.field(name)
            .map(|field| field.title.clone())
            .unwrap_or_else(|| name.to_string())
    }

    /// The empty form for Add: every field at its default.
    pub fn blank_record(&self) -> Record {
        self.fields
            .iter()
            .map(|field| (field.name.clone(), field.default_value()))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub enum FieldKind {
    Text,
    Integer,
    Number,
    Boolean,
    /// ISO `YYYY-MM-DD` text.
    Date,
    /// Ordered list of sub-records, e.g. the taxes included in a tax structure.
    Entries(Box<EntrySchema>),
}

impl FieldKind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldKind::Integer | FieldKind::Number)
    }
}

#[derive(Debug, Clone)]
pub struct EntrySchema {
    pub fields: Vec<FieldSchema>,
    /// Sub-field that must not repeat between entries.
    pub key_field: Option<String>,
    /// Numeric sub-field that must not repeat between entries.
    pub sequence_field: Option<String>,
    pub min_entries: usize,
}

impl EntrySchema {
    pub fn new(fields: Vec<FieldSchema>) -> Self {
        Self {
            fields,
            key_field: None,
            sequence_field: None,
            min_entries: 0,
        }
    }

    pub fn with_key(mut self, field: impl Into<String>) -> Self {
        self.key_field = Some(field.into());
        self
    }

    pub fn with_sequence(mut self, field: impl Into<String>) -> Self {
        self.sequence_field = Some(field.into());
        self
    }

    pub fn with_min_entries(mut self, min: usize) -> Self {
        self.min_entries = min;
        self
    }

    pub fn title_of(&self, name: &str) -> String {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.title.clone())
            .unwrap_or_else(|| name.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct FieldSchema {
    pub name: String,
    pub title: String,
    pub description: Option<String>,
    pub kind: FieldKind,
    pub default: Option<Value>,
    pub rules: Vec<FieldRule>,
    /// Part of a unique key: writable only while creating a record.
    pub key: bool,
    /// Never edited by the form and carried over when a record is replaced.
    pub provenance: bool,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        Self {
            title: prettify_label(&name),
            name,
            description: None,
            kind,
            default: None,
            rules: Vec::new(),
            key: false,
            provenance: false,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Date)
    }

    pub fn entries(name: impl Into<String>, entry: EntrySchema) -> Self {
        Self::new(name, FieldKind::Entries(Box::new(entry)))
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn rule(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn required(self) -> Self {
        self.rule(FieldRule::Required)
    }

    pub fn max_length(self, max: usize) -> Self {
        self.rule(FieldRule::MaxLength(max))
    }

    pub fn min_length(self, min: usize) -> Self {
        self.rule(FieldRule::MinLength(min))
    }

    pub fn pattern(self, pattern: Pattern) -> Self {
        self.rule(FieldRule::Pattern(pattern))
    }

    pub fn range(self, min: f64, max: f64) -> Self {
        self.rule(FieldRule::Range {
            min: Some(min),
            max: Some(max),
        })
    }

    pub fn before(self, other: impl Into<String>) -> Self {
        self.rule(FieldRule::Before(other.into()))
    }

    pub fn not_past_on_add(self) -> Self {
        self.rule(FieldRule::NotPastOnAdd)
    }

    pub fn key(mut self) -> Self {
        self.key = true;
        self
    }

    pub fn provenance(mut self) -> Self {
        self.provenance = true;
        self
    }

    pub fn is_required(&self) -> bool {
        self.rules
            .iter()
            .any(|rule| matches!(rule, FieldRule::Required))
    }

    pub fn default_value(&self) -> Value {
        if let Some(value) = &self.default {
            return value.clone();
        }
        match &self.kind {
            FieldKind::Boolean => Value::Bool(false),
            FieldKind::Entries(_) => Value::Array(Vec::new()),
            FieldKind::Integer | FieldKind::Number => Value::Null,
            FieldKind::Text | FieldKind::Date => Value::String(String::new()),
        }
    }

    pub fn display_label(&self) -> String {
        if self.title.eq_ignore_ascii_case(&self.name) {
            self.title.clone()
        } else {
            format!("{} ({})", self.title, self.name)
        }
    }
}

#[derive(Debug, Clone)]
pub enum FieldRule {
    Required,
    MinLength(usize),
    MaxLength(usize),
    Pattern(Pattern),
    Range { min: Option<f64>, max: Option<f64> },
    /// Date must be strictly earlier than the named field.
    Before(String),
    /// Date may not lie before today while adding a record.
    NotPastOnAdd,
}

#[derive(Debug, Clone)]
pub struct Pattern {
    pub regex: Regex,
    pub message: String,
}

impl Pattern {
    /// `message` may contain `{field}`, replaced by the field title.
    pub fn new(source: &str, message: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(source)?,
            message: message.into(),
        })
    }

    pub fn alphabetic() -> Result<Self, regex::Error> {
        Self::new(r"^[A-Za-z ]+$", "{field} may contain letters and spaces only")
    }

    pub fn alphanumeric() -> Result<Self, regex::Error> {
        Self::new(r"^[A-Za-z0-9]+$", "{field} may contain letters and digits only")
    }

    pub fn numeric() -> Result<Self, regex::Error> {
        Self::new(r"^[0-9]+$", "{field} may contain digits only")
    }

    pub fn digits(min: usize, max: usize) -> Result<Self, regex::Error> {
        let message = if min == max {
            format!("{{field}} must be exactly {min} digits")
        } else {
            format!("{{field}} must be {min} to {max} digits")
        };
        Self::new(&format!(r"^[0-9]{{{min},{max}}}$"), message)
    }

    pub fn email() -> Result<Self, regex::Error> {
        Self::new(
            r"^[^\s@]+@[^\s@]+\.[^\s@]+$",
            "{field} must be a valid email address",
        )
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    pub fn message_for(&self, title: &str) -> String {
        self.message.replace("{field}", title)
    }
}

/// How two key values are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyCompare {
    #[default]
    IgnoreCase,
    Numeric,
    Exact,
}

pub type KeyMatcher = Arc<dyn Fn(&Record, &Record) -> bool + Send + Sync>;

/// A field whose value must not repeat across the collection, optionally
/// only within records that share the `scope` fields.
#[derive(Clone)]
pub struct UniqueKey {
    pub field: String,
    pub scope: Vec<String>,
    pub compare: KeyCompare,
    matcher: Option<KeyMatcher>,
}

impl UniqueKey {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            scope: Vec::new(),
            compare: KeyCompare::IgnoreCase,
            matcher: None,
        }
    }

    pub fn numeric(field: impl Into<String>) -> Self {
        Self::new(field).compared(KeyCompare::Numeric)
    }

    pub fn compared(mut self, compare: KeyCompare) -> Self {
        self.compare = compare;
        self
    }

    pub fn scoped_by(mut self, field: impl Into<String>) -> Self {
        self.scope.push(field.into());
        self
    }

    /// Replaces the field comparison with a screen-specific predicate.
    pub fn with_matcher(
        mut self,
        matcher: impl Fn(&Record, &Record) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.matcher = Some(Arc::new(matcher));
        self
    }

    pub fn matcher(&self) -> Option<&KeyMatcher> {
        self.matcher.as_ref()
    }
}

impl fmt::Debug for UniqueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniqueKey")
            .field("field", &self.field)
            .field("scope", &self.scope)
            .field("compare", &self.compare)
            .field("custom_matcher", &self.matcher.is_some())
            .finish()
    }
}

/// Fields the collection is ordered by after every mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub fields: Vec<String>,
}

impl SortKey {
    pub fn by<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

pub fn prettify_label(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let mut result = String::with_capacity(raw.len());
    let mut capitalize = true;
    for ch in raw.chars() {
        if ch == '_' || ch == '-' {
            result.push(' ');
            capitalize = true;
            continue;
        }

        if capitalize {
            result.push(ch.to_ascii_uppercase());
            capitalize = false;
        } else {
            result.push(ch);
        }
    }

    result.trim().to_string()
}
