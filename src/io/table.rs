use serde::Serialize;

use crate::domain::{FieldKind, Record, ScreenSchema, value_to_text};

/// One exported column: the record field it reads and its header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub field: String,
    pub header: String,
}

/// Record field to column mapping for spreadsheet-style exports. Columns
/// follow the screen's field order so repeated exports line up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnMap {
    columns: Vec<Column>,
}

impl ColumnMap {
    pub fn for_screen(schema: &ScreenSchema) -> Self {
        let columns = schema
            .fields
            .iter()
            .map(|field| Column {
                field: field.name.clone(),
                header: field.title.clone(),
            })
            .collect();
        Self { columns }
    }

    /// Drop the named fields (e.g. secrets) from the export.
    pub fn without(mut self, fields: &[&str]) -> Self {
        self.columns
            .retain(|column| !fields.contains(&column.field.as_str()));
        self
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.header.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Flatten records into text rows. Composite entry fields export their
/// entry count.
pub fn export_table<'r>(
    schema: &ScreenSchema,
    columns: &ColumnMap,
    records: impl IntoIterator<Item = &'r Record>,
) -> Table {
    let rows = records
        .into_iter()
        .map(|record| {
            columns
                .columns()
                .iter()
                .map(|column| cell_text(schema, record, &column.field))
                .collect()
        })
        .collect();
    Table {
        headers: columns.headers(),
        rows,
    }
}

fn cell_text(schema: &ScreenSchema, record: &Record, field: &str) -> String {
    let Some(value) = record.get(field) else {
        return String::new();
    };
    match schema.field(field).map(|field| &field.kind) {
        Some(FieldKind::Entries(_)) => value
            .as_array()
            .map(|entries| entries.len().to_string())
            .unwrap_or_default(),
        Some(FieldKind::Boolean) => match value.as_bool() {
            Some(true) => "Yes".to_string(),
            Some(false) => "No".to_string(),
            None => value_to_text(value),
        },
        _ => value_to_text(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldSchema;
    use serde_json::json;

    #[test]
    fn columns_follow_field_order_and_render_cells() {
        let schema = ScreenSchema::new("items", "Items")
            .with_field(FieldSchema::text("code").titled("Code"))
            .with_field(FieldSchema::boolean("active").titled("Active"))
            .with_field(FieldSchema::text("secret"));
        let columns = ColumnMap::for_screen(&schema).without(&["secret"]);
        let record: Record = [
            ("active".to_string(), json!(true)),
            ("code".to_string(), json!("X1")),
        ]
        .into_iter()
        .collect();

        let table = export_table(&schema, &columns, [&record]);
        assert_eq!(table.headers, vec!["Code", "Active"]);
        assert_eq!(table.rows, vec![vec!["X1".to_string(), "Yes".to_string()]]);
    }
}
