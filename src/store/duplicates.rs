use crate::{
    domain::{KeyCompare, Record, ScreenSchema, UniqueKey, field_text, value_as_f64},
    form::FieldErrors,
};

/// A unique key the candidate collides on, and where.
#[derive(Debug, Clone, Copy)]
pub struct Conflict<'k> {
    pub key: &'k UniqueKey,
    pub index: usize,
}

/// First key of `keys` that `candidate` repeats, skipping the record at
/// `exclude` (the one being edited).
pub fn find_conflict<'k, 'r>(
    candidate: &Record,
    records: impl IntoIterator<Item = &'r Record>,
    exclude: Option<usize>,
    keys: &'k [UniqueKey],
) -> Option<Conflict<'k>> {
    let records: Vec<&Record> = records.into_iter().collect();
    keys.iter().find_map(|key| {
        records
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != exclude)
            .find(|(_, existing)| keys_collide(key, candidate, existing))
            .map(|(index, _)| Conflict { key, index })
    })
}

pub fn is_duplicate<'r>(
    candidate: &Record,
    records: impl IntoIterator<Item = &'r Record>,
    exclude: Option<usize>,
    keys: &[UniqueKey],
) -> bool {
    find_conflict(candidate, records, exclude, keys).is_some()
}

/// Runs a screen's unique keys against its collection and reports each
/// collision on the key field.
pub struct DuplicateChecker<'s> {
    schema: &'s ScreenSchema,
}

impl<'s> DuplicateChecker<'s> {
    pub fn new(schema: &'s ScreenSchema) -> Self {
        Self { schema }
    }

    pub fn check<'r>(
        &self,
        candidate: &Record,
        records: impl IntoIterator<Item = &'r Record>,
        exclude: Option<usize>,
    ) -> FieldErrors {
        let records: Vec<&Record> = records.into_iter().collect();
        let mut errors = FieldErrors::new();
        for key in &self.schema.unique_keys {
            let single = std::slice::from_ref(key);
            if find_conflict(candidate, records.iter().copied(), exclude, single).is_some() {
                errors.insert(&key.field, self.message(key, candidate));
            }
        }
        errors
    }

    fn message(&self, key: &UniqueKey, candidate: &Record) -> String {
        let mut message = format!(
            "{} '{}' already exists",
            self.schema.title_of(&key.field),
            field_text(candidate, &key.field).trim()
        );
        let scope: Vec<String> = key
            .scope
            .iter()
            .map(|field| {
                format!(
                    "{} '{}'",
                    self.schema.title_of(field),
                    field_text(candidate, field).trim()
                )
            })
            .collect();
        if !scope.is_empty() {
            message.push_str(" for ");
            message.push_str(&scope.join(", "));
        }
        message
    }
}

fn keys_collide(key: &UniqueKey, candidate: &Record, existing: &Record) -> bool {
    if let Some(matcher) = key.matcher() {
        return matcher(candidate, existing);
    }
    let wanted = field_text(candidate, &key.field);
    if wanted.trim().is_empty() {
        return false;
    }
    let in_scope = key.scope.iter().all(|field| {
        normalize(&field_text(candidate, field)) == normalize(&field_text(existing, field))
    });
    in_scope && values_equal(key.compare, candidate, existing, &key.field)
}

fn values_equal(compare: KeyCompare, candidate: &Record, existing: &Record, field: &str) -> bool {
    match compare {
        KeyCompare::IgnoreCase => {
            normalize(&field_text(candidate, field)) == normalize(&field_text(existing, field))
        }
        KeyCompare::Exact => field_text(candidate, field).trim() == field_text(existing, field).trim(),
        KeyCompare::Numeric => {
            let left = candidate.get(field).and_then(value_as_f64);
            let right = existing.get(field).and_then(value_as_f64);
            match (left, right) {
                (Some(left), Some(right)) => left == right,
                _ => values_equal(KeyCompare::IgnoreCase, candidate, existing, field),
            }
        }
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
