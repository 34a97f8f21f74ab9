use tracing::debug;

use crate::{
    domain::{Record, RecordId, ScreenSchema, SortKey},
    error::EngineError,
};

use super::order::compare_records;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: RecordId,
    pub record: Record,
}

/// The record collection of one screen.
///
/// Every mutation builds the next collection and swaps it in whole, then
/// re-sorts it when a sort key is configured. Ties keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    entries: Vec<StoredRecord>,
    next_id: u64,
    sort: Option<SortKey>,
    provenance: Vec<String>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store configured with the screen's sort key and provenance fields.
    pub fn for_screen(schema: &ScreenSchema) -> Self {
        let mut store = Self::new().with_provenance(schema.provenance_fields());
        store.sort = schema.sort.clone();
        store
    }

    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = Some(sort);
        let entries = std::mem::take(&mut self.entries);
        self.commit(entries);
        self
    }

    pub fn with_provenance<'a>(mut self, fields: impl IntoIterator<Item = &'a str>) -> Self {
        self.provenance = fields.into_iter().map(str::to_string).collect();
        self
    }

    pub fn seeded(mut self, records: impl IntoIterator<Item = Record>) -> Self {
        let mut entries = std::mem::take(&mut self.entries);
        for record in records {
            entries.push(self.allocate(record));
        }
        self.commit(entries);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[StoredRecord] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.entries.iter().map(|entry| &entry.record)
    }

    /// Owned copy of the current collection, in display order.
    pub fn records(&self) -> Vec<Record> {
        self.iter().cloned().collect()
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.entries.get(index).map(|entry| &entry.record)
    }

    pub fn get_by_id(&self, id: RecordId) -> Option<&Record> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| &entry.record)
    }

    pub fn id_at(&self, index: usize) -> Option<RecordId> {
        self.entries.get(index).map(|entry| entry.id)
    }

    pub fn position(&self, id: RecordId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    pub fn append(&mut self, record: Record) -> RecordId {
        let stored = self.allocate(record);
        let id = stored.id;
        let mut entries = self.entries.clone();
        entries.push(stored);
        self.commit(entries);
        debug!(record = %id, len = self.len(), "record appended");
        id
    }

    pub fn replace_at(&mut self, index: usize, record: Record) -> Result<RecordId, EngineError> {
        let id = self.checked_id(index)?;
        self.replace(id, record)?;
        Ok(id)
    }

    /// Replace a record, keeping its provenance fields from the old version.
    pub fn replace(&mut self, id: RecordId, mut record: Record) -> Result<(), EngineError> {
        let index = self.position(id).ok_or(EngineError::StaleRecord(id))?;
        let previous = &self.entries[index].record;
        for field in &self.provenance {
            if let Some(value) = previous.get(field) {
                record.insert(field.clone(), value.clone());
            }
        }
        let mut entries = self.entries.clone();
        entries[index] = StoredRecord { id, record };
        self.commit(entries);
        debug!(record = %id, "record replaced");
        Ok(())
    }

    pub fn remove_at(&mut self, index: usize) -> Result<Record, EngineError> {
        let id = self.checked_id(index)?;
        self.remove(id)
    }

    pub fn remove(&mut self, id: RecordId) -> Result<Record, EngineError> {
        let index = self.position(id).ok_or(EngineError::StaleRecord(id))?;
        let mut entries = self.entries.clone();
        let removed = entries.remove(index);
        self.commit(entries);
        debug!(record = %id, len = self.len(), "record removed");
        Ok(removed.record)
    }

    /// Drop the current collection and start over from `records`.
    pub fn reset(&mut self, records: impl IntoIterator<Item = Record>) {
        let entries: Vec<StoredRecord> = records
            .into_iter()
            .map(|record| self.allocate(record))
            .collect();
        self.commit(entries);
        debug!(len = self.len(), "collection reloaded");
    }

    fn checked_id(&self, index: usize) -> Result<RecordId, EngineError> {
        self.id_at(index).ok_or(EngineError::IndexOutOfRange {
            index,
            len: self.len(),
        })
    }

    fn allocate(&mut self, record: Record) -> StoredRecord {
        let id = RecordId(self.next_id);
        self.next_id += 1;
        StoredRecord { id, record }
    }

    fn commit(&mut self, mut entries: Vec<StoredRecord>) {
        if let Some(sort) = &self.sort {
            entries.sort_by(|left, right| {
                compare_records(sort, &left.record, &right.record).then(left.id.cmp(&right.id))
            });
        }
        self.entries = entries;
    }
}
