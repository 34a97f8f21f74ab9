use crate::domain::Record;

/// Remembers the values a form was last populated with so unsaved changes
/// can be detected before navigating away.
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    baseline: Record,
}

impl DirtyTracker {
    pub fn new(baseline: Record) -> Self {
        Self { baseline }
    }

    /// Called on load, successful save and clear.
    pub fn reset(&mut self, baseline: &Record) {
        self.baseline = baseline.clone();
    }

    pub fn is_dirty(&self, current: &Record) -> bool {
        !self.changed_fields(current).is_empty()
    }

    pub fn changed_fields<'a>(&'a self, current: &'a Record) -> Vec<&'a str> {
        let mut changed: Vec<&str> = current
            .iter()
            .filter(|(name, value)| self.baseline.get(name.as_str()) != Some(*value))
            .map(|(name, _)| name.as_str())
            .collect();
        changed.extend(
            self.baseline
                .keys()
                .filter(|name| !current.contains_key(name.as_str()))
                .map(String::as_str),
        );
        changed
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(code: &str) -> Record {
        let mut record = Record::new();
        record.insert("code".into(), json!(code));
        record.insert("name".into(), json!("Main"));
        record
    }

    #[test]
    fn detects_changed_and_removed_fields() {
        let tracker = DirtyTracker::new(record("A1"));
        assert!(!tracker.is_dirty(&record("A1")));

        let edited = record("A2");
        assert_eq!(tracker.changed_fields(&edited), vec!["code"]);

        let mut shrunk = record("A1");
        shrunk.shift_remove("name");
        assert_eq!(tracker.changed_fields(&shrunk), vec!["name"]);
    }

    #[test]
    fn reverting_an_edit_clears_dirty() {
        let mut tracker = DirtyTracker::default();
        tracker.reset(&record("A1"));
        let mut current = record("A9");
        assert!(tracker.is_dirty(&current));
        current.insert("code".into(), json!("A1"));
        assert!(!tracker.is_dirty(&current));
    }
}
