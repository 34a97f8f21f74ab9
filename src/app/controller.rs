use std::{sync::Arc, time::Instant};

use anyhow::Result;
use chrono::{Local, SecondsFormat};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    domain::{Action, Record, RecordId, ScreenSchema, StoreOp, field_text, is_blank},
    error::EngineError,
    form::{DirtyTracker, FieldErrors, FormCommand, FormState, apply_command, is_field_read_only},
    store::{DuplicateChecker, RecordStore},
    validate::{FieldValidator, ValidationContext},
};

use super::{
    modal::{SelectionModal, SelectionRequest, SelectionResult},
    options::EngineOptions,
    remote::{RemoteStore, indicates_conflict},
    status::StatusLine,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Blank Add form.
    Ready,
    /// The record at this index is bound to the form.
    Loaded(usize),
    /// The user backed out of the picker or the delete confirmation.
    Cancelled,
    /// The collection is empty; the user was told so.
    NothingToSelect,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved { action: Action, id: RecordId },
    Invalid(FieldErrors),
}

enum Pending {
    Append(Record),
    Replace(RecordId, Record),
    Remove(RecordId),
}

enum Prepared {
    Ready(Pending),
    Invalid(FieldErrors),
}

/// Drives one editor screen: the current action, the record bound to the
/// form, and the calls into validation and the record store.
pub struct RecordController {
    schema: Arc<ScreenSchema>,
    validator: FieldValidator,
    store: RecordStore,
    form: FormState,
    dirty: DirtyTracker,
    action: Action,
    selection: Option<RecordId>,
    preselected: Option<RecordId>,
    status: StatusLine,
    options: EngineOptions,
}

impl RecordController {
    pub fn new(schema: ScreenSchema, options: EngineOptions) -> Result<Self> {
        let schema = Arc::new(schema);
        let validator = FieldValidator::new(Arc::clone(&schema))?;
        let store = RecordStore::for_screen(&schema);
        let form = FormState::new(Arc::clone(&schema));
        let dirty = DirtyTracker::new(form.values().clone());
        Ok(Self {
            schema,
            validator,
            store,
            form,
            dirty,
            action: Action::Add,
            selection: None,
            preselected: None,
            status: StatusLine::new(),
            options,
        })
    }

    pub fn with_records(mut self, records: impl IntoIterator<Item = Record>) -> Self {
        self.store = std::mem::take(&mut self.store).seeded(records);
        self
    }

    pub fn schema(&self) -> &ScreenSchema {
        &self.schema
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn selection(&self) -> Option<RecordId> {
        self.selection
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selection.and_then(|id| self.store.position(id))
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn values(&self) -> &Record {
        self.form.values()
    }

    pub fn errors(&self) -> &FieldErrors {
        self.form.errors()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.is_dirty(self.form.values())
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn records(&self) -> Vec<Record> {
        self.store.records()
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Bind a grid row so the next non-Add action uses it without a picker.
    pub fn preselect(&mut self, index: usize) -> Result<(), EngineError> {
        let id = self.store.id_at(index).ok_or(EngineError::IndexOutOfRange {
            index,
            len: self.store.len(),
        })?;
        self.preselected = Some(id);
        Ok(())
    }

    pub fn select_action(
        &mut self,
        action: Action,
        modal: &mut dyn SelectionModal,
    ) -> Result<ActionOutcome, EngineError> {
        debug!(screen = %self.schema.id, %action, "action selected");
        if !action.needs_selection() {
            self.clear();
            return Ok(ActionOutcome::Ready);
        }
        if self.store.is_empty() {
            let message = format!(
                "There are no {} records to {}.",
                self.schema.title,
                action.verb()
            );
            modal.inform(&message);
            self.clear();
            self.status.set_raw(message);
            return Ok(ActionOutcome::NothingToSelect);
        }

        self.action = action;
        self.selection = None;
        self.form.reset();
        self.dirty.reset(self.form.values());

        let preselected = self
            .preselected
            .take()
            .and_then(|id| self.store.position(id));
        let index = match preselected {
            Some(index) => index,
            None => match modal.choose(&self.selection_request(action)) {
                SelectionResult::Selected(index) => index,
                SelectionResult::Cancelled => {
                    self.status
                        .set_raw(format!("No record selected to {}", action.verb()));
                    return Ok(ActionOutcome::Cancelled);
                }
            },
        };
        let Some(record) = self.store.get(index) else {
            return Err(EngineError::IndexOutOfRange {
                index,
                len: self.store.len(),
            });
        };

        if action == Action::Delete && self.options.confirm_delete {
            let label = self.record_label(record);
            if !modal.confirm(&format!("Delete {label}? This cannot be undone.")) {
                self.status.set_raw("Delete cancelled");
                return Ok(ActionOutcome::Cancelled);
            }
        }

        self.load_record(index)?;
        Ok(ActionOutcome::Loaded(index))
    }

    /// Copy the record at `index` into the form. Copy blanks the key and
    /// provenance fields and leaves nothing selected so the save appends.
    pub fn load_record(&mut self, index: usize) -> Result<(), EngineError> {
        let (id, record) = match (self.store.id_at(index), self.store.get(index)) {
            (Some(id), Some(record)) => (id, record.clone()),
            _ => {
                return Err(EngineError::IndexOutOfRange {
                    index,
                    len: self.store.len(),
                });
            }
        };
        if self.action == Action::Add {
            self.action = Action::Edit;
        }
        self.form.seed_from_record(&record);
        let label = self.record_label(&record);

        if self.action == Action::Copy {
            let blanked: Vec<String> = self
                .schema
                .fields
                .iter()
                .filter(|field| field.key || field.provenance)
                .map(|field| field.name.clone())
                .collect();
            self.form.blank_fields(blanked.iter().map(String::as_str));
            self.selection = None;
        } else {
            self.selection = Some(id);
        }
        self.dirty.reset(self.form.values());

        match self.action {
            Action::Edit => self.status.editing(&label),
            Action::Search => self.status.set_raw(format!("Viewing {label}")),
            Action::Delete => self.status.set_raw(format!("Save to delete {label}")),
            Action::Copy => self
                .status
                .set_raw(format!("Copied {label}; enter a new key")),
            Action::Add => self.status.ready(),
        }
        debug!(screen = %self.schema.id, action = %self.action, record = %id, "record loaded");
        Ok(())
    }

    /// Back to a blank Add form. The collection is left alone.
    pub fn clear(&mut self) {
        self.action = Action::Add;
        self.selection = None;
        self.preselected = None;
        self.form.reset();
        self.dirty.reset(self.form.values());
        self.status.ready();
    }

    pub fn is_read_only(&self, field: &str) -> bool {
        is_field_read_only(
            &self.schema,
            field,
            self.action,
            self.selection.is_some(),
        )
    }

    /// Apply an input event unless its field is locked. Returns whether the
    /// form changed.
    pub fn apply(&mut self, command: FormCommand) -> bool {
        let field = command.field().to_string();
        if self.is_read_only(&field) {
            return false;
        }
        let changed = apply_command(&mut self.form, command);
        if changed && self.options.auto_validate && !self.form.errors().is_empty() {
            let context = self.validation_context();
            let scoped = self
                .validator
                .validate_field(self.form.values(), &field, &context);
            self.form.clear_error(&field);
            for (name, message) in scoped.iter() {
                self.form.set_error(name, message);
            }
        }
        changed
    }

    pub fn set_field(&mut self, field: &str, value: impl Into<Value>) -> bool {
        self.apply(FormCommand::set(field, value))
    }

    pub fn validation_context(&self) -> ValidationContext {
        ValidationContext::new(self.action, self.options.today())
    }

    /// Validate, check duplicates, then mutate the collection according to
    /// the current action. Nothing is mutated when any check fails.
    pub fn save(&mut self) -> Result<SaveOutcome, EngineError> {
        let pending = match self.prepare_save()? {
            Prepared::Ready(pending) => pending,
            Prepared::Invalid(errors) => return Ok(SaveOutcome::Invalid(errors)),
        };
        let id = match pending {
            Pending::Append(record) => self.store.append(record),
            Pending::Replace(id, record) => {
                self.store
                    .replace(id, record)
                    .map_err(|err| self.report(err))?;
                id
            }
            Pending::Remove(id) => {
                self.store.remove(id).map_err(|err| self.report(err))?;
                id
            }
        };
        Ok(self.finish_save(id))
    }

    /// Like [`save`](Self::save), but persists through `remote` first and
    /// only touches the local collection once the server accepted it.
    pub async fn save_remote(
        &mut self,
        remote: &dyn RemoteStore,
    ) -> Result<SaveOutcome, EngineError> {
        let pending = match self.prepare_save()? {
            Prepared::Ready(pending) => pending,
            Prepared::Invalid(errors) => return Ok(SaveOutcome::Invalid(errors)),
        };

        let response = match &pending {
            Pending::Append(record) => remote
                .create(record)
                .await
                .map(|r| (r.success, r.message, r.data)),
            Pending::Replace(id, record) => {
                let (remote_id, id_value) = self.remote_id(*id).map_err(|err| self.report(err))?;
                let mut record = record.clone();
                record
                    .entry(self.options.remote_id_field.clone())
                    .or_insert(id_value);
                remote
                    .update(&remote_id, &record)
                    .await
                    .map(|r| (r.success, r.message, r.data))
            }
            Pending::Remove(id) => {
                let (remote_id, _) = self.remote_id(*id).map_err(|err| self.report(err))?;
                remote
                    .delete(&remote_id)
                    .await
                    .map(|r| (r.success, r.message, None))
            }
        };
        let (success, message, data) =
            response.map_err(|err| self.report(EngineError::Transport(err)))?;

        if !success {
            let message = message.unwrap_or_else(|| "The server rejected the change".to_string());
            if indicates_conflict(&message)
                && let Some(key) = self.schema.unique_keys.first()
            {
                let mut errors = FieldErrors::new();
                errors.set(key.field.clone(), message);
                self.form.set_errors(errors.clone());
                self.status.issues_remaining(errors.len());
                warn!(screen = %self.schema.id, field = %key.field, "remote uniqueness conflict");
                return Ok(SaveOutcome::Invalid(errors));
            }
            return Err(self.report(EngineError::Remote(message)));
        }

        let id = match pending {
            Pending::Append(record) => self.store.append(data.unwrap_or(record)),
            Pending::Replace(id, record) => {
                let mut stored = data.unwrap_or(record);
                if let Some(previous) = self.store.get_by_id(id)
                    && let Some(value) = previous.get(&self.options.remote_id_field)
                {
                    stored
                        .entry(self.options.remote_id_field.clone())
                        .or_insert_with(|| value.clone());
                }
                self.store
                    .replace(id, stored)
                    .map_err(|err| self.report(err))?;
                id
            }
            Pending::Remove(id) => {
                self.store.remove(id).map_err(|err| self.report(err))?;
                id
            }
        };
        Ok(self.finish_save(id))
    }

    /// Replace the local collection with the server's. Returns its size.
    pub async fn refresh_remote(&mut self, remote: &dyn RemoteStore) -> Result<usize, EngineError> {
        let response = remote
            .list()
            .await
            .map_err(|err| self.report(EngineError::Transport(err)))?;
        if !response.success {
            let message = response
                .message
                .unwrap_or_else(|| "Failed to load records".to_string());
            return Err(self.report(EngineError::Remote(message)));
        }
        self.store.reset(response.data.unwrap_or_default());
        self.clear();
        Ok(self.store.len())
    }

    /// Dismisses an expired success notice.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.status.tick(now)
    }

    /// Whether the user may navigate away. Asks first when there are
    /// unsaved changes.
    pub fn request_leave(&mut self, modal: &mut dyn SelectionModal) -> bool {
        if !self.options.warn_on_unsaved || !self.is_dirty() {
            return true;
        }
        let leave = modal.confirm("You have unsaved changes. Discard them and leave?");
        if !leave {
            self.status.pending_exit();
        }
        leave
    }

    fn prepare_save(&mut self) -> Result<Prepared, EngineError> {
        let action = self.action;
        let Some(op) = action.store_op() else {
            return Err(self.report(EngineError::ReadOnly(action)));
        };
        let target = match (op, self.selection) {
            (StoreOp::Append, _) => None,
            (_, Some(id)) => Some(id),
            (_, None) => return Err(self.report(EngineError::NoSelection(action))),
        };
        if let (StoreOp::Remove, Some(id)) = (op, target) {
            return Ok(Prepared::Ready(Pending::Remove(id)));
        }

        let context = self.validation_context();
        let mut errors = self.validator.validate(self.form.values(), &context);
        if errors.is_empty() {
            match self.form.try_build_record() {
                Ok(record) => {
                    let exclude = target.and_then(|id| self.store.position(id));
                    errors =
                        DuplicateChecker::new(&self.schema).check(&record, self.store.iter(), exclude);
                    if errors.is_empty() {
                        let pending = match target {
                            Some(id) => Pending::Replace(id, self.carry_unlisted_fields(id, record)),
                            None => Pending::Append(self.stamp_provenance(record)),
                        };
                        return Ok(Prepared::Ready(pending));
                    }
                }
                Err(conversion) => errors = conversion,
            }
        }

        self.form.set_errors(errors.clone());
        self.status.issues_remaining(errors.len());
        warn!(
            screen = %self.schema.id,
            %action,
            issues = errors.len(),
            "save rejected"
        );
        Ok(Prepared::Invalid(errors))
    }

    fn finish_save(&mut self, id: RecordId) -> SaveOutcome {
        let action = self.action;
        let message = format!("{} record {} successfully", self.schema.title, action.past_tense());
        self.action = Action::Add;
        self.selection = None;
        self.form.reset();
        self.dirty.reset(self.form.values());
        self.status
            .success(message, Instant::now(), self.options.notice_duration);
        info!(screen = %self.schema.id, %action, record = %id, "record saved");
        SaveOutcome::Saved { action, id }
    }

    /// Fields the screen does not show (a remote id, say) survive an edit.
    fn carry_unlisted_fields(&self, id: RecordId, mut record: Record) -> Record {
        if let Some(previous) = self.store.get_by_id(id) {
            for (name, value) in previous {
                if self.schema.field(name).is_none() && !record.contains_key(name) {
                    record.insert(name.clone(), value.clone());
                }
            }
        }
        record
    }

    /// New records get the creation time in any blank provenance field.
    fn stamp_provenance(&self, mut record: Record) -> Record {
        let now = Local::now().to_rfc3339_opts(SecondsFormat::Secs, false);
        for field in self.schema.provenance_fields() {
            if is_blank(record.get(field)) {
                record.insert(field.to_string(), Value::String(now.clone()));
            }
        }
        record
    }

    fn report(&mut self, err: EngineError) -> EngineError {
        warn!(screen = %self.schema.id, action = %self.action, error = %err, "save failed");
        self.status.alert(err.to_string());
        err
    }

    fn remote_id(&self, id: RecordId) -> Result<(String, Value), EngineError> {
        let record = self
            .store
            .get_by_id(id)
            .ok_or(EngineError::StaleRecord(id))?;
        let field = &self.options.remote_id_field;
        match record.get(field) {
            Some(value) if !field_text(record, field).trim().is_empty() => {
                Ok((field_text(record, field), value.clone()))
            }
            _ => Err(EngineError::Remote(format!(
                "record {id} has no `{field}` to address it by"
            ))),
        }
    }

    fn selection_request(&self, action: Action) -> SelectionRequest<'_> {
        SelectionRequest {
            action,
            message: format!("Select a {} record to {}", self.schema.title, action.verb()),
            records: self.store.iter().collect(),
            labels: self.store.iter().map(|record| self.record_label(record)).collect(),
        }
    }

    /// Short description of a record built from its key fields.
    pub fn record_label(&self, record: &Record) -> String {
        let parts: Vec<String> = self
            .schema
            .key_fields()
            .map(|field| field_text(record, &field.name))
            .filter(|text| !text.trim().is_empty())
            .collect();
        if !parts.is_empty() {
            return parts.join(" / ");
        }
        self.schema
            .fields
            .first()
            .map(|field| field_text(record, &field.name))
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| "record".to_string())
    }
}
