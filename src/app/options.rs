use std::time::Duration;

use chrono::{Local, NaiveDate};

#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// How long a success notice stays before it is dismissed.
    pub notice_duration: Duration,
    /// Re-check an edited field right away once a save has failed.
    pub auto_validate: bool,
    /// Ask before leaving a form with unsaved changes.
    pub warn_on_unsaved: bool,
    /// Delete needs an explicit confirmation after the record is picked.
    pub confirm_delete: bool,
    /// Calendar date used by date rules; `None` means the local date.
    pub today: Option<NaiveDate>,
    /// Record field holding the id of a remotely persisted record.
    pub remote_id_field: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            notice_duration: Duration::from_secs(2),
            auto_validate: true,
            warn_on_unsaved: true,
            confirm_delete: true,
            today: None,
            remote_id_field: "id".to_string(),
        }
    }
}

impl EngineOptions {
    pub fn with_notice_duration(mut self, duration: Duration) -> Self {
        self.notice_duration = duration;
        self
    }

    pub fn with_auto_validate(mut self, enabled: bool) -> Self {
        self.auto_validate = enabled;
        self
    }

    pub fn with_warn_on_unsaved(mut self, warn: bool) -> Self {
        self.warn_on_unsaved = warn;
        self
    }

    pub fn with_confirm_delete(mut self, confirm: bool) -> Self {
        self.confirm_delete = confirm;
        self
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn with_remote_id_field(mut self, field: impl Into<String>) -> Self {
        self.remote_id_field = field.into();
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }
}
