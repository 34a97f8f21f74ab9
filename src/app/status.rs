use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusLine {
    message: String,
    kind: NoticeKind,
    expires_at: Option<Instant>,
}

pub const READY_STATUS: &str = "Ready. Choose an action or fill in a new record.";

impl Default for StatusLine {
    fn default() -> Self {
        Self {
            message: READY_STATUS.to_string(),
            kind: NoticeKind::Info,
            expires_at: None,
        }
    }
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_raw(&mut self, msg: impl Into<String>) {
        self.message = msg.into();
        self.kind = NoticeKind::Info;
        self.expires_at = None;
    }

    pub fn ready(&mut self) {
        self.set_raw(READY_STATUS);
    }

    pub fn editing(&mut self, label: &str) {
        self.set_raw(format!("Editing {label}"));
    }

    pub fn issues_remaining(&mut self, count: usize) {
        self.alert(format!("{count} issue(s) remaining"));
    }

    pub fn pending_exit(&mut self) {
        self.set_raw("Unsaved changes. Leave again to discard them.");
    }

    /// A success notice that disappears once `ttl` has passed.
    pub fn success(&mut self, msg: impl Into<String>, now: Instant, ttl: Duration) {
        self.message = msg.into();
        self.kind = NoticeKind::Success;
        self.expires_at = Some(now + ttl);
    }

    /// An error that stays until something replaces it.
    pub fn alert(&mut self, msg: impl Into<String>) {
        self.message = msg.into();
        self.kind = NoticeKind::Error;
        self.expires_at = None;
    }

    /// Dismisses an expired notice. Returns whether it did.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.expires_at {
            Some(deadline) if now >= deadline => {
                self.ready();
                true
            }
            _ => false,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> NoticeKind {
        self.kind
    }

    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }
}
