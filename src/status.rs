//! Auto-expiring success / error text shown next to a control.
//!
//! [`StatusSlot`] holds at most one status together with its own deadline.
//! Every `set_*` replaces both, so the deadline of an older message can
//! never erase a newer one:
//!
//! ```
//! use std::time::{Duration, Instant};
//! use doc_chat::status::StatusSlot;
//!
//! let mut slot = StatusSlot::default();
//! let t0 = Instant::now();
//! slot.set_error_at("Failed to load chat history", Duration::from_secs(2), t0);
//! slot.set_success_at("Chat history cleared successfully", Duration::from_secs(3), t0 + Duration::from_secs(1));
//!
//! slot.tick(t0 + Duration::from_secs(2)); // the error's deadline, not the success's
//! assert_eq!(slot.success(), Some("Chat history cleared successfully"));
//! ```

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
    pub expires_at: Instant,
}

#[derive(Debug, Clone, Default)]
pub struct StatusSlot {
    current: Option<Status>,
}

impl StatusSlot {
    pub fn set_success(&mut self, text: impl Into<String>, ttl: Duration) {
        self.set_success_at(text, ttl, Instant::now())
    }

    pub fn set_error(&mut self, text: impl Into<String>, ttl: Duration) {
        self.set_error_at(text, ttl, Instant::now())
    }

    pub fn set_success_at(&mut self, text: impl Into<String>, ttl: Duration, now: Instant) {
        self.set_at(StatusKind::Success, text.into(), ttl, now)
    }

    pub fn set_error_at(&mut self, text: impl Into<String>, ttl: Duration, now: Instant) {
        self.set_at(StatusKind::Error, text.into(), ttl, now)
    }

    /// Replace whatever is shown, deadline included.
    pub fn set_at(&mut self, kind: StatusKind, text: String, ttl: Duration, now: Instant) {
        self.current = Some(Status {
            kind,
            text,
            expires_at: now + ttl,
        });
    }

    /// Clear immediately (e.g. when a form starts a new submission).
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Drop the status once its deadline has passed.  Returns `true` when
    /// something was cleared.
    pub fn tick(&mut self, now: Instant) -> bool {
        match &self.current {
            Some(status) if now >= status.expires_at => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    /// Time until the current status expires, for repaint scheduling.
    pub fn time_left(&self, now: Instant) -> Option<Duration> {
        self.current
            .as_ref()
            .map(|s| s.expires_at.saturating_duration_since(now))
    }

    pub fn current(&self) -> Option<&Status> {
        self.current.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.text_of(StatusKind::Error)
    }

    pub fn success(&self) -> Option<&str> {
        self.text_of(StatusKind::Success)
    }

    fn text_of(&self, kind: StatusKind) -> Option<&str> {
        self.current
            .as_ref()
            .filter(|s| s.kind == kind)
            .map(|s| s.text.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
