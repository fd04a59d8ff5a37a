//! A single-input submit-and-report form.
//!
//! [`IngestionForm`] owns its [`FormState`] behind an `Arc<Mutex<…>>` so a
//! submission can run on the tokio runtime while the UI keeps rendering.
//! Forms share nothing with each other or with the conversation.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;

use crate::api::{Backend, IngestPayload};
use crate::config::StatusConfig;
use crate::ingest::kind::IngestKind;
use crate::status::StatusSlot;

/// Local problems caught before any request is made.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Please select a .{expected} file.")]
    WrongExtension { expected: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing was sent (empty input, bad file, or already busy).
    Rejected,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Default)]
pub struct FormState {
    /// File path or URL, as typed.
    pub input: String,
    pub busy: bool,
    pub status: StatusSlot,
}

impl FormState {
    pub fn can_submit(&self) -> bool {
        !self.busy && !self.input.trim().is_empty()
    }
}

#[derive(Clone)]
pub struct IngestionForm {
    kind: IngestKind,
    state: Arc<Mutex<FormState>>,
    backend: Arc<dyn Backend>,
    ttl: Duration,
}

impl IngestionForm {
    pub fn new(kind: IngestKind, backend: Arc<dyn Backend>, status: &StatusConfig) -> Self {
        Self {
            kind,
            state: Arc::new(Mutex::new(FormState::default())),
            backend,
            ttl: kind.status_ttl(status),
        }
    }

    /// One form per [`IngestKind`], in display order.
    pub fn all(backend: &Arc<dyn Backend>, status: &StatusConfig) -> Vec<Self> {
        IngestKind::ALL
            .iter()
            .map(|&kind| Self::new(kind, Arc::clone(backend), status))
            .collect()
    }

    pub fn kind(&self) -> IngestKind {
        self.kind
    }

    pub fn lock(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_input(&self, value: impl Into<String>) {
        self.lock().input = value.into();
    }

    /// Submit the current input.
    ///
    /// On success or failure the input is reset and the status is set;
    /// `busy` is cleared either way.
    pub async fn submit(&self) -> SubmitOutcome {
        let input = {
            let mut st = self.lock();
            if st.busy {
                return SubmitOutcome::Rejected;
            }
            let input = st.input.trim().to_string();
            if input.is_empty() {
                st.status.set_error(self.kind.empty_message(), self.ttl);
                return SubmitOutcome::Rejected;
            }
            if let Err(e) = self.check_extension(&input) {
                st.status.set_error(e.to_string(), self.ttl);
                return SubmitOutcome::Rejected;
            }
            st.busy = true;
            st.status.clear();
            input
        };

        let payload = match self.payload(input).await {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("ingest: {:?} not sent: {e}", self.kind);
                let mut st = self.lock();
                st.status.set_error(e.to_string(), self.ttl);
                st.busy = false;
                return SubmitOutcome::Rejected;
            }
        };

        let result = self.backend.ingest(payload).await;

        let mut st = self.lock();
        let outcome = match result {
            Ok(reply) => {
                let text = reply
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| self.kind.success_fallback().to_string());
                log::info!("ingest: {:?} accepted: {text}", self.kind);
                st.status.set_success(text, self.ttl);
                SubmitOutcome::Succeeded
            }
            Err(e) => {
                log::error!("ingest: {:?} failed: {e}", self.kind);
                st.status
                    .set_error(e.user_message(self.kind.error_fallback()), self.ttl);
                SubmitOutcome::Failed
            }
        };
        st.input.clear();
        st.busy = false;
        outcome
    }

    fn check_extension(&self, input: &str) -> Result<(), IngestError> {
        let accepted = self.kind.extensions();
        if accepted.is_empty() {
            return Ok(());
        }
        let ext = Path::new(input)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext {
            Some(ext) if accepted.contains(&ext.as_str()) => Ok(()),
            _ => Err(IngestError::WrongExtension {
                expected: accepted.join(" or ."),
            }),
        }
    }

    async fn payload(&self, input: String) -> Result<IngestPayload, IngestError> {
        match self.kind {
            IngestKind::Url => Ok(IngestPayload::Url(input)),
            IngestKind::Video => Ok(IngestPayload::Video(input)),
            IngestKind::Pdf | IngestKind::SlideDeck => {
                let bytes = tokio::fs::read(&input)
                    .await
                    .map_err(|source| IngestError::Read {
                        path: input.clone(),
                        source,
                    })?;
                let file_name = Path::new(&input)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "upload".to_string());
                Ok(match self.kind {
                    IngestKind::Pdf => IngestPayload::Pdf { file_name, bytes },
                    _ => IngestPayload::SlideDeck { file_name, bytes },
                })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
