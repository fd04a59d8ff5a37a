//! Conversation view state shared between the async operations and the UI.
//!
//! [`ChatState`] is the single source of truth the egui update loop reads
//! each frame.  [`SharedChat`] is a type alias for `Arc<Mutex<ChatState>>`;
//! operations lock it for short critical sections and never hold the lock
//! across `.await` points.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::chat::message::Message;
use crate::config::{LanguagePreferences, AUTO_DETECT};
use crate::status::StatusSlot;

// ---------------------------------------------------------------------------
// Tab
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Conversation,
    History,
    Upload,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Conversation, Tab::History, Tab::Upload];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Conversation => "Conversation",
            Tab::History => "Chat History",
            Tab::Upload => "Document Upload",
        }
    }
}

// ---------------------------------------------------------------------------
// CatalogState
// ---------------------------------------------------------------------------

/// The server-supplied list of language names.
///
/// Loaded once at startup.  A failed load is not retried, so the selectors
/// stay disabled for the rest of the session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CatalogState {
    #[default]
    Loading,
    Ready(Vec<String>),
    Failed,
}

impl CatalogState {
    pub fn is_loading(&self) -> bool {
        matches!(self, CatalogState::Loading)
    }

    pub fn languages(&self) -> &[String] {
        match self {
            CatalogState::Ready(names) => names,
            _ => &[],
        }
    }
}

/// One entry in a language drop-down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageOption {
    pub value: String,
    pub label: String,
}

// ---------------------------------------------------------------------------
// InFlight / VoiceState
// ---------------------------------------------------------------------------

/// Requests currently waiting on the backend.
///
/// Questions are never refused, so `asks` is a count.  The two reset
/// operations are single-flight: the UI disables their buttons while the
/// flag is set and the controller refuses a second request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InFlight {
    pub asks: usize,
    pub clearing_history: bool,
    pub starting_conversation: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceState {
    /// `true` from the moment the loop starts until it exits.
    pub listening: bool,
    /// Button caption override (`Listening...`, `Error occurred`).
    pub label: Option<String>,
}

// ---------------------------------------------------------------------------
// ChatState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ChatState {
    /// Current, unsaved conversation in display order.
    pub messages: Vec<Message>,
    /// Last fetched copy of the backend's persisted log.
    pub history: Vec<Message>,
    pub tab: Tab,
    pub prefs: LanguagePreferences,
    pub catalog: CatalogState,
    pub status: StatusSlot,
    /// Text in the message input box.
    pub draft: String,
    pub in_flight: InFlight,
    pub voice: VoiceState,
}

impl ChatState {
    pub fn new(prefs: LanguagePreferences) -> Self {
        Self {
            prefs,
            ..Self::default()
        }
    }

    /// Selectors are usable only once the catalog has loaded.
    pub fn selectors_enabled(&self) -> bool {
        matches!(self.catalog, CatalogState::Ready(_))
    }

    /// `Auto-detect` followed by every catalog language.
    pub fn input_options(&self) -> Vec<LanguageOption> {
        let mut options = vec![LanguageOption {
            value: AUTO_DETECT.to_string(),
            label: "Auto-detect".to_string(),
        }];
        options.extend(self.output_options());
        options
    }

    pub fn output_options(&self) -> Vec<LanguageOption> {
        self.catalog
            .languages()
            .iter()
            .map(|name| LanguageOption {
                value: name.clone(),
                label: name.clone(),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// SharedChat
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`ChatState`].  Cheap to clone (`Arc` clone).
pub type SharedChat = Arc<Mutex<ChatState>>;

pub fn new_shared_chat(prefs: LanguagePreferences) -> SharedChat {
    Arc::new(Mutex::new(ChatState::new(prefs)))
}

/// Lock `state`, recovering the data if a previous holder panicked.
pub fn lock(state: &SharedChat) -> MutexGuard<'_, ChatState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
