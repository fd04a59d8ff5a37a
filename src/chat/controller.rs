//! Conversation controller — drives every chat request/response cycle.
//!
//! [`ConversationController`] is a cheap, cloneable handle (two `Arc`s and
//! a couple of small config values).  The UI clones it into a spawned task
//! for each user action; every operation converts its own failure into
//! [`StatusSlot`](crate::status::StatusSlot) state so nothing propagates as
//! an error to the caller.
//!
//! # Operation flow
//!
//! ```text
//! send_message(text)
//!   ├─ push user Message            (before the request)
//!   ├─ POST /chatbot/ask
//!   │    ├─ Ok  → push answer Message
//!   │    └─ Err → push error Message + error status
//!   └─ clear draft
//!
//! select_tab(History) ──▶ fetch_history()   (replace, never append)
//! clear_history()         ──▶ empty history only after the backend agrees
//! start_new_conversation() ─▶ empty messages only after the backend agrees
//! ```

use std::sync::{Arc, MutexGuard};

use crate::api::{AskRequest, Backend};
use crate::chat::message::Message;
use crate::chat::state::{self, new_shared_chat, CatalogState, ChatState, SharedChat, Tab};
use crate::config::{LanguagePreferences, PreferenceError, PreferenceStore, StatusConfig};

pub const CATALOG_ERROR: &str = "Failed to load available languages";
pub const HISTORY_ERROR: &str = "Failed to load chat history";
pub const HISTORY_CLEARED: &str = "Chat history cleared successfully";
pub const CLEAR_HISTORY_ERROR: &str = "Failed to clear chat history";
pub const ASK_FALLBACK: &str = "Unable to get a response from the chatbot.";
pub const NEW_CONVERSATION_STARTED: &str = "Started new conversation";
pub const NEW_CONVERSATION_ERROR: &str = "Failed to start new conversation";

#[derive(Clone)]
pub struct ConversationController {
    state: SharedChat,
    backend: Arc<dyn Backend>,
    store: PreferenceStore,
    status: StatusConfig,
}

impl ConversationController {
    /// Create a controller, restoring the language pair from `store`.
    pub fn new(backend: Arc<dyn Backend>, store: PreferenceStore, status: StatusConfig) -> Self {
        let prefs = store.load();
        log::info!(
            "chat: restored languages input={} output={}",
            prefs.input_language(),
            prefs.output_language()
        );
        Self {
            state: new_shared_chat(prefs),
            backend,
            store,
            status,
        }
    }

    pub fn state(&self) -> SharedChat {
        Arc::clone(&self.state)
    }

    pub fn backend(&self) -> Arc<dyn Backend> {
        Arc::clone(&self.backend)
    }

    pub fn status_config(&self) -> &StatusConfig {
        &self.status
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, ChatState> {
        state::lock(&self.state)
    }

    /// Append to the current conversation (used by the voice loop).
    pub fn push_message(&self, message: Message) {
        self.lock().messages.push(message);
    }

    pub fn preferences(&self) -> LanguagePreferences {
        self.lock().prefs.clone()
    }

    // -----------------------------------------------------------------------
    // Language catalog
    // -----------------------------------------------------------------------

    /// Fetch the supported language names.  Run once at startup.
    pub async fn load_language_catalog(&self) {
        self.lock().catalog = CatalogState::Loading;

        match self.backend.available_languages().await {
            Ok(reply) => {
                let names = reply.names();
                log::info!("chat: {} languages available", names.len());
                self.lock().catalog = CatalogState::Ready(names);
            }
            Err(e) => {
                log::error!("chat: error fetching languages: {e}");
                let mut st = self.lock();
                st.catalog = CatalogState::Failed;
                st.status.set_error(CATALOG_ERROR, self.status.load_error_ttl());
            }
        }
    }

    // -----------------------------------------------------------------------
    // Asking
    // -----------------------------------------------------------------------

    /// Send `text` as a question.
    ///
    /// Returns `false` without touching any state when `text` is blank.
    /// Questions may overlap; each appends its own user message at once and
    /// its answer whenever that arrives.
    pub async fn send_message(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }

        let request = {
            let mut st = self.lock();
            st.in_flight.asks += 1;
            st.messages.push(Message::user(text));
            AskRequest::new(text, &st.prefs)
        };

        let result = self.backend.ask(&request).await;

        let mut st = self.lock();
        match result {
            Ok(reply) => {
                st.messages.push(Message::from(reply));
            }
            Err(e) => {
                log::warn!("chat: ask failed: {e}");
                let text = e.user_message(ASK_FALLBACK);
                st.status.set_error(text.clone(), self.status.error_ttl());
                st.messages.push(Message::assistant(text));
            }
        }
        st.draft.clear();
        st.in_flight.asks = st.in_flight.asks.saturating_sub(1);
        true
    }

    /// Send whatever is in the input box.
    pub async fn send_draft(&self) -> bool {
        let draft = self.lock().draft.clone();
        self.send_message(&draft).await
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    /// Replace the history list with the backend's persisted log.
    pub async fn fetch_history(&self) {
        let result = self.backend.history().await;

        let mut st = self.lock();
        match result {
            Ok(reply) => {
                st.history = reply.history.into_iter().map(Message::from).collect();
                log::debug!("chat: loaded {} history entries", st.history.len());
            }
            Err(e) => {
                log::error!("chat: error fetching chat history: {e}");
                st.history.clear();
                st.status.set_error(HISTORY_ERROR, self.status.load_error_ttl());
            }
        }
    }

    /// Ask the backend to delete its log; the local list is emptied only on
    /// success.
    pub async fn clear_history(&self) {
        {
            let mut st = self.lock();
            if st.in_flight.clearing_history {
                return;
            }
            st.in_flight.clearing_history = true;
        }

        let result = self.backend.clear_history().await;

        let mut st = self.lock();
        match result {
            Ok(_) => {
                st.history.clear();
                st.status.set_success(HISTORY_CLEARED, self.status.success_ttl());
            }
            Err(e) => {
                log::error!("chat: error clearing chat history: {e}");
                st.status.set_error(CLEAR_HISTORY_ERROR, self.status.error_ttl());
            }
        }
        st.in_flight.clearing_history = false;
    }

    // -----------------------------------------------------------------------
    // Conversation lifecycle
    // -----------------------------------------------------------------------

    /// Reset the backend's conversation context, then the local one.
    pub async fn start_new_conversation(&self) {
        {
            let mut st = self.lock();
            if st.in_flight.starting_conversation {
                return;
            }
            st.in_flight.starting_conversation = true;
        }

        let result = self.backend.start_new_conversation().await;

        let mut st = self.lock();
        match result {
            Ok(_) => {
                st.messages.clear();
                st.draft.clear();
                st.status
                    .set_success(NEW_CONVERSATION_STARTED, self.status.success_ttl());
            }
            Err(e) => {
                log::error!("chat: error starting new conversation: {e}");
                st.status
                    .set_error(NEW_CONVERSATION_ERROR, self.status.error_ttl());
            }
        }
        st.in_flight.starting_conversation = false;
    }

    // -----------------------------------------------------------------------
    // Tabs and languages
    // -----------------------------------------------------------------------

    /// Switch tabs.  Entering the history tab refreshes the history.
    pub async fn select_tab(&self, tab: Tab) {
        let previous = std::mem::replace(&mut self.lock().tab, tab);
        if tab == Tab::History && previous != Tab::History {
            self.fetch_history().await;
        }
    }

    pub fn set_input_language(&self, name: &str) -> Result<(), PreferenceError> {
        let snapshot = {
            let mut st = self.lock();
            st.prefs.set_input(name);
            st.prefs.clone()
        };
        self.persist(&snapshot)
    }

    /// Rejects the auto-detect sentinel and keeps the previous value.
    pub fn set_output_language(&self, name: &str) -> Result<(), PreferenceError> {
        let snapshot = {
            let mut st = self.lock();
            st.prefs.set_output(name)?;
            st.prefs.clone()
        };
        self.persist(&snapshot)
    }

    fn persist(&self, prefs: &LanguagePreferences) -> Result<(), PreferenceError> {
        self.store.save(prefs).inspect_err(|e| {
            log::warn!("chat: could not persist language preferences: {e}");
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
