//! Conversation view state and the controller that drives it.
//!
//! * [`ConversationController`] — send, history, new conversation, tabs and
//!   language selection.
//! * [`ChatState`] / [`SharedChat`] — what the UI renders each frame.
//! * [`Message`] / [`Sender`] — one chat bubble.

pub mod controller;
pub mod message;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use controller::ConversationController;
pub use message::{Message, Sender};
pub use state::{
    lock, new_shared_chat, CatalogState, ChatState, InFlight, LanguageOption, SharedChat, Tab,
    VoiceState,
};
