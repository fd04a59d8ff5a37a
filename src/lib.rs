//! Desktop client for a document-aware chatbot.
//!
//! * [`api`] — HTTP contract with the chatbot backend.
//! * [`chat`] — conversation state and the operations that drive it.
//! * [`voice`] — continuous speech-chat loop and reply playback.
//! * [`ingest`] — document ingestion forms.
//! * [`status`] — auto-expiring status messages.
//! * [`config`] — settings file and persisted language preferences.
//! * [`app`] — the egui window.

pub mod api;
pub mod app;
pub mod chat;
pub mod config;
pub mod ingest;
pub mod status;
pub mod voice;
