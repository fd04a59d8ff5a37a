//! Backend contract for the document-chat client.
//!
//! This module provides:
//! * [`Backend`] — async trait with one method per REST endpoint.
//! * [`HttpBackend`] — `reqwest` implementation against the configured origin.
//! * [`schema`] — typed request and response bodies.
//! * [`ApiError`] — transport, timeout, parse and backend-reported errors.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use doc_chat::api::{AskRequest, Backend, HttpBackend};
//! use doc_chat::config::{AppConfig, LanguagePreferences};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let backend = HttpBackend::from_config(&config.backend);
//!
//!     let request = AskRequest::new("What is in the PDF?", &LanguagePreferences::default());
//!     match backend.ask(&request).await {
//!         Ok(reply) => println!("{}", reply.answer),
//!         Err(e) => eprintln!("{}", e.user_message("Unable to get a response from the chatbot.")),
//!     }
//! }
//! ```

pub mod client;
pub mod error;
pub mod schema;

// test-only scripted backend shared by the controller, voice and ingest tests.
#[cfg(test)]
pub mod mock;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{Backend, HttpBackend, IngestPayload};
pub use error::ApiError;
pub use schema::{
    AskRequest, AskResponse, HistoryEntry, HistoryResponse, LanguageEntry, LanguagesResponse,
    MessageResponse, SpeechChatRequest, SpeechChatResponse, VoiceStatus,
};
