//! Voice chat for the conversation view.
//!
//! * [`VoiceLoop`] / [`VoiceHandle`] — the continuous speech-chat cycle as a
//!   cancellable tokio task.
//! * [`AudioPlayer`] — plays the assistant's audio reply;
//!   [`CommandPlayer`] shells out to an external player, [`NullPlayer`]
//!   skips playback.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use doc_chat::api::HttpBackend;
//! use doc_chat::chat::ConversationController;
//! use doc_chat::config::{AppConfig, PreferenceStore};
//! use doc_chat::voice::{player_from_config, VoiceLoop};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let chat = ConversationController::new(
//!         Arc::new(HttpBackend::from_config(&config.backend)),
//!         PreferenceStore::new(),
//!         config.status.clone(),
//!     );
//!
//!     let handle = VoiceLoop::new(chat, player_from_config(&config.voice))
//!         .with_config(&config.voice)
//!         .start()
//!         .expect("not already listening");
//!     println!("{:?}", handle.join().await);
//! }
//! ```

pub mod player;
pub mod session;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use player::{player_from_config, AudioPlayer, CommandPlayer, NullPlayer, PlaybackError};
pub use session::{VoiceHandle, VoiceLoop, VoiceOutcome, ERROR_LABEL, LISTENING, VOICE_ERROR};
