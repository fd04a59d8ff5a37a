//! Continuous voice chat — one speech-chat request after another until the
//! backend reports `"stopped"`.
//!
//! # Loop
//!
//! ```text
//! start() ── listening = true
//!   loop
//!     POST /speech/speech_chat {inputLanguage, outputLanguage}
//!       ├─ Ok  → push userMessage / assistantResponse, play audioUrl
//!       │        status == "stopped" → exit (Stopped)
//!       └─ Err → push VOICE_ERROR; failures == cap → exit (Failed)
//!     cancelled → exit (Cancelled)
//! listening = false
//! ```
//!
//! The loop runs as a spawned tokio task; [`VoiceHandle::stop`] cancels the
//! in-flight request and ends it.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::{SpeechChatRequest, SpeechChatResponse};
use crate::chat::{ConversationController, Message};
use crate::config::VoiceConfig;
use crate::voice::player::AudioPlayer;

pub const LISTENING: &str = "Listening...";
pub const ERROR_LABEL: &str = "Error occurred";
pub const VOICE_ERROR: &str = "Sorry, there was an error processing your voice input.";

/// Why a voice loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceOutcome {
    /// The backend answered with status `"stopped"`.
    Stopped,
    /// [`VoiceHandle::stop`] was called.
    Cancelled,
    /// `failures` consecutive requests failed.
    Failed { failures: u32 },
}

// ---------------------------------------------------------------------------
// VoiceHandle
// ---------------------------------------------------------------------------

pub struct VoiceHandle {
    token: CancellationToken,
    task: JoinHandle<VoiceOutcome>,
}

impl VoiceHandle {
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the loop to exit.
    pub async fn join(self) -> VoiceOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("voice: loop task failed: {e}");
                VoiceOutcome::Cancelled
            }
        }
    }
}

// ---------------------------------------------------------------------------
// VoiceLoop
// ---------------------------------------------------------------------------

pub struct VoiceLoop {
    chat: ConversationController,
    player: Arc<dyn AudioPlayer>,
    max_consecutive_failures: u32,
    audio_base: Option<String>,
}

impl VoiceLoop {
    pub fn new(chat: ConversationController, player: Arc<dyn AudioPlayer>) -> Self {
        Self {
            chat,
            player,
            max_consecutive_failures: 1,
            audio_base: None,
        }
    }

    pub fn with_config(mut self, config: &VoiceConfig) -> Self {
        self.max_consecutive_failures = config.max_consecutive_failures.max(1);
        self
    }

    /// Origin used to resolve audio URLs given as absolute paths (`/static/…`).
    pub fn with_audio_base(mut self, base: impl Into<String>) -> Self {
        self.audio_base = Some(base.into().trim_end_matches('/').to_string());
        self
    }

    /// Start the loop on the current tokio runtime.
    ///
    /// Returns `None` if a loop is already listening.
    pub fn start(self) -> Option<VoiceHandle> {
        self.start_on(&tokio::runtime::Handle::current())
    }

    pub fn start_on(self, runtime: &tokio::runtime::Handle) -> Option<VoiceHandle> {
        {
            let state = self.chat.state();
            let mut st = crate::chat::lock(&state);
            if st.voice.listening {
                log::debug!("voice: already listening, start ignored");
                return None;
            }
            st.voice.listening = true;
            st.voice.label = Some(LISTENING.to_string());
        }

        let token = CancellationToken::new();
        let task = runtime.spawn(self.run(token.clone()));
        Some(VoiceHandle { token, task })
    }

    async fn run(self, token: CancellationToken) -> VoiceOutcome {
        log::info!("voice: loop started");
        let backend = self.chat.backend();
        let mut failures = 0u32;

        let outcome = loop {
            let request = {
                let state = self.chat.state();
                let mut st = crate::chat::lock(&state);
                st.voice.label = Some(LISTENING.to_string());
                SpeechChatRequest::from(&st.prefs)
            };

            let result = tokio::select! {
                _ = token.cancelled() => break VoiceOutcome::Cancelled,
                result = backend.speech_chat(&request) => result,
            };

            match result {
                Ok(reply) => {
                    failures = 0;
                    let stopped = reply.is_stopped();
                    self.apply(reply);
                    if stopped {
                        break VoiceOutcome::Stopped;
                    }
                    if token.is_cancelled() {
                        break VoiceOutcome::Cancelled;
                    }
                }
                Err(e) => {
                    failures += 1;
                    log::error!("voice: speech chat failed ({failures}): {e}");
                    self.chat.push_message(Message::assistant(VOICE_ERROR));
                    if failures >= self.max_consecutive_failures {
                        break VoiceOutcome::Failed { failures };
                    }
                }
            }
        };

        let state = self.chat.state();
        let mut st = crate::chat::lock(&state);
        st.voice.listening = false;
        st.voice.label = match outcome {
            VoiceOutcome::Failed { .. } => Some(ERROR_LABEL.to_string()),
            _ => None,
        };
        log::info!("voice: loop ended ({outcome:?})");
        outcome
    }

    fn apply(&self, reply: SpeechChatResponse) {
        if let Some(text) = reply.user_message.filter(|t| !t.is_empty()) {
            self.chat.push_message(Message::user(text));
        }

        if let Some(text) = reply.assistant_response.filter(|t| !t.is_empty()) {
            self.chat.push_message(Message::assistant(text));

            if let Some(url) = reply.audio_url.filter(|u| !u.is_empty()) {
                let url = self.resolve_audio_url(&url);
                let player = Arc::clone(&self.player);
                // Playback overlaps the next listening turn.
                tokio::spawn(async move {
                    if let Err(e) = player.play(&url).await {
                        log::warn!("voice: failed to play audio: {e}");
                    }
                });
            }
        }
    }

    fn resolve_audio_url(&self, url: &str) -> String {
        match &self.audio_base {
            Some(base) if url.starts_with('/') => format!("{base}{url}"),
            _ => url.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{self, MockBackend};
    use crate::api::{ApiError, Backend};
    use crate::chat::Sender;
    use crate::config::{PreferenceStore, StatusConfig};
    use crate::voice::player::PlaybackError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every URL it is asked to play.
    #[derive(Default)]
    struct RecordingPlayer {
        played: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl AudioPlayer for RecordingPlayer {
        async fn play(&self, url: &str) -> Result<(), PlaybackError> {
            self.played.lock().unwrap().push(url.to_string());
            if self.fail {
                return Err(PlaybackError::Spawn {
                    program: "test".into(),
                    source: std::io::Error::other("no device"),
                });
            }
            Ok(())
        }
    }

    fn setup(backend: &Arc<MockBackend>) -> ConversationController {
        ConversationController::new(
            Arc::clone(backend) as Arc<dyn Backend>,
            PreferenceStore::in_memory(),
            StatusConfig::default(),
        )
    }

    #[tokio::test]
    async fn continues_until_stopped() {
        let backend = Arc::new(MockBackend::new());
        backend
            .push_speech(Ok(mock::turn(Some("hi"), Some("hello"), "listening")))
            .push_speech(Ok(mock::turn(Some("bye"), Some("goodbye"), "stopped")));
        let chat = setup(&backend);
        let player = Arc::new(RecordingPlayer::default());

        let handle = VoiceLoop::new(chat.clone(), player.clone()).start().unwrap();
        assert_eq!(handle.join().await, VoiceOutcome::Stopped);

        assert_eq!(backend.calls("speech"), 2);
        let st = chat.lock();
        let texts: Vec<&str> = st.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["hi", "hello", "bye", "goodbye"]);
        assert_eq!(st.messages[0].sender, Sender::User);
        assert_eq!(st.messages[1].sender, Sender::Assistant);
        assert!(!st.voice.listening);
        assert!(st.voice.label.is_none());
    }

    #[tokio::test]
    async fn missing_status_means_one_more_request() {
        let backend = Arc::new(MockBackend::new());
        backend
            .push_speech(Ok(SpeechChatResponse::default()))
            .push_speech(Ok(mock::turn(None, None, "stopped")));
        let chat = setup(&backend);

        let handle = VoiceLoop::new(chat.clone(), Arc::new(RecordingPlayer::default()))
            .start()
            .unwrap();
        assert_eq!(handle.join().await, VoiceOutcome::Stopped);
        assert_eq!(backend.calls("speech"), 2);
        assert!(chat.lock().messages.is_empty());
    }

    #[tokio::test]
    async fn failure_stops_the_loop_with_error_message() {
        let backend = Arc::new(MockBackend::new());
        backend
            .push_speech(Ok(mock::turn(Some("hi"), Some("hello"), "listening")))
            .push_speech(Err(ApiError::Timeout))
            .push_speech(Ok(mock::turn(Some("never"), None, "stopped")));
        let chat = setup(&backend);

        let handle = VoiceLoop::new(chat.clone(), Arc::new(RecordingPlayer::default()))
            .start()
            .unwrap();
        assert_eq!(handle.join().await, VoiceOutcome::Failed { failures: 1 });

        assert_eq!(backend.calls("speech"), 2);
        let st = chat.lock();
        assert_eq!(st.messages.last(), Some(&Message::assistant(VOICE_ERROR)));
        assert!(!st.voice.listening);
        assert_eq!(st.voice.label.as_deref(), Some(ERROR_LABEL));
    }

    #[tokio::test]
    async fn failure_cap_allows_retries() {
        let backend = Arc::new(MockBackend::new());
        backend
            .push_speech(Err(ApiError::Timeout))
            .push_speech(Ok(mock::turn(Some("q"), Some("a"), "listening")))
            .push_speech(Err(ApiError::Timeout))
            .push_speech(Err(ApiError::Timeout));
        let chat = setup(&backend);
        let config = VoiceConfig {
            max_consecutive_failures: 2,
            ..VoiceConfig::default()
        };

        let handle = VoiceLoop::new(chat.clone(), Arc::new(RecordingPlayer::default()))
            .with_config(&config)
            .start()
            .unwrap();
        assert_eq!(handle.join().await, VoiceOutcome::Failed { failures: 2 });
        assert_eq!(backend.calls("speech"), 4);
        let errors = chat
            .lock()
            .messages
            .iter()
            .filter(|m| m.text == VOICE_ERROR)
            .count();
        assert_eq!(errors, 3);
    }

    #[tokio::test]
    async fn second_start_while_listening_is_refused() {
        let backend = Arc::new(MockBackend::new());
        backend.push_speech(Ok(mock::turn(None, Some("a"), "stopped")));
        let chat = setup(&backend);
        let player: Arc<dyn AudioPlayer> = Arc::new(RecordingPlayer::default());

        let first = VoiceLoop::new(chat.clone(), Arc::clone(&player)).start().unwrap();
        assert!(chat.lock().voice.listening);
        assert!(VoiceLoop::new(chat.clone(), Arc::clone(&player)).start().is_none());

        first.join().await;
        assert_eq!(backend.calls("speech"), 1);
        assert!(!chat.lock().voice.listening);
    }

    #[tokio::test]
    async fn stop_cancels_the_loop() {
        let backend = Arc::new(MockBackend::new());
        for _ in 0..1000 {
            backend.push_speech(Ok(mock::turn(None, None, "listening")));
        }
        let chat = setup(&backend);

        let handle = VoiceLoop::new(chat.clone(), Arc::new(RecordingPlayer::default()))
            .start()
            .unwrap();
        handle.stop();
        assert_eq!(handle.join().await, VoiceOutcome::Cancelled);
        assert!(backend.calls("speech") < 1000);
        assert!(!chat.lock().voice.listening);
    }

    #[tokio::test]
    async fn requests_carry_current_languages() {
        let backend = Arc::new(MockBackend::new());
        backend.push_speech(Ok(mock::turn(None, None, "stopped")));
        let chat = setup(&backend);
        chat.set_input_language("French").unwrap();
        chat.set_output_language("Spanish").unwrap();

        VoiceLoop::new(chat.clone(), Arc::new(RecordingPlayer::default()))
            .start()
            .unwrap()
            .join()
            .await;

        let sent = backend.speech_requests();
        assert_eq!(sent[0].input_language, "French");
        assert_eq!(sent[0].output_language, "Spanish");
    }

    #[tokio::test]
    async fn playback_failure_is_not_surfaced() {
        let backend = Arc::new(MockBackend::new());
        backend.push_speech(Ok(mock::turn(Some("q"), Some("a"), "stopped")));
        let chat = setup(&backend);
        let player = Arc::new(RecordingPlayer {
            fail: true,
            ..RecordingPlayer::default()
        });

        let outcome = VoiceLoop::new(chat.clone(), player.clone())
            .start()
            .unwrap()
            .join()
            .await;
        // Let the detached playback task run.
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        assert_eq!(outcome, VoiceOutcome::Stopped);
        assert_eq!(player.played.lock().unwrap().len(), 1);
        let st = chat.lock();
        assert_eq!(st.messages.len(), 2);
        assert!(st.status.error().is_none());
    }

    #[test]
    fn relative_audio_urls_use_the_backend_origin() {
        let backend = Arc::new(MockBackend::new());
        let chat = setup(&backend);
        let voice = VoiceLoop::new(chat, Arc::new(RecordingPlayer::default()))
            .with_audio_base("http://127.0.0.1:5000/");

        assert_eq!(
            voice.resolve_audio_url("/static/reply.mp3"),
            "http://127.0.0.1:5000/static/reply.mp3"
        );
        assert_eq!(
            voice.resolve_audio_url("https://cdn.test/a.mp3"),
            "https://cdn.test/a.mp3"
        );
    }
}
