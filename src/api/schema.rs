//! Wire types for every backend endpoint.
//!
//! Optional response fields are modelled with `#[serde(default)]` so a
//! missing field deserialises to an empty value instead of failing the whole
//! response.  Fields the backend may send as `null` additionally go through
//! [`null_as_default`].

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::LanguagePreferences;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// `POST /chatbot/ask`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    pub question: String,
    pub input_language: String,
    pub output_language: String,
}

impl AskRequest {
    pub fn new(question: impl Into<String>, prefs: &LanguagePreferences) -> Self {
        Self {
            question: question.into(),
            input_language: prefs.input_language().to_string(),
            output_language: prefs.output_language().to_string(),
        }
    }
}

/// `POST /speech/speech_chat`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechChatRequest {
    pub input_language: String,
    pub output_language: String,
}

impl From<&LanguagePreferences> for SpeechChatRequest {
    fn from(prefs: &LanguagePreferences) -> Self {
        Self {
            input_language: prefs.input_language().to_string(),
            output_language: prefs.output_language().to_string(),
        }
    }
}

/// `POST /document/process-url`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessUrlRequest {
    pub url: String,
}

/// `POST /document/process-video`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessVideoRequest {
    pub video_url: String,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// `null` reads as `T::default()`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Anything other than an array reads as no history.
fn history_or_empty<'de, D>(deserializer: D) -> Result<Vec<HistoryEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        value @ serde_json::Value::Array(_) => {
            serde_json::from_value(value).map_err(serde::de::Error::custom)
        }
        _ => Ok(Vec::new()),
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LanguageEntry {
    pub name: String,
}

/// `GET /chatbot/available-languages`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LanguagesResponse {
    pub languages: Vec<LanguageEntry>,
}

impl LanguagesResponse {
    pub fn names(self) -> Vec<String> {
        self.languages.into_iter().map(|l| l.name).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
}

/// `GET /chatbot/get-history`
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct HistoryResponse {
    #[serde(default, deserialize_with = "history_or_empty")]
    pub history: Vec<HistoryEntry>,
}

/// `POST /chatbot/ask` success body.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct AskResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub answer: String,
    #[serde(default)]
    pub sources: Option<Vec<String>>,
    #[serde(default)]
    pub context: Option<String>,
}

/// The `status` field of a speech-chat turn.
///
/// Only `"stopped"` ends the loop; anything else, `null` or a missing field
/// continues it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceStatus {
    Stopped,
    #[default]
    #[serde(other)]
    Continue,
}

/// `POST /speech/speech_chat`
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechChatResponse {
    #[serde(default)]
    pub user_message: Option<String>,
    #[serde(default)]
    pub assistant_response: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: VoiceStatus,
}

impl SpeechChatResponse {
    pub fn is_stopped(&self) -> bool {
        self.status == VoiceStatus::Stopped
    }
}

/// Bodies that only carry a human-readable confirmation.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Structured error body returned with non-2xx statuses.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
