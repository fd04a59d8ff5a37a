use crate::api::{AskResponse, HistoryEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
}

/// A single chat bubble.
///
/// `sources` and `context` are only filled in for answers to typed questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
    pub sources: Option<Vec<String>>,
    pub context: Option<String>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            sources: None,
            context: None,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Assistant,
            sources: None,
            context: None,
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

impl From<AskResponse> for Message {
    fn from(reply: AskResponse) -> Self {
        Self {
            text: reply.answer,
            sender: Sender::Assistant,
            sources: reply.sources,
            context: reply.context,
        }
    }
}

/// The persisted log tags turns with a role; only `"user"` maps to the user.
impl From<HistoryEntry> for Message {
    fn from(entry: HistoryEntry) -> Self {
        let sender = if entry.role == "user" {
            Sender::User
        } else {
            Sender::Assistant
        };
        Self {
            text: entry.content,
            sender,
            sources: None,
            context: None,
        }
    }
}
