//! Chat transcript entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who a bubble belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

/// What a bubble holds. Markdown is kept raw; rendering is the host's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum ChatBody {
    Text(String),
    Markdown(String),
    /// A formal policy brief, styled apart from ordinary answers.
    Report(String),
    /// Placeholder shown while a request is in flight.
    Pending(String),
}

impl ChatBody {
    pub fn text(&self) -> &str {
        match self {
            ChatBody::Text(s) | ChatBody::Markdown(s) | ChatBody::Report(s) | ChatBody::Pending(s) => s,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ChatBody::Pending(_))
    }
}

/// One bubble in the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Transcript-unique id, used to remove placeholders.
    pub id: u64,
    pub sender: Sender,
    pub body: ChatBody,
    pub timestamp: DateTime<Utc>,
}
