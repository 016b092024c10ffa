use chrono::serde::ts_milliseconds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder title of a chat that has not been named yet.
pub const NEW_CHAT_TITLE: &str = "New Chat";

/// Longest title derived from a first user message, in characters.
pub const TITLE_MAX_CHARS: usize = 100;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One entry of a chat transcript. Never modified once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(with = "ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied part of a [`Message`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    pub role: Role,
    pub content: String,
}

impl NewMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A conversation, stored in `chats:{userId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    #[serde(with = "ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    pub user_id: String,
}

/// Fields of a [`Chat`] that an update may overwrite.
///
/// Each present field replaces the stored one wholesale: `messages` swaps the
/// whole transcript, it is never merged element by element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPatch {
    pub title: Option<String>,
    pub messages: Option<Vec<Message>>,
}

impl ChatPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Overlay this patch on `base` and stamp `updated_at`.
    pub fn merge(self, base: Chat, now: DateTime<Utc>) -> Chat {
        Chat {
            title: self.title.unwrap_or(base.title),
            messages: self.messages.unwrap_or(base.messages),
            updated_at: now,
            ..base
        }
    }
}

/// Title a chat should take after `message` is appended, if it changes.
///
/// Only a still-untitled chat receiving a user message is renamed, to the
/// first [`TITLE_MAX_CHARS`] characters of the content (hard cut).
pub fn derived_title(current: &str, message: &NewMessage) -> Option<String> {
    if current == NEW_CHAT_TITLE && message.role == Role::User {
        Some(message.content.chars().take(TITLE_MAX_CHARS).collect())
    } else {
        None
    }
}
