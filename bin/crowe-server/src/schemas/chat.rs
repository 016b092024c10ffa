use crowe_core::entities::Chat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub chat_id: Option<String>,
    pub content: Option<String>,
    /// Client-side transcript; only the last entry is used, and only when
    /// `content` is absent.
    #[serde(default)]
    pub messages: Vec<IncomingMessage>,
}

impl ChatRequest {
    pub fn prompt(self) -> Option<String> {
        self.content
            .or_else(|| self.messages.into_iter().last().map(|m| m.content))
            .filter(|c| !c.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatList {
    pub chats: Vec<Chat>,
}

#[derive(Debug, Serialize)]
pub struct ChatBody {
    pub chat: Chat,
}
