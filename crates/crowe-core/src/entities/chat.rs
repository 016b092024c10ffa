use std::future::Future;

use tracing::{debug, info};

use crate::entities::dao::chat::{NEW_CHAT_TITLE, derived_title};
use crate::entities::{Chat, ChatPatch, KvStore, Message, NewMessage, keys, new_id};
use crate::error::{CoreError, Result};

pub trait ChatStore: Send + Sync + 'static {
    /// Start an empty, untitled chat.
    fn create_chat(&self, user_id: &str) -> impl Future<Output = Result<Chat>> + Send;

    fn get_chat(
        &self,
        user_id: &str,
        chat_id: &str,
    ) -> impl Future<Output = Result<Option<Chat>>> + Send;

    /// Overlay `patch` on the stored chat. Silently does nothing when the
    /// chat does not exist.
    fn update_chat(
        &self,
        user_id: &str,
        chat_id: &str,
        patch: ChatPatch,
    ) -> impl Future<Output = Result<()>> + Send;

    /// All of the user's chats, most recently updated first.
    fn get_user_chats(&self, user_id: &str) -> impl Future<Output = Result<Vec<Chat>>> + Send;

    /// Append a message to the transcript, naming the chat after its first
    /// user message. Fails with [`CoreError::ChatNotFound`] and writes
    /// nothing when the chat does not exist.
    fn add_message_to_chat(
        &self,
        user_id: &str,
        chat_id: &str,
        message: NewMessage,
    ) -> impl Future<Output = Result<Message>> + Send;
}

impl ChatStore for KvStore {
    async fn create_chat(&self, user_id: &str) -> Result<Chat> {
        let now = self.now();
        let chat = Chat {
            id: new_id(),
            title: NEW_CHAT_TITLE.to_owned(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
            user_id: user_id.to_owned(),
        };
        self.write(&keys::chats(user_id), &chat.id, &chat).await?;
        info!(user_id, chat_id = %chat.id, "chat created");
        Ok(chat)
    }

    async fn get_chat(&self, user_id: &str, chat_id: &str) -> Result<Option<Chat>> {
        self.read(&keys::chats(user_id), chat_id).await
    }

    async fn update_chat(&self, user_id: &str, chat_id: &str, patch: ChatPatch) -> Result<()> {
        let Some(existing) = self.get_chat(user_id, chat_id).await? else {
            debug!(user_id, chat_id, "update of missing chat ignored");
            return Ok(());
        };
        let updated = patch.merge(existing, self.now());
        self.write(&keys::chats(user_id), chat_id, &updated).await
    }

    async fn get_user_chats(&self, user_id: &str) -> Result<Vec<Chat>> {
        let mut chats: Vec<Chat> = self.read_all(&keys::chats(user_id)).await?;
        chats.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(chats)
    }

    async fn add_message_to_chat(
        &self,
        user_id: &str,
        chat_id: &str,
        message: NewMessage,
    ) -> Result<Message> {
        let chat = self
            .get_chat(user_id, chat_id)
            .await?
            .ok_or_else(|| CoreError::ChatNotFound {
                chat_id: chat_id.to_owned(),
            })?;

        let title = derived_title(&chat.title, &message);
        let appended = Message {
            id: new_id(),
            role: message.role,
            content: message.content,
            created_at: self.now(),
        };

        let mut messages = chat.messages;
        messages.push(appended.clone());
        debug!(user_id, chat_id, role = %appended.role, len = messages.len(), "appending chat message");

        self.update_chat(
            user_id,
            chat_id,
            ChatPatch {
                title,
                messages: Some(messages),
            },
        )
        .await?;
        Ok(appended)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clock::ManualClock;
    use crate::entities::Role;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn store() -> KvStore {
        KvStore::in_memory().with_clock(Arc::new(ManualClock::new(1_000, 1)))
    }

    #[tokio::test]
    async fn fresh_chat_is_untitled_and_empty() {
        let store = store();
        let created = store.create_chat("u1").await.unwrap();
        let fetched = store.get_chat("u1", &created.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, NEW_CHAT_TITLE);
        assert!(fetched.messages.is_empty());
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn chats_are_partitioned_by_user() {
        let store = store();
        let chat = store.create_chat("u1").await.unwrap();
        assert!(store.get_chat("u2", &chat.id).await.unwrap().is_none());
        assert!(store.get_user_chats("u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn messages_keep_call_order_with_unique_ids() {
        let store = store();
        let chat = store.create_chat("u1").await.unwrap();
        for i in 0..6 {
            let msg = if i % 2 == 0 {
                NewMessage::user(format!("q{i}"))
            } else {
                NewMessage::assistant(format!("a{i}"))
            };
            store.add_message_to_chat("u1", &chat.id, msg).await.unwrap();
        }
        let chat = store.get_chat("u1", &chat.id).await.unwrap().unwrap();
        let contents: Vec<_> = chat.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["q0", "a1", "q2", "a3", "q4", "a5"]);
        let ids: HashSet<_> = chat.messages.iter().map(|m| &m.id).collect();
        assert_eq!(ids.len(), 6);
    }

    #[tokio::test]
    async fn assistant_first_keeps_placeholder_title() {
        let store = store();
        let chat = store.create_chat("u1").await.unwrap();
        store
            .add_message_to_chat("u1", &chat.id, NewMessage::assistant("Welcome!"))
            .await
            .unwrap();
        let chat = store.get_chat("u1", &chat.id).await.unwrap().unwrap();
        assert_eq!(chat.title, NEW_CHAT_TITLE);
    }

    #[tokio::test]
    async fn first_user_message_names_chat_once() {
        let store = store();
        let chat = store.create_chat("u1").await.unwrap();
        let long = "x".repeat(140);
        store
            .add_message_to_chat("u1", &chat.id, NewMessage::user(long.clone()))
            .await
            .unwrap();
        store
            .add_message_to_chat("u1", &chat.id, NewMessage::user("second question"))
            .await
            .unwrap();
        let chat = store.get_chat("u1", &chat.id).await.unwrap().unwrap();
        assert_eq!(chat.title, &long[..100]);
        assert_eq!(chat.messages[0].role, Role::User);
    }

    #[tokio::test]
    async fn missing_chat_fails_without_side_effects() {
        let store = store();
        let err = store
            .add_message_to_chat("u1", "nope", NewMessage::user("hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ChatNotFound { ref chat_id } if chat_id == "nope"));
        assert!(store.get_user_chats("u1").await.unwrap().is_empty());
        assert!(store.get_chat("u1", "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_of_missing_chat_is_a_no_op() {
        let store = store();
        store
            .update_chat("u1", "ghost", ChatPatch::title("Ghost"))
            .await
            .unwrap();
        assert!(store.get_chat("u1", "ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_refreshes_updated_at_and_keeps_messages() {
        let store = store();
        let chat = store.create_chat("u1").await.unwrap();
        store
            .add_message_to_chat("u1", &chat.id, NewMessage::user("hi"))
            .await
            .unwrap();
        let before = store.get_chat("u1", &chat.id).await.unwrap().unwrap();
        store
            .update_chat("u1", &chat.id, ChatPatch::title("Renamed"))
            .await
            .unwrap();
        let after = store.get_chat("u1", &chat.id).await.unwrap().unwrap();
        assert_eq!(after.title, "Renamed");
        assert_eq!(after.messages, before.messages);
        assert!(after.updated_at > before.updated_at);
        assert_eq!(after.created_at, before.created_at);
    }

    #[tokio::test]
    async fn user_chats_sorted_by_recent_update() {
        let store = store();
        let first = store.create_chat("u1").await.unwrap();
        let second = store.create_chat("u1").await.unwrap();
        let third = store.create_chat("u1").await.unwrap();
        store
            .add_message_to_chat("u1", &first.id, NewMessage::user("bump"))
            .await
            .unwrap();
        let ids: Vec<_> = store
            .get_user_chats("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, [first.id, third.id, second.id]);
    }
}
