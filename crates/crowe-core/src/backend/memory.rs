//! In-process fallback backend.
//!
//! Records are kept as [`serde_json::Value`]s, the same shape the remote
//! backend hands back after parsing its JSON text, so callers observe no
//! difference. Nothing is persisted and nothing is shared between processes.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::trace;

use super::{normalize_range, BackendKind, KvBackend};
use crate::error::Result;

#[derive(Debug, Default)]
struct Keyspace {
    hashes: HashMap<String, HashMap<String, Value>>,
    lists: HashMap<String, VecDeque<Value>>,
}

/// Memory-backed [`KvBackend`].
///
/// Cloning shares the underlying keyspace. Each operation holds the lock for
/// its whole duration and never suspends while mutating, so single commands
/// are atomic; read-modify-write sequences built on top are not.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<RwLock<Keyspace>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items currently held in `list_key`.
    pub async fn list_len(&self, list_key: &str) -> usize {
        self.inner
            .read()
            .await
            .lists
            .get(list_key)
            .map_or(0, VecDeque::len)
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::InProcess
    }

    async fn get_field(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        Ok(self
            .inner
            .read()
            .await
            .hashes
            .get(collection)
            .and_then(|h| h.get(id))
            .cloned())
    }

    async fn set_field(&self, collection: &str, id: &str, record: Value) -> Result<()> {
        trace!(collection, id, "memory hset");
        self.inner
            .write()
            .await
            .hashes
            .entry(collection.to_owned())
            .or_default()
            .insert(id.to_owned(), record);
        Ok(())
    }

    async fn get_all(&self, collection: &str) -> Result<HashMap<String, Value>> {
        Ok(self
            .inner
            .read()
            .await
            .hashes
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn push_front(&self, list_key: &str, record: Value) -> Result<()> {
        trace!(list_key, "memory lpush");
        self.inner
            .write()
            .await
            .lists
            .entry(list_key.to_owned())
            .or_default()
            .push_front(record);
        Ok(())
    }

    async fn read_range(&self, list_key: &str, start: i64, end: i64) -> Result<Vec<Value>> {
        let guard = self.inner.read().await;
        let Some(list) = guard.lists.get(list_key) else {
            return Ok(Vec::new());
        };
        Ok(match normalize_range(list.len(), start, end) {
            Some((from, to)) => list.range(from..=to).cloned().collect(),
            None => Vec::new(),
        })
    }

    async fn trim(&self, list_key: &str, start: i64, end: i64) -> Result<()> {
        let mut guard = self.inner.write().await;
        let Some(len) = guard.lists.get(list_key).map(VecDeque::len) else {
            return Ok(());
        };
        match normalize_range(len, start, end) {
            Some((from, to)) => {
                if let Some(list) = guard.lists.get_mut(list_key) {
                    list.truncate(to + 1);
                    list.drain(..from);
                }
            }
            // An empty range removes the key, as the hosted store does.
            None => {
                guard.lists.remove(list_key);
            }
        }
        Ok(())
    }
}
