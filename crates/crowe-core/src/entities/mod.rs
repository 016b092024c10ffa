//! Entity repositories.
//!
//! Each entity family has a store trait ([`ChatStore`], [`TaskStore`],
//! [`FarmStore`], [`EnvironmentStore`], [`AnalysisStore`]) implemented for
//! [`KvStore`], which owns the selected [`KvBackend`] and a [`Clock`]. Record
//! types and their patch types live in [`dao`].
//!
//! Updates are read-modify-write sequences over two backend commands and are
//! not atomic: two concurrent updates of the same record race and the later
//! write wins.

pub mod analysis;
pub mod chat;
pub mod dao;
pub mod environment;
pub mod farm;
pub mod task;

pub use dao::{
    Analysis, AnalysisKind, Chat, ChatPatch, EnvironmentalReading, Farm, FarmPatch, Message,
    NewAnalysis, NewFarm, NewMessage, NewStrain, NewTask, OptimalConditions, Priority,
    ReadingInput, Role, Strain, Task, TaskPatch, TaskStatus,
};

pub use analysis::AnalysisStore;
pub use chat::ChatStore;
pub use environment::EnvironmentStore;
pub use farm::FarmStore;
pub use task::TaskStore;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;
use uuid::Uuid;

use crate::backend::{self, BackendKind, KvBackend, MemoryBackend};
use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::error::Result;

/// Key layout shared by both backends.
pub(crate) mod keys {
    pub fn chats(user_id: &str) -> String {
        format!("chats:{user_id}")
    }

    pub fn tasks(user_id: &str) -> String {
        format!("tasks:{user_id}")
    }

    pub fn farms(user_id: &str) -> String {
        format!("farms:{user_id}")
    }

    pub fn analyses(user_id: &str) -> String {
        format!("analyses:{user_id}")
    }

    pub fn environment(farm_id: &str) -> String {
        format!("env:{farm_id}")
    }
}

/// Handle through which every repository operation runs.
///
/// Built once at startup from [`StoreConfig`] and cloned into whatever needs
/// it; clones share the backend and the clock.
#[derive(Clone)]
pub struct KvStore {
    backend: Arc<dyn KvBackend>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for KvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvStore")
            .field("backend", &self.backend.kind())
            .finish_non_exhaustive()
    }
}

impl KvStore {
    /// Select and open the backend named by `config`.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        Ok(Self::new(backend::open(config)?))
    }

    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            backend,
            clock: Arc::new(SystemClock),
        }
    }

    /// A store over a fresh, private in-process backend.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn backend(&self) -> &Arc<dyn KvBackend> {
        &self.backend
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) async fn read<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<T>> {
        match self.backend.get_field(collection, id).await? {
            Some(raw) => Ok(Some(serde_json::from_value(raw)?)),
            None => Ok(None),
        }
    }

    pub(crate) async fn write<T: Serialize>(
        &self,
        collection: &str,
        id: &str,
        record: &T,
    ) -> Result<()> {
        let raw = serde_json::to_value(record)?;
        self.backend.set_field(collection, id, raw).await
    }

    /// Every decodable record of a collection, in no particular order.
    pub(crate) async fn read_all<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        let raw = self.backend.get_all(collection).await?;
        Ok(raw
            .into_iter()
            .filter_map(|(id, value)| match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(collection, id = %id, error = %e, "skipping undecodable record");
                    None
                }
            })
            .collect())
    }

    pub(crate) async fn prepend<T: Serialize>(&self, list_key: &str, record: &T) -> Result<()> {
        let raw = serde_json::to_value(record)?;
        self.backend.push_front(list_key, raw).await
    }

    /// The first `limit` records of a list, newest first.
    pub(crate) async fn read_head<T: DeserializeOwned>(
        &self,
        list_key: &str,
        limit: usize,
    ) -> Result<Vec<T>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let end = i64::try_from(limit - 1).unwrap_or(i64::MAX);
        let raw = self.backend.read_range(list_key, 0, end).await?;
        Ok(raw
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(list_key, index, error = %e, "skipping undecodable record");
                    None
                }
            })
            .collect())
    }

    pub(crate) async fn keep_head(&self, list_key: &str, keep: usize) -> Result<()> {
        if keep == 0 {
            // `0..=-1` would mean "everything"; an inverted range empties the list.
            return self.backend.trim(list_key, 1, 0).await;
        }
        let end = i64::try_from(keep - 1).unwrap_or(i64::MAX);
        self.backend.trim(list_key, 0, end).await
    }
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}
