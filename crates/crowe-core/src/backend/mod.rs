//! Storage backend abstraction.
//!
//! [`KvBackend`] is the minimal capability set the repositories need: hashes
//! of `id → record` ("collections") and ordered lists. Two implementations
//! exist:
//!
//! - [`remote::RemoteBackend`] talks to a hosted key-value service over its
//!   REST interface and stores every record as JSON text.
//! - [`memory::MemoryBackend`] keeps records in process memory.
//!
//! Which one serves the process is decided once by [`open`] from a
//! [`StoreConfig`]; nothing above this module can tell them apart.

pub mod memory;
pub mod remote;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::config::{BackendSelection, StoreConfig};
use crate::error::Result;

pub use memory::MemoryBackend;
pub use remote::RemoteBackend;

/// Identifies the backend behind a [`KvBackend`] handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum BackendKind {
    Remote,
    InProcess,
}

/// Capability contract over a hash-of-hashes / list keyspace.
///
/// Records cross this boundary as [`serde_json::Value`]; how they are laid
/// out physically is up to the implementation. List ranges use the hosted
/// store's conventions (see [`normalize_range`]).
#[async_trait]
pub trait KvBackend: Send + Sync + 'static {
    fn kind(&self) -> BackendKind;

    /// Read one record from a collection.
    async fn get_field(&self, collection: &str, id: &str) -> Result<Option<Value>>;

    /// Upsert one record. Replaces the whole record; no field merging.
    async fn set_field(&self, collection: &str, id: &str, record: Value) -> Result<()>;

    /// Every record in a collection. Empty when the collection does not exist.
    async fn get_all(&self, collection: &str) -> Result<HashMap<String, Value>>;

    /// Prepend a record to a list.
    async fn push_front(&self, list_key: &str, record: Value) -> Result<()>;

    /// Records between `start` and `end`, both inclusive.
    async fn read_range(&self, list_key: &str, start: i64, end: i64) -> Result<Vec<Value>>;

    /// Keep only the records between `start` and `end`, both inclusive.
    async fn trim(&self, list_key: &str, start: i64, end: i64) -> Result<()>;
}

/// Build the backend named by `config`.
pub fn open(config: &StoreConfig) -> Result<Arc<dyn KvBackend>> {
    match &config.backend {
        BackendSelection::Remote { url, token } => {
            let backend = RemoteBackend::new(url, token)?;
            info!(backend = %BackendKind::Remote, url = %url, "storage backend selected");
            Ok(Arc::new(backend))
        }
        BackendSelection::InProcess => {
            info!(
                backend = %BackendKind::InProcess,
                "storage backend selected; records will not survive a restart"
            );
            Ok(Arc::new(MemoryBackend::new()))
        }
    }
}

/// Resolve an inclusive `[start, end]` range against a list of `len` items.
///
/// Negative indices count from the tail (`-1` is the last item), bounds past
/// either end are clamped. Returns `None` when the range selects nothing.
pub fn normalize_range(len: usize, start: i64, end: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    let mut start = if start < 0 { start + len } else { start };
    let mut end = if end < 0 { end + len } else { end };
    if start < 0 {
        start = 0;
    }
    if start > end || start >= len {
        return None;
    }
    if end >= len {
        end = len - 1;
    }
    Some((start as usize, end as usize))
}
