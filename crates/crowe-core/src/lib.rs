//! Persistence and assistant workflows for the Crowe Logic cultivation
//! assistant.
//!
//! Records live in a key-value store: a hosted REST service when
//! `KV_REST_API_URL`/`KV_REST_API_TOKEN` are configured, otherwise a private
//! in-process map. Repository operations are the store traits in
//! [`entities`], all implemented for [`KvStore`].

pub mod assistant;
pub mod backend;
pub mod clock;
pub mod config;
pub mod entities;
pub mod error;
pub mod generation;

pub use assistant::Assistant;
pub use backend::{BackendKind, KvBackend};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{BackendSelection, GeneratorConfig, StoreConfig};
pub use entities::KvStore;
pub use error::{CoreError, Result};
pub use generation::{OpenAiGenerator, TextGenerator};
