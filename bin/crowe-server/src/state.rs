//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crowe_core::{Assistant, KvStore, OpenAiGenerator};

use crate::config::Config;
use crate::error::ServerError;

#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    pub store: KvStore,
    /// Present when a language model is configured.
    pub assistant: Option<Assistant>,
    /// The concrete OpenAI client, kept for connection checks.
    pub openai: Option<OpenAiGenerator>,
}

impl AppState {
    pub fn assistant(&self) -> Result<&Assistant, ServerError> {
        self.assistant.as_ref().ok_or_else(|| {
            ServerError::NotConfigured("OPENAI_API_KEY environment variable is required".into())
        })
    }
}
