//! Error taxonomy shared by the backends, the repositories and the
//! assistant workflows.

use thiserror::Error;

/// All errors surfaced by `crowe-core`.
///
/// Nothing in this crate retries; every variant propagates to the caller
/// as-is.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The remote key-value service could not be reached, rejected the
    /// credentials, or refused a command.
    #[error("backend unavailable: {reason}")]
    BackendUnavailable { reason: String },

    /// A message was appended to a chat that does not exist.
    #[error("chat not found: {chat_id}")]
    ChatNotFound { chat_id: String },

    /// A strain or reading was attached to a farm that does not exist.
    #[error("farm not found: {farm_id}")]
    FarmNotFound { farm_id: String },

    /// The language-model collaborator failed or returned unusable output.
    #[error("generation failed: {0}")]
    GenerationFailed(String),

    /// A record could not be encoded to, or decoded from, JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Connection parameters were present but unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CoreError {
    pub(crate) fn unavailable(reason: impl Into<String>) -> Self {
        CoreError::BackendUnavailable {
            reason: reason.into(),
        }
    }

    /// `true` for the not-found family (`ChatNotFound`, `FarmNotFound`).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::ChatNotFound { .. } | CoreError::FarmNotFound { .. }
        )
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        CoreError::unavailable(e.to_string())
    }
}

pub type Result<T, E = CoreError> = std::result::Result<T, E>;
