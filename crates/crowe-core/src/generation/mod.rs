//! Language-model collaborator.
//!
//! The assistant workflows only see [`TextGenerator`]; [`OpenAiGenerator`]
//! is the production implementation. Structured output goes through
//! [`generate_object`], which derives a JSON schema from the target type and
//! decodes the reply into it.

pub mod openai;
pub mod prompts;

pub use openai::OpenAiGenerator;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::{Message, Role};
use crate::error::{CoreError, Result};

/// One turn of model input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

impl From<&Message> for PromptMessage {
    fn from(m: &Message) -> Self {
        Self {
            role: m.role,
            content: m.content.clone(),
        }
    }
}

/// A structured-output request: the reply must be a JSON document matching
/// `schema`.
#[derive(Debug, Clone)]
pub struct JsonRequest<'a> {
    /// Short identifier for the schema, e.g. `DailyTaskPlan`.
    pub name: &'a str,
    pub schema: Value,
    pub prompt: &'a str,
}

#[async_trait]
pub trait TextGenerator: Send + Sync + 'static {
    /// Free-form completion of `messages` (system prompt first).
    async fn generate_text(&self, messages: &[PromptMessage]) -> Result<String>;

    /// Structured completion; returns the parsed JSON document.
    async fn generate_json(&self, request: JsonRequest<'_>) -> Result<Value>;
}

/// Ask `generator` for a `T`, using `T`'s JSON schema to constrain the
/// output. A reply that does not decode into `T` is a
/// [`CoreError::GenerationFailed`].
pub async fn generate_object<T>(generator: &dyn TextGenerator, prompt: &str) -> Result<T>
where
    T: DeserializeOwned + JsonSchema,
{
    let name = T::schema_name();
    let schema = serde_json::to_value(schemars::schema_for!(T))?;
    let raw = generator
        .generate_json(JsonRequest {
            name: &name,
            schema,
            prompt,
        })
        .await?;
    serde_json::from_value(raw)
        .map_err(|e| CoreError::GenerationFailed(format!("reply does not match {name}: {e}")))
}
