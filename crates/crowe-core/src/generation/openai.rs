//! Client for OpenAI-compatible `/chat/completions` endpoints.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::{JsonRequest, PromptMessage, TextGenerator};
use crate::config::GeneratorConfig;
use crate::error::{CoreError, Result};

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[derive(Clone)]
pub struct OpenAiGenerator {
    base_url: String,
    api_key: String,
    model: String,
    client: Client,
}

impl std::fmt::Debug for OpenAiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiGenerator")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OpenAiGenerator {
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        Url::parse(&config.base_url).map_err(|e| {
            CoreError::InvalidConfig(format!("generator base url {:?}: {e}", config.base_url))
        })?;
        let client = Client::builder()
            .user_agent(concat!("crowe-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CoreError::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Verify the key by listing models. Succeeds on any 2xx reply.
    pub async fn check_connection(&self) -> Result<()> {
        let resp = self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| CoreError::GenerationFailed(format!("OpenAI API unreachable: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::GenerationFailed(format!(
                "OpenAI API error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            )));
        }
        Ok(())
    }

    async fn complete(
        &self,
        messages: &[PromptMessage],
        response_format: Option<Value>,
    ) -> Result<String> {
        debug!(model = %self.model, turns = messages.len(), structured = response_format.is_some(), "requesting completion");
        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&CompletionRequest {
                model: &self.model,
                messages,
                response_format,
            })
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "completion request failed");
                CoreError::GenerationFailed(e.to_string())
            })?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| CoreError::GenerationFailed(e.to_string()))?;
        if !status.is_success() {
            let detail = api_error_message(status, &body);
            warn!(status = status.as_u16(), detail = %detail, "completion rejected");
            return Err(CoreError::GenerationFailed(detail));
        }

        let parsed: CompletionResponse = serde_json::from_str(&body)
            .map_err(|e| CoreError::GenerationFailed(format!("malformed completion: {e}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| CoreError::GenerationFailed("completion had no content".into()))
    }
}

fn api_error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(b) => format!("{}: {}", status.as_u16(), b.error.message),
        Err(_) => format!(
            "{} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or_default()
        ),
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate_text(&self, messages: &[PromptMessage]) -> Result<String> {
        self.complete(messages, None).await
    }

    async fn generate_json(&self, request: JsonRequest<'_>) -> Result<Value> {
        let format = json!({
            "type": "json_schema",
            "json_schema": {
                "name": request.name,
                "schema": request.schema,
                "strict": false,
            }
        });
        let text = self
            .complete(&[PromptMessage::user(request.prompt)], Some(format))
            .await?;
        serde_json::from_str(&text)
            .map_err(|e| CoreError::GenerationFailed(format!("reply is not JSON: {e}")))
    }
}
