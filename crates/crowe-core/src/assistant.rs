//! Cultivation-assistant workflows.
//!
//! Each workflow combines repository calls with one generation call. Nothing
//! here is transactional: a generation failure after the user's message was
//! stored leaves that message in place.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use crate::entities::{
    Analysis, AnalysisKind, AnalysisStore, ChatStore, KvStore, Message, NewAnalysis, NewMessage,
    NewTask, OptimalConditions, Priority, Task, TaskStatus, TaskStore,
};
use crate::error::{CoreError, Result};
use crate::generation::prompts::{self, SYSTEM_PROMPT};
use crate::generation::{PromptMessage, TextGenerator, generate_object};

/// Result of [`Assistant::reply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub chat_id: String,
    pub message: Message,
}

/// A task as proposed by the model, before it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlannedTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub estimated_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct DailyTaskPlan {
    pub tasks: Vec<PlannedTask>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Result of [`Assistant::plan_daily_tasks`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyTasks {
    pub tasks: Vec<Task>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum YieldPotential {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StrainRecommendation {
    pub name: String,
    pub scientific_name: String,
    pub difficulty: Difficulty,
    pub yield_potential: YieldPotential,
    pub colonization_time: String,
    pub fruiting_time: String,
    pub substrates: Vec<String>,
    pub optimal_conditions: OptimalConditions,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StrainRecommendations {
    pub recommendations: Vec<StrainRecommendation>,
    pub explanation: String,
}

/// Parameters of [`Assistant::analyze_image`].
#[derive(Debug, Clone)]
pub struct ImageAnalysisRequest {
    pub user_id: String,
    pub kind: AnalysisKind,
    pub image_url: String,
    pub farm_id: Option<String>,
    pub strain_id: Option<String>,
}

#[derive(Clone)]
pub struct Assistant {
    store: KvStore,
    generator: Arc<dyn TextGenerator>,
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl Assistant {
    pub fn new(store: KvStore, generator: Arc<dyn TextGenerator>) -> Self {
        Self { store, generator }
    }

    pub fn store(&self) -> &KvStore {
        &self.store
    }

    /// Record `content` as the user's next message, generate the assistant's
    /// answer from the whole transcript and record that too. A new chat is
    /// started when `chat_id` is `None`.
    #[instrument(skip(self, content))]
    pub async fn reply(
        &self,
        user_id: &str,
        chat_id: Option<&str>,
        content: String,
    ) -> Result<ChatReply> {
        let chat_id = match chat_id {
            Some(id) => id.to_owned(),
            None => self.store.create_chat(user_id).await?.id,
        };

        self.store
            .add_message_to_chat(user_id, &chat_id, NewMessage::user(content))
            .await?;
        let chat = self
            .store
            .get_chat(user_id, &chat_id)
            .await?
            .ok_or_else(|| CoreError::ChatNotFound {
                chat_id: chat_id.clone(),
            })?;

        let mut prompt = Vec::with_capacity(chat.messages.len() + 1);
        prompt.push(PromptMessage::system(SYSTEM_PROMPT));
        prompt.extend(chat.messages.iter().map(PromptMessage::from));
        let answer = self.generator.generate_text(&prompt).await?;

        let message = self
            .store
            .add_message_to_chat(user_id, &chat_id, NewMessage::assistant(answer))
            .await?;
        Ok(ChatReply { chat_id, message })
    }

    /// Ask for today's work and store every proposed task as pending.
    #[instrument(skip(self, farm_context))]
    pub async fn plan_daily_tasks(
        &self,
        user_id: &str,
        farm_id: Option<&str>,
        farm_context: &str,
    ) -> Result<DailyTasks> {
        let plan: DailyTaskPlan = generate_object(
            self.generator.as_ref(),
            &prompts::daily_tasks_request(farm_context),
        )
        .await?;

        let mut tasks = Vec::with_capacity(plan.tasks.len());
        for planned in plan.tasks {
            let task = self
                .store
                .create_task(NewTask {
                    user_id: user_id.to_owned(),
                    title: planned.title,
                    description: planned.description,
                    status: TaskStatus::Pending,
                    priority: planned.priority,
                    due_date: None,
                    farm_id: farm_id.map(str::to_owned),
                })
                .await?;
            tasks.push(task);
        }
        info!(user_id, created = tasks.len(), "daily tasks planned");
        Ok(DailyTasks {
            tasks,
            notes: plan.notes,
        })
    }

    /// Run the kind-specific analysis prompt over an image and save the
    /// generated text as the analysis result.
    #[instrument(skip(self, request), fields(user_id = %request.user_id, kind = %request.kind))]
    pub async fn analyze_image(&self, request: ImageAnalysisRequest) -> Result<Analysis> {
        let prompt = [
            PromptMessage::system(SYSTEM_PROMPT),
            PromptMessage::user(prompts::analysis_request(request.kind, &request.image_url)),
        ];
        let text = self.generator.generate_text(&prompt).await?;
        self.store
            .save_analysis(NewAnalysis {
                user_id: request.user_id,
                kind: request.kind,
                image_url: request.image_url,
                results: Value::String(text),
                farm_id: request.farm_id,
                strain_id: request.strain_id,
            })
            .await
    }

    /// Structured strain suggestions. Nothing is persisted.
    pub async fn recommend_strains(
        &self,
        farm_context: &str,
        goals: &str,
    ) -> Result<StrainRecommendations> {
        generate_object(
            self.generator.as_ref(),
            &prompts::strain_recommendation_request(farm_context, goals),
        )
        .await
    }
}
