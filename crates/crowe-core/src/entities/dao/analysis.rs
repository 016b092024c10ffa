use chrono::serde::ts_milliseconds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What an image analysis looks at.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AnalysisKind {
    Mycelium,
    Substrate,
    Fruiting,
    Contamination,
}

/// A saved image analysis, kept newest first in `analyses:{userId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AnalysisKind,
    pub image_url: String,
    /// Whatever the analysis produced; usually the model's text.
    pub results: Value,
    #[serde(with = "ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farm_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strain_id: Option<String>,
}

/// Caller-supplied part of an [`Analysis`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnalysis {
    pub user_id: String,
    pub kind: AnalysisKind,
    pub image_url: String,
    pub results: Value,
    pub farm_id: Option<String>,
    pub strain_id: Option<String>,
}
