use crowe_core::assistant::StrainRecommendations;
use crowe_core::entities::Analysis;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub image_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub farm_id: Option<String>,
    pub strain_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisBody {
    pub analysis: Analysis,
}

#[derive(Debug, Serialize)]
pub struct AnalysisList {
    pub analyses: Vec<Analysis>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    #[serde(default)]
    pub farm_context: String,
    #[serde(default)]
    pub goals: String,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub recommendations: StrainRecommendations,
}

/// Outcome of `GET /api/test-openai`.
#[derive(Debug, Serialize)]
pub struct ConnectionStatus {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}
