//! Prompt text sent to the language model.

use crate::entities::AnalysisKind;

/// Persona and scope for every conversation and analysis.
pub const SYSTEM_PROMPT: &str = "You are Crowe Logic AI, an expert assistant specializing in mushroom cultivation, mycelium analysis, and farm management.

Your expertise includes:
- Fungal species identification and cultivation techniques
- Mycelium growth patterns and health assessment
- Substrate preparation and sterilization
- Fruiting conditions optimization
- Contamination identification and prevention
- Harvest timing and techniques
- Farm workflow optimization

Provide detailed, scientifically accurate responses while making complex mycology topics accessible.
When discussing cultivation techniques, emphasize best practices for yield and contamination prevention.
For farm management questions, focus on efficiency and sustainability.

Your tone is calm, direct, and precise, like \"Bob Ross meets an AI lab technician.\"
You should be helpful, educational, and practical in your advice.";

pub fn analysis_prompt(kind: AnalysisKind) -> &'static str {
    match kind {
        AnalysisKind::Mycelium => {
            "Analyze this mycelium image and provide a detailed assessment. Consider:
- Growth pattern (rhizomorphic vs tomentose)
- Color and appearance
- Signs of health or contamination
- Growth stage and estimated colonization percentage
- Recommendations for optimal conditions"
        }
        AnalysisKind::Substrate => {
            "Analyze this substrate image and provide a detailed assessment. Consider:
- Substrate composition and appearance
- Moisture level assessment
- Signs of contamination
- Suitability for intended mushroom variety
- Recommendations for improvement"
        }
        AnalysisKind::Fruiting => {
            "Analyze this fruiting body image and provide a detailed assessment. Consider:
- Species identification if possible
- Growth stage and development
- Quality assessment
- Harvest timing recommendations
- Potential issues or abnormalities"
        }
        AnalysisKind::Contamination => {
            "Analyze this image for contamination and provide a detailed assessment. Consider:
- Type of contamination (bacterial, mold, etc.)
- Severity and spread
- Potential causes
- Containment recommendations
- Prevention strategies for future grows"
        }
    }
}

/// User turn for an image analysis.
pub fn analysis_request(kind: AnalysisKind, image_url: &str) -> String {
    format!("{}\n\nImage URL: {image_url}", analysis_prompt(kind))
}

pub fn daily_tasks_request(farm_context: &str) -> String {
    format!(
        "Generate a daily task list for a mushroom farm with the following context: {farm_context}.\n\
         Include 3-5 prioritized tasks that should be completed today, with clear descriptions and estimated time."
    )
}

pub fn strain_recommendation_request(farm_context: &str, goals: &str) -> String {
    format!(
        "Based on the following farm setup and goals, recommend 3 mushroom strains that would be most suitable.\n\n\
         Farm context: {farm_context}\n\
         Goals: {goals}\n\n\
         Provide detailed recommendations with scientific names, difficulty levels, yield potential, timing expectations, \
         substrate preferences, optimal growing conditions, and any special notes."
    )
}
