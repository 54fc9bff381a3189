//! Analysis Client — one deterministic backend call per analysis.
//!
//! No retries and no partial recovery: an empty or unparseable reply fails the
//! whole call.

use thiserror::Error;
use tracing::info;

use crate::analysis::builder::AnalysisRequest;
use crate::analysis::models::AnalysisResult;
use crate::analysis::prompts::ANALYSIS_MODEL;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{GenerationConfig, GenerationRequest, GenerativeBackend, LlmError};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Empty response from AI")]
    EmptyResponse,

    #[error("Malformed AI response: {0}")]
    MalformedResponse(#[source] serde_json::Error),

    #[error("Generative backend error: {0}")]
    Backend(#[from] LlmError),
}

/// Sends the prompt with zero temperature and a fixed seed, constrained to the
/// request's schema, and parses the reply into an `AnalysisResult`.
pub async fn run_analysis(
    backend: &dyn GenerativeBackend,
    request: &AnalysisRequest,
) -> Result<AnalysisResult, AnalysisError> {
    let generation = GenerationRequest {
        model: ANALYSIS_MODEL,
        prompt: request.prompt.clone(),
        system: Some(JSON_ONLY_SYSTEM),
        config: GenerationConfig::deterministic_json(request.schema.to_value()),
    };

    let text = backend.generate(&generation).await?;
    let result = parse_analysis_reply(text.as_deref())?;
    info!(
        "Analysis complete: match_score={}, ats_score={}",
        result.match_score, result.ats_score
    );
    Ok(result)
}

/// Parses the trimmed reply text. Absent or blank text is `EmptyResponse`;
/// anything that does not deserialize into a full result is `MalformedResponse`.
pub fn parse_analysis_reply(text: Option<&str>) -> Result<AnalysisResult, AnalysisError> {
    let text = text
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AnalysisError::EmptyResponse)?;
    serde_json::from_str(text).map_err(AnalysisError::MalformedResponse)
}
