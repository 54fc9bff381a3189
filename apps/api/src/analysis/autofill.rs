//! Detects company name and role title from a pasted job description.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::prompts::{render_autofill_prompt, AUTOFILL_MODEL};
use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{GenerationConfig, GenerationRequest, GenerativeBackend};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutofillRequest {
    #[serde(default)]
    pub job_description: String,
    /// Current form values, kept when the model detects nothing better.
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub role_title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutofillResponse {
    pub company_name: String,
    pub role_title: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectedDetails {
    #[serde(default)]
    company_name: Option<String>,
    #[serde(default)]
    role_title: Option<String>,
}

pub async fn autofill(
    backend: &dyn GenerativeBackend,
    request: AutofillRequest,
) -> Result<AutofillResponse, AppError> {
    if request.job_description.trim().is_empty() {
        return Err(AppError::validation(
            "Job Description Empty",
            "Paste the job description first so I can extract details.",
        ));
    }

    let generation = GenerationRequest {
        model: AUTOFILL_MODEL,
        prompt: render_autofill_prompt(&request.job_description),
        system: Some(JSON_ONLY_SYSTEM),
        config: GenerationConfig::json(),
    };

    let text = backend.generate(&generation).await.map_err(|e| {
        warn!("Auto-fill backend call failed: {e}");
        AppError::Autofill(e.to_string())
    })?;

    let detected = parse_detected(text.as_deref())?;
    let response = AutofillResponse {
        company_name: prefer_detected(detected.company_name, request.company_name),
        role_title: prefer_detected(detected.role_title, request.role_title),
    };
    info!(
        "Auto-fill detected company='{}', role='{}'",
        response.company_name, response.role_title
    );
    Ok(response)
}

/// No text means nothing detected; text that is not a JSON object is a failure.
fn parse_detected(text: Option<&str>) -> Result<DetectedDetails, AppError> {
    match text.map(str::trim).filter(|t| !t.is_empty()) {
        None => Ok(DetectedDetails::default()),
        Some(text) => serde_json::from_str(text).map_err(|e| {
            warn!("Auto-fill reply was not valid JSON: {e}");
            AppError::Autofill(e.to_string())
        }),
    }
}

fn prefer_detected(detected: Option<String>, previous: Option<String>) -> String {
    detected
        .filter(|value| !value.trim().is_empty())
        .or(previous)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::test_support::FakeBackend;

    fn request(jd: &str) -> AutofillRequest {
        AutofillRequest {
            job_description: jd.to_string(),
            company_name: Some("Old Co".to_string()),
            role_title: Some("Old Role".to_string()),
        }
    }

    #[tokio::test]
    async fn test_blank_job_description_is_rejected_without_a_call() {
        let backend = FakeBackend::replying("{}");
        let err = autofill(&backend, request("   \n")).await.unwrap_err();

        match err {
            AppError::Validation { message, .. } => assert_eq!(message, "Job Description Empty"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_detected_values_replace_previous_ones() {
        let backend =
            FakeBackend::replying(r#"{"companyName": "Acme", "roleTitle": "Rust Engineer"}"#);
        let response = autofill(&backend, request("Acme is hiring.")).await.unwrap();

        assert_eq!(response.company_name, "Acme");
        assert_eq!(response.role_title, "Rust Engineer");

        let sent = backend.last_request();
        assert_eq!(sent.model, AUTOFILL_MODEL);
        assert_eq!(sent.config, GenerationConfig::json());
        assert!(sent.prompt.ends_with("JD: Acme is hiring."));
    }

    #[tokio::test]
    async fn test_blank_or_missing_detections_keep_previous_values() {
        let backend = FakeBackend::replying(r#"{"companyName": "  "}"#);
        let response = autofill(&backend, request("Some JD")).await.unwrap();

        assert_eq!(response.company_name, "Old Co");
        assert_eq!(response.role_title, "Old Role");
    }

    #[tokio::test]
    async fn test_no_reply_text_keeps_previous_values() {
        let backend = FakeBackend::silent();
        let response = autofill(&backend, request("Some JD")).await.unwrap();
        assert_eq!(response.company_name, "Old Co");
    }

    #[tokio::test]
    async fn test_invalid_json_is_autofill_failure() {
        let backend = FakeBackend::replying("Acme, Rust Engineer");
        let err = autofill(&backend, request("Some JD")).await.unwrap_err();
        assert!(matches!(err, AppError::Autofill(_)));
    }

    #[tokio::test]
    async fn test_backend_error_is_autofill_failure() {
        let backend = FakeBackend::failing(500, "boom");
        let err = autofill(&backend, request("Some JD")).await.unwrap_err();
        assert!(matches!(err, AppError::Autofill(_)));
    }
}
