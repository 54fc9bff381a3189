use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::client::AnalysisError;
use crate::extraction::{ExtractError, MAX_UPLOAD_MB};

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every variant renders as `{"error": {"code", "message", "detail", "fields"?}}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {message} ({detail})")]
    Validation {
        message: String,
        detail: String,
        fields: Vec<String>,
    },

    #[error("Empty document: {0}")]
    EmptyDocument(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Analysis failed: {0}")]
    Analysis(String),

    #[error("Auto-fill failed: {0}")]
    Autofill(String),

    #[error("Operation already in progress: {0}")]
    Busy(&'static str),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>, detail: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            detail: detail.into(),
            fields: Vec::new(),
        }
    }

    pub fn incomplete_form(fields: Vec<String>) -> Self {
        AppError::Validation {
            message: "Incomplete Form".to_string(),
            detail: "Some required fields are missing.".to_string(),
            fields,
        }
    }
}

impl From<ExtractError> for AppError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::FileTooLarge { .. } => AppError::validation(
                "File too large",
                format!("Please upload a file smaller than {MAX_UPLOAD_MB}MB."),
            ),
            ExtractError::UnsupportedType(_) => AppError::validation(
                "Unsupported file format",
                "Please upload a PDF, DOCX, or TXT file.",
            ),
            ExtractError::EmptyDocument(msg) => AppError::EmptyDocument(msg),
            failed @ ExtractError::Failed { .. } => AppError::Extraction(failed.to_string()),
        }
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        AppError::Analysis(err.to_string())
    }
}

const ANALYSIS_FAILED_MESSAGE: &str = "The AI was unable to complete the analysis.";
const ANALYSIS_FAILED_DETAIL: &str = "This might be due to content filters or connection issues.";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, detail, fields) = match self {
            AppError::Validation {
                message,
                detail,
                fields,
            } => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                message,
                detail,
                fields,
            ),
            AppError::EmptyDocument(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EMPTY_DOCUMENT",
                "Extraction failed".to_string(),
                format!("{msg} Try pasting the résumé text manually."),
                Vec::new(),
            ),
            AppError::Extraction(msg) => {
                tracing::warn!("Extraction error: {msg}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "EXTRACTION_FAILED",
                    "Extraction failed".to_string(),
                    msg,
                    Vec::new(),
                )
            }
            // The cause is logged by the analysis handler, inside its span.
            AppError::Analysis(_) => (
                StatusCode::BAD_GATEWAY,
                "ANALYSIS_FAILED",
                ANALYSIS_FAILED_MESSAGE.to_string(),
                ANALYSIS_FAILED_DETAIL.to_string(),
                Vec::new(),
            ),
            AppError::Autofill(cause) => {
                tracing::error!("Auto-fill error: {cause}");
                (
                    StatusCode::BAD_GATEWAY,
                    "AUTOFILL_FAILED",
                    "Auto-fill failed".to_string(),
                    "Could not detect details.".to_string(),
                    Vec::new(),
                )
            }
            AppError::Busy(operation) => (
                StatusCode::CONFLICT,
                "OPERATION_IN_PROGRESS",
                format!("An {operation} is already in progress"),
                "Wait for it to finish before starting another.".to_string(),
                Vec::new(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    String::new(),
                    Vec::new(),
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message,
            "detail": detail,
        });
        if !fields.is_empty() {
            error["fields"] = json!(fields);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
