use axum::{extract::State, Json};
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::analysis::autofill::{autofill, AutofillRequest, AutofillResponse};
use crate::analysis::builder::build_request;
use crate::analysis::client::run_analysis;
use crate::analysis::models::{AnalysisResult, JobInput};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/v1/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(input): Json<JobInput>,
) -> Result<Json<AnalysisResult>, AppError> {
    let missing = input.missing_fields();
    if !missing.is_empty() {
        return Err(AppError::incomplete_form(missing));
    }

    let _permit = state.analysis_flight.try_begin()?;

    let span = info_span!("analysis", id = %Uuid::new_v4());
    async move {
        info!(
            "Analyzing fit for '{}' at '{}'",
            input.role_title, input.company_name
        );
        let request = build_request(&input);
        let result = run_analysis(state.backend.as_ref(), &request)
            .await
            .map_err(|err| {
                error!("Analysis failed: {err}");
                AppError::from(err)
            })?;
        Ok::<_, AppError>(Json(result))
    }
    .instrument(span)
    .await
}

/// POST /api/v1/autofill
pub async fn handle_autofill(
    State(state): State<AppState>,
    Json(req): Json<AutofillRequest>,
) -> Result<Json<AutofillResponse>, AppError> {
    let _permit = state.autofill_flight.try_begin()?;
    let response = autofill(state.backend.as_ref(), req).await?;
    Ok(Json(response))
}

/// GET /api/v1/sample
pub async fn handle_sample() -> Json<JobInput> {
    Json(JobInput::sample())
}
