//! Analysis Request Builder — turns a `JobInput` into prompt + response schema.
//!
//! Pure: no validation, no I/O. Callers check `JobInput::missing_fields` first.

use crate::analysis::models::{AnalysisResult, JobInput};
use crate::analysis::prompts::render_analysis_prompt;
use crate::analysis::schema::{ResponseSchema, SchemaNode};

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub prompt: String,
    pub schema: SchemaNode,
}

pub fn build_request(input: &JobInput) -> AnalysisRequest {
    AnalysisRequest {
        prompt: render_analysis_prompt(input),
        schema: AnalysisResult::schema(),
    }
}
