// All LLM prompt text for the Analysis module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::analysis::models::JobInput;

/// Model for the full fit analysis.
pub const ANALYSIS_MODEL: &str = "gemini-3-pro-preview";
/// Cheaper model for detecting company and role from a job description.
pub const AUTOFILL_MODEL: &str = "gemini-3-flash-preview";

/// The ten tasks the model performs, in the order it is asked to perform them.
pub const ANALYSIS_TASKS: [&str; 10] = [
    "Calculate a \"Match Score\" (Overall Fit) and an \"ATS Compatibility Score\".",
    "Provide a \"Match Breakdown\" (0-100) for Skills, Experience, Education, and Potential Fit.",
    "Provide \"Match Evidence\": For each breakdown category, provide 1 sentence of direct evidence from the resume that justifies the score.",
    "Provide an \"ATS Breakdown\" (0-100) for Keywords, Formatting, Readability, and Structure.",
    "List specific ATS warnings (e.g., \"Multi-column layout detected\", \"Missing contact header\").",
    "Identify matched skills and missing critical keywords.",
    "Generate 3-4 high-impact, tailored resume bullet points using the STAR format.",
    "Provide estimated market salary insights.",
    "Write a persuasive, metric-driven cover letter.",
    "Provide a referral strategy with a networking script.",
];

/// Renders the analysis prompt. User text is inserted in a single pass, so
/// brace sequences inside a résumé are never treated as placeholders.
pub fn render_analysis_prompt(input: &JobInput) -> String {
    let tasks: String = ANALYSIS_TASKS
        .iter()
        .enumerate()
        .map(|(i, task)| format!("{}. {task}\n", i + 1))
        .collect();

    format!(
        "As an elite Technical Recruiter and Career Coach, perform a precise, deterministic analysis.

CRITICAL: Your goal is absolute consistency. Analyze the relationship between the resume and the job description with mathematical rigor.

COMPANY: {company}
ROLE: {role}

JOB DESCRIPTION:
{job_description}

RESUME:
{resume}

TASKS:
{tasks}
NOTE: Provide your answer ONLY in the requested JSON format.",
        company = input.company_name,
        role = input.role_title,
        job_description = input.job_description,
        resume = input.resume_text,
    )
}

/// Renders the auto-fill prompt for a pasted job description.
pub fn render_autofill_prompt(job_description: &str) -> String {
    format!(
        "Extract the company name and role title from this job description. \
Return only valid JSON: {{\"companyName\": \"...\", \"roleTitle\": \"...\"}}\n\nJD: {job_description}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_numbers_all_ten_tasks() {
        let prompt = render_analysis_prompt(&JobInput::sample());
        for n in 1..=10 {
            assert!(prompt.contains(&format!("\n{n}. ")), "task {n} missing");
        }
        assert!(!prompt.contains("\n11. "));
        assert!(prompt.ends_with("ONLY in the requested JSON format."));
    }

    #[test]
    fn test_placeholder_like_user_text_is_kept_verbatim() {
        let input = JobInput {
            resume_text: "Built {company} templating; used {{braces}} and {role}".into(),
            job_description: "JD".into(),
            company_name: "Acme".into(),
            role_title: "Engineer".into(),
        };
        let prompt = render_analysis_prompt(&input);
        assert!(prompt.contains("Built {company} templating; used {{braces}} and {role}"));
        assert!(prompt.contains("COMPANY: Acme\nROLE: Engineer"));
    }

    #[test]
    fn test_autofill_prompt_embeds_job_description() {
        let prompt = render_autofill_prompt("Acme is hiring a Rust Engineer.");
        assert!(prompt.contains(r#"{"companyName": "...", "roleTitle": "..."}"#));
        assert!(prompt.ends_with("JD: Acme is hiring a Rust Engineer."));
    }
}
