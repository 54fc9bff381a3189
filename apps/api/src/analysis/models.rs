//! Analysis data models and their response schema.
//!
//! Each result type declares its schema right next to its fields. Every field
//! without `#[serde(default)]` / `Option` is required, both in the schema and
//! during deserialization; a reply missing one is rejected.

use serde::{Deserialize, Serialize};

use crate::analysis::schema::{ResponseSchema, SchemaNode};

/// User-supplied input for one analysis session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInput {
    #[serde(default)]
    pub resume_text: String,
    #[serde(default)]
    pub job_description: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub role_title: String,
}

impl JobInput {
    /// Names of blank fields, in form order.
    pub fn missing_fields(&self) -> Vec<String> {
        [
            ("companyName", &self.company_name),
            ("roleTitle", &self.role_title),
            ("resumeText", &self.resume_text),
            ("jobDescription", &self.job_description),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name.to_string())
        .collect()
    }

    /// Demo input for trying the service without a résumé at hand.
    pub fn sample() -> Self {
        Self {
            company_name: "TechNova Solutions".to_string(),
            role_title: "Senior Full Stack Engineer".to_string(),
            resume_text: "John Doe\nFull Stack Developer with 8 years of experience in React, \
                Node.js, and Cloud Architecture. Led teams of 5 to deliver SaaS products used by \
                millions. Expert in TypeScript and PostgreSQL."
                .to_string(),
            job_description: "We are looking for a Senior Full Stack Engineer to join TechNova. \
                Requirements: 7+ years experience, expert React/Node knowledge, experience with \
                cloud scalability and mentoring junior devs."
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchBreakdown {
    pub skills_match: f64,
    pub experience_match: f64,
    pub education_match: f64,
    pub potential_fit: f64,
}

impl ResponseSchema for MatchBreakdown {
    fn schema() -> SchemaNode {
        SchemaNode::object()
            .required("skillsMatch", SchemaNode::Number)
            .required("experienceMatch", SchemaNode::Number)
            .required("educationMatch", SchemaNode::Number)
            .required("potentialFit", SchemaNode::Number)
    }
}

/// One sentence of evidence per breakdown category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvidence {
    pub skills: String,
    pub experience: String,
    pub education: String,
    pub potential: String,
}

impl ResponseSchema for MatchEvidence {
    fn schema() -> SchemaNode {
        SchemaNode::object()
            .required("skills", SchemaNode::String)
            .required("experience", SchemaNode::String)
            .required("education", SchemaNode::String)
            .required("potential", SchemaNode::String)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsBreakdown {
    pub keyword_match: f64,
    pub formatting: f64,
    pub readability: f64,
    pub structure: f64,
    pub warnings: Vec<String>,
}

impl ResponseSchema for AtsBreakdown {
    fn schema() -> SchemaNode {
        SchemaNode::object()
            .required("keywordMatch", SchemaNode::Number)
            .required("formatting", SchemaNode::Number)
            .required("readability", SchemaNode::Number)
            .required("structure", SchemaNode::Number)
            .required("warnings", SchemaNode::string_array())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarComponents {
    pub situation: String,
    pub task: String,
    pub action: String,
    pub result: String,
}

impl ResponseSchema for StarComponents {
    fn schema() -> SchemaNode {
        SchemaNode::object()
            .required("situation", SchemaNode::String)
            .required("task", SchemaNode::String)
            .required("action", SchemaNode::String)
            .required("result", SchemaNode::String)
    }
}

/// A rewritten résumé bullet in STAR form. `original` is the source bullet,
/// when the model chose to echo it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailoredBulletPoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
    pub improved: String,
    pub star_components: StarComponents,
}

impl ResponseSchema for TailoredBulletPoint {
    fn schema() -> SchemaNode {
        SchemaNode::object()
            .required("improved", SchemaNode::String)
            .required("starComponents", StarComponents::schema())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryInsights {
    pub range: String,
    pub market_context: String,
}

impl ResponseSchema for SalaryInsights {
    fn schema() -> SchemaNode {
        SchemaNode::object()
            .required("range", SchemaNode::String)
            .required("marketContext", SchemaNode::String)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralStrategy {
    pub target_roles: Vec<String>,
    pub networking_script: String,
    pub advice: Vec<String>,
}

impl ResponseSchema for ReferralStrategy {
    fn schema() -> SchemaNode {
        SchemaNode::object()
            .required("targetRoles", SchemaNode::string_array())
            .required("networkingScript", SchemaNode::String)
            .required("advice", SchemaNode::string_array())
    }
}

/// The full scoring report. Scores are nominally 0–100 but the backend does
/// not enforce a range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub match_score: f64,
    pub match_breakdown: MatchBreakdown,
    pub match_evidence: MatchEvidence,
    pub ats_score: f64,
    pub ats_breakdown: AtsBreakdown,
    pub match_reasoning: String,
    pub missing_skills: Vec<String>,
    pub matched_skills: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub tailored_bullet_points: Vec<TailoredBulletPoint>,
    pub salary_insights: SalaryInsights,
    pub cover_letter: String,
    pub referral_strategy: ReferralStrategy,
}

impl ResponseSchema for AnalysisResult {
    fn schema() -> SchemaNode {
        SchemaNode::object()
            .required("matchScore", SchemaNode::Number)
            .required("matchBreakdown", MatchBreakdown::schema())
            .required("matchEvidence", MatchEvidence::schema())
            .required("atsScore", SchemaNode::Number)
            .required("atsBreakdown", AtsBreakdown::schema())
            .required("matchReasoning", SchemaNode::String)
            .required("missingSkills", SchemaNode::string_array())
            .required("matchedSkills", SchemaNode::string_array())
            .required("strengths", SchemaNode::string_array())
            .required("weaknesses", SchemaNode::string_array())
            .required(
                "tailoredBulletPoints",
                SchemaNode::array(TailoredBulletPoint::schema()),
            )
            .required("salaryInsights", SalaryInsights::schema())
            .required("coverLetter", SchemaNode::String)
            .required("referralStrategy", ReferralStrategy::schema())
    }
}
