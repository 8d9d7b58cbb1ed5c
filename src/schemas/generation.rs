use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::assembly::{
    AnswerPlaceholders, BalanceReport, GenerationReport, Question, SelectionRequirement, Shortfall,
    TestForm, VersionDifferences,
};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SelectionRequest {
    pub(crate) pool: Vec<Question>,
    #[validate(length(max = 500, message = "requirements must contain at most 500 rows"))]
    pub(crate) requirements: Vec<SelectionRequirement>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SelectionResponse {
    pub(crate) questions: Vec<Question>,
    pub(crate) shortfalls: Vec<Shortfall>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TosRequirementsResponse {
    pub(crate) requirements: Vec<SelectionRequirement>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct GenerationOptionsPayload {
    #[serde(default = "default_true", alias = "shuffleQuestions")]
    pub(crate) shuffle_questions: bool,
    #[serde(default = "default_true", alias = "shuffleChoices")]
    pub(crate) shuffle_choices: bool,
    #[serde(default, alias = "versionCount", alias = "numberOfVersions")]
    #[validate(range(min = 1, max = 6, message = "version_count must be in range 1..6"))]
    pub(crate) version_count: Option<usize>,
    #[serde(default)]
    #[validate(length(min = 1, max = 128, message = "seed must contain 1..128 characters"))]
    pub(crate) seed: Option<String>,
    #[serde(default, alias = "ungradedPlaceholder")]
    pub(crate) ungraded_placeholder: Option<String>,
    #[serde(default, alias = "rubricPlaceholder")]
    pub(crate) rubric_placeholder: Option<String>,
}

impl Default for GenerationOptionsPayload {
    fn default() -> Self {
        Self {
            shuffle_questions: true,
            shuffle_choices: true,
            version_count: None,
            seed: None,
            ungraded_placeholder: None,
            rubric_placeholder: None,
        }
    }
}

impl GenerationOptionsPayload {
    /// Request values win; configured defaults fill the rest.
    pub(crate) fn placeholders(&self, defaults: AnswerPlaceholders) -> AnswerPlaceholders {
        AnswerPlaceholders {
            rubric: self.rubric_placeholder.clone().unwrap_or(defaults.rubric),
            ungraded: self.ungraded_placeholder.clone().unwrap_or(defaults.ungraded),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct GenerateTestRequest {
    #[validate(length(min = 1, max = 200, message = "title must contain 1..200 characters"))]
    pub(crate) title: String,
    pub(crate) pool: Vec<Question>,
    #[serde(default)]
    #[validate(length(max = 500, message = "requirements must contain at most 500 rows"))]
    pub(crate) requirements: Vec<SelectionRequirement>,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) options: GenerationOptionsPayload,
    /// Refuse to build forms when any requirement is under-supplied.
    #[serde(default)]
    pub(crate) strict: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerateTestResponse {
    pub(crate) generation_id: Uuid,
    pub(crate) generated_at: String,
    pub(crate) title: String,
    pub(crate) seed: String,
    #[serde(flatten)]
    pub(crate) report: GenerationReport,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AnalyzeVersionsRequest {
    #[validate(length(max = 6, message = "at most 6 versions can be analyzed"))]
    pub(crate) versions: Vec<TestForm>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnalyzeVersionsResponse {
    pub(crate) balance: BalanceReport,
    pub(crate) differences: VersionDifferences,
}

fn default_true() -> bool {
    true
}
