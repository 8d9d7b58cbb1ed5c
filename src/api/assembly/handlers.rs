use axum::extract::State;
use axum::Json;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::assembly::{self, GenerationOptions, TosPlan};
use crate::core::state::AppState;
use crate::core::time::now_rfc3339;
use crate::schemas::generation::{
    AnalyzeVersionsRequest, AnalyzeVersionsResponse, GenerateTestRequest, GenerateTestResponse,
    SelectionRequest, SelectionResponse, TosRequirementsResponse,
};

use super::helpers;

pub(super) async fn validate_selection(
    State(state): State<AppState>,
    Json(payload): Json<SelectionRequest>,
) -> Result<Json<assembly::RequirementCheck>, ApiError> {
    payload.validate()?;
    helpers::check_pool(state.settings(), &payload.pool)?;

    Ok(Json(assembly::validate_requirements(&payload.pool, &payload.requirements)))
}

pub(super) async fn select_questions(
    State(state): State<AppState>,
    Json(payload): Json<SelectionRequest>,
) -> Result<Json<SelectionResponse>, ApiError> {
    payload.validate()?;
    helpers::check_pool(state.settings(), &payload.pool)?;

    let outcome = assembly::select_detailed(&payload.pool, &payload.requirements);
    Ok(Json(SelectionResponse { questions: outcome.questions, shortfalls: outcome.shortfalls }))
}

pub(super) async fn tos_requirements(
    Json(plan): Json<TosPlan>,
) -> Result<Json<TosRequirementsResponse>, ApiError> {
    let requirements =
        assembly::build_requirements(&plan).map_err(|err| ApiError::BadRequest(err.to_string()))?;
    Ok(Json(TosRequirementsResponse { requirements }))
}

pub(super) async fn generate_test(
    State(state): State<AppState>,
    Json(payload): Json<GenerateTestRequest>,
) -> Result<Json<GenerateTestResponse>, ApiError> {
    payload.validate()?;
    helpers::check_pool(state.settings(), &payload.pool)?;

    if payload.strict && !payload.requirements.is_empty() {
        let check = assembly::validate_requirements(&payload.pool, &payload.requirements);
        if !check.valid {
            return Err(ApiError::UnprocessableEntity(check.issues.join("; ")));
        }
    }

    let generation = state.settings().generation();
    let seed = payload.options.seed.clone().unwrap_or_else(helpers::random_seed);
    let options = GenerationOptions {
        shuffle_questions: payload.options.shuffle_questions,
        shuffle_choices: payload.options.shuffle_choices,
        version_count: payload.options.version_count.unwrap_or(generation.default_version_count),
        seed: seed.clone(),
        placeholders: payload.options.placeholders(generation.placeholders()),
    };

    let title = payload.title.trim().to_string();
    let report = assembly::generate(&payload.pool, &payload.requirements, &options, &title);

    Ok(Json(GenerateTestResponse {
        generation_id: Uuid::new_v4(),
        generated_at: now_rfc3339(),
        title,
        seed,
        report,
    }))
}

pub(super) async fn analyze_versions(
    Json(payload): Json<AnalyzeVersionsRequest>,
) -> Result<Json<AnalyzeVersionsResponse>, ApiError> {
    payload.validate()?;

    Ok(Json(AnalyzeVersionsResponse {
        balance: assembly::validate_balance(&payload.versions),
        differences: assembly::analyze_differences(&payload.versions),
    }))
}
