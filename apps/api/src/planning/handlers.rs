//! Axum route handlers for the Career Plan API.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::planning::assessment::UserAssessment;
use crate::planning::export::{export, plan_file_name, XLSX_CONTENT_TYPE};
use crate::planning::gap_scorer::PlanEntry;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct JobsQuery {
    pub area: String,
}

#[derive(Debug, Serialize)]
pub struct CompetencyView {
    pub label: String,
    pub name: String,
    pub behaviors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub plan_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub person: String,
    pub area: String,
    pub current_job: String,
    pub current_level: f64,
    pub scorer_backend: String,
    pub results: Vec<PlanEntry>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/areas
pub async fn handle_list_areas(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.reference.areas())
}

/// GET /api/v1/jobs?area=
///
/// Only jobs with a derivable level are offered, so every selectable job can be ranked.
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobsQuery>,
) -> Json<Vec<String>> {
    Json(state.reference.jobs_in_area(&params.area))
}

/// GET /api/v1/competencies
///
/// The form layout: competencies in table order with the behaviors to rate under each.
pub async fn handle_list_competencies(State(state): State<AppState>) -> Json<Vec<CompetencyView>> {
    let competencies = state
        .reference
        .competencies()
        .iter()
        .map(|c| CompetencyView {
            label: c.label.clone(),
            name: c.name.clone(),
            behaviors: state.taxonomy.behaviors_for(&c.label).to_vec(),
        })
        .collect();
    Json(competencies)
}

/// POST /api/v1/plans
///
/// Validates the self-assessment and returns the ranked career plan.
/// Bodies that do not deserialize (negative or fractional weights, ratings over 255)
/// are reported as validation errors too.
pub async fn handle_generate_plan(
    State(state): State<AppState>,
    payload: Result<Json<UserAssessment>, JsonRejection>,
) -> Result<Json<PlanResponse>, AppError> {
    let Json(assessment) = payload?;
    Ok(Json(build_plan(&state, &assessment)?))
}

/// POST /api/v1/plans/export
///
/// Same input as `/plans`; responds with the plan as an xlsx download.
pub async fn handle_export_plan(
    State(state): State<AppState>,
    payload: Result<Json<UserAssessment>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(assessment) = payload?;
    let plan = build_plan(&state, &assessment)?;
    let sheet_name = &state.config.plan_sheet_name;
    let bytes = export(&plan.results, sheet_name)?;
    let file_name = plan_file_name(sheet_name, &plan.person);

    info!(plan_id = %plan.plan_id, %file_name, "Exported career plan");

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        Bytes::from(bytes),
    )
        .into_response())
}

/// Validate → score. Each call owns its assessment and result; the shared state is read-only.
fn build_plan(state: &AppState, assessment: &UserAssessment) -> Result<PlanResponse, AppError> {
    assessment.validate(&state.reference)?;

    let results = state.scorer.score(
        &state.reference,
        &state.taxonomy,
        &assessment.current_job,
        &assessment.normalized_weights(),
        &assessment.behavior_ratings,
    )?;

    let current_level = state
        .reference
        .find(&assessment.current_job)
        .and_then(|row| row.level)
        .ok_or_else(|| {
            AppError::NotFound(format!("Job '{}' has no rankable level", assessment.current_job))
        })?;

    let plan_id = Uuid::new_v4();
    info!(
        %plan_id,
        current_job = %assessment.current_job,
        candidates = results.len(),
        "Generated career plan"
    );

    Ok(PlanResponse {
        plan_id,
        generated_at: Utc::now(),
        person: assessment.name.trim().to_string(),
        area: assessment.area.clone(),
        current_job: assessment.current_job.clone(),
        current_level,
        scorer_backend: state.scorer.backend().to_string(),
        results,
    })
}
