use axum::{extract::{Path, State}, Json};
use crate::{error::ApiError, state::AppState};
use types::ScheduleResult;

#[utoipa::path(
    get,
    path = "/v1/jobs/{id}",
    params(("id" = String, Path, description = "Job ID")),
    responses((status = 200, description = "Job status", body = jobs::JobStatus))
)]
pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    Ok(Json(match state.jobs.get(&id) {
        None => serde_json::json!({"status": "not_found"}),
        Some(s) => serde_json::to_value(s)?,
    }))
}

#[utoipa::path(
    get,
    path = "/v1/jobs/{id}/result",
    params(("id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Schedule result once the run has finished", body = ScheduleResult)
    )
)]
pub async fn result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    Ok(Json(match state.jobs.get(&id) {
        Some(jobs::JobStatus::Scheduled { result } | jobs::JobStatus::Infeasible { result }) => {
            serde_json::to_value(result)?
        }
        Some(jobs::JobStatus::Failed { message }) => {
            serde_json::json!({"status": "failed", "message": message})
        }
        Some(_) => serde_json::json!({"status": "not_ready"}),
        None => serde_json::json!({"status": "not_found"}),
    }))
}
