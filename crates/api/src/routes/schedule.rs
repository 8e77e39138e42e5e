use crate::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use types::ScheduleRequest;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobCreated {
    pub job_id: String,
    pub status: &'static str,
}

/// Enqueues one scheduling run. Re-posting the same school with another
/// `config.seed` is how a timetable is recreated.
#[utoipa::path(
    post,
    path = "/v1/schedule",
    request_body = ScheduleRequest,
    responses((status = 200, description = "Job enqueued", body = JobCreated))
)]
pub async fn schedule(
    State(state): State<AppState>,
    Json(req): Json<ScheduleRequest>,
) -> Json<JobCreated> {
    let id = state.jobs.enqueue(req);
    Json(JobCreated {
        job_id: id.0,
        status: "queued",
    })
}
