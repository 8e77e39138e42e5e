use axum::Json;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use sched_core::analysis::analyze;
use sched_core::validate;
use types::{ClassTimetable, SchedulerConfig, SchoolSpec, ShortfallReport};

#[derive(Deserialize, ToSchema)]
pub struct AnalyzeIn {
    pub school: SchoolSpec,
    #[serde(default)]
    pub config: SchedulerConfig,
    pub timetables: Vec<ClassTimetable>,
}

#[utoipa::path(
    post,
    path = "/v1/analyze",
    request_body = AnalyzeIn,
    responses(
        (status = 200, description = "Free periods and staffing shortfall of a finished schedule", body = ShortfallReport),
        (status = 400, description = "School or config failed validation")
    )
)]
pub async fn analyze_handler(Json(input): Json<AnalyzeIn>) -> Result<Json<ShortfallReport>, ApiError> {
    validate(&input.school, &input.config).map_err(|e| ApiError::bad_request(e.to_string()))?;
    Ok(Json(analyze(&input.school, &input.config, &input.timetables)))
}
