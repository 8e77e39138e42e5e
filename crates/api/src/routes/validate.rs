use axum::Json;
use sched_core::{validate, ValidationError};
use serde::Serialize;
use types::ScheduleRequest;

#[derive(Serialize, utoipa::ToSchema)]
pub struct ValidationReport {
    pub ok: bool,
    pub errors: Vec<String>,
}

impl From<Result<(), ValidationError>> for ValidationReport {
    fn from(res: Result<(), ValidationError>) -> Self {
        match res {
            Ok(()) => Self { ok: true, errors: vec![] },
            Err(ValidationError::Msg(msg)) => Self {
                ok: false,
                errors: msg
                    .split(';')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
        }
    }
}

#[utoipa::path(
    post,
    path = "/v1/validate",
    request_body = ScheduleRequest,
    responses(
        (status = 200, description = "Structural checks on the school and config", body = ValidationReport)
    )
)]
pub async fn validate_handler(Json(req): Json<ScheduleRequest>) -> Json<ValidationReport> {
    Json(validate(&req.school, &req.config).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_joined_messages() {
        let report: ValidationReport =
            Err(ValidationError::Msg("periodsPerDay must be > 0; duplicate class id 7a".into())).into();
        assert!(!report.ok);
        assert_eq!(report.errors, vec!["periodsPerDay must be > 0", "duplicate class id 7a"]);
    }
}
