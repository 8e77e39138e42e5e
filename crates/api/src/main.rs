mod error;
mod state;
mod telemetry;
pub mod routes {
    pub mod analyze;
    pub mod health;
    pub mod jobs;
    pub mod schedule;
    pub mod validate;
}

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health,
        routes::validate::validate_handler,
        routes::schedule::schedule,
        routes::jobs::status,
        routes::jobs::result,
        routes::analyze::analyze_handler,
    ),
    components(schemas(
        types::SchoolSpec, types::SubjectSpec, types::TeacherSpec, types::ClassSpec,
        types::SubjectKind, types::SchedulerConfig, types::ScheduleRequest, types::DayOfWeek,
        types::SubjectId, types::TeacherId, types::ClassId,
        types::ScheduleResult, types::ScheduleStatus, types::FailureReport,
        types::ClassTimetable, types::DayRow, types::CellView, types::StaffingEntry,
        types::ShortfallReport, types::ClassShortfall, types::SubjectAllocation, types::StaffingNeed,
        jobs::JobId, jobs::JobStatus,
        routes::validate::ValidationReport,
        routes::schedule::JobCreated,
        routes::analyze::AnalyzeIn,
    )),
    tags(
        (name = "timetable", description = "School timetable scheduling API")
    )
)]
struct ApiDoc;

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(v) => v.parse().with_context(|| format!("invalid {key}: {v}")),
        Err(_) => Ok(default),
    }
}

fn app(state: state::AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/v1/health", get(routes::health::health))
        .route("/v1/validate", post(routes::validate::validate_handler))
        .route("/v1/schedule", post(routes::schedule::schedule))
        .route("/v1/jobs/:id", get(routes::jobs::status))
        .route("/v1/jobs/:id/result", get(routes::jobs::result))
        .route("/v1/analyze", post(routes::analyze::analyze_handler))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(telemetry::stack(body_limit))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let port: u16 = env_or("TIMETABLE__SERVER__PORT", 8080)?;
    let body_limit: usize = env_or("TIMETABLE__SERVER__BODY_LIMIT", telemetry::DEFAULT_BODY_LIMIT)?;
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    let app = app(state::AppState::new_default(), body_limit);

    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
