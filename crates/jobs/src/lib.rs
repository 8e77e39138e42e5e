use parking_lot::RwLock;
use sched_core::{ScheduleRequest, ScheduleResult, ScheduleStatus, Solver};
use std::collections::HashMap;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
pub struct JobId(pub String);

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Scheduled { result: ScheduleResult },
    Infeasible { result: ScheduleResult },
    Failed { message: String },
}

/// Run store keyed by job id. Nothing survives a restart; a "recreate" is a
/// new job for the same school with another seed.
#[derive(Clone)]
pub struct InMemJobs<S: Solver> {
    inner: std::sync::Arc<RwLock<HashMap<String, JobStatus>>>,
    solver: std::sync::Arc<S>,
}

impl<S: Solver> InMemJobs<S> {
    pub fn new(solver: S) -> Self {
        Self {
            inner: Default::default(),
            solver: std::sync::Arc::new(solver),
        }
    }

    pub fn enqueue(&self, req: ScheduleRequest) -> JobId {
        let id = Uuid::new_v4().to_string();
        self.inner.write().insert(id.clone(), JobStatus::Queued);

        let map = self.inner.clone();
        let solver = self.solver.clone();
        let id_for_task = id.clone();

        tokio::spawn(async move {
            {
                let mut w = map.write();
                w.insert(id_for_task.clone(), JobStatus::Running);
            }
            match solver.solve(req).await {
                Ok(res) => {
                    info!(job = %id_for_task, status = ?res.status, "job finished");
                    let status = if res.status == ScheduleStatus::Scheduled {
                        JobStatus::Scheduled { result: res }
                    } else {
                        JobStatus::Infeasible { result: res }
                    };
                    map.write().insert(id_for_task, status);
                }
                Err(e) => {
                    error!(?e, "job failed");
                    map.write().insert(
                        id_for_task,
                        JobStatus::Failed {
                            message: e.to_string(),
                        },
                    );
                }
            }
        });

        JobId(id)
    }

    pub fn get(&self, id: &str) -> Option<JobStatus> {
        self.inner.read().get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use types::{FailureReport, SchedulerConfig, SchoolSpec};

    struct Fixed(ScheduleStatus);

    #[async_trait]
    impl Solver for Fixed {
        async fn solve(&self, _req: ScheduleRequest) -> anyhow::Result<ScheduleResult> {
            Ok(ScheduleResult {
                status: self.0,
                timetables: vec![],
                failure: (self.0 != ScheduleStatus::Scheduled).then(|| FailureReport {
                    class_id: "c".into(),
                    subject_id: None,
                    unstaffed_subjects: vec![],
                    message: "no room".into(),
                }),
                stats: serde_json::json!({}),
            })
        }
    }

    struct Failing;

    #[async_trait]
    impl Solver for Failing {
        async fn solve(&self, _req: ScheduleRequest) -> anyhow::Result<ScheduleResult> {
            anyhow::bail!("invalid school: no classes")
        }
    }

    fn request() -> ScheduleRequest {
        ScheduleRequest {
            school: SchoolSpec::default(),
            config: SchedulerConfig::default(),
        }
    }

    async fn settle<S: Solver>(jobs: &InMemJobs<S>, id: &JobId) -> JobStatus {
        for _ in 0..1000 {
            match jobs.get(&id.0) {
                Some(JobStatus::Queued) | Some(JobStatus::Running) | None => {
                    tokio::task::yield_now().await
                }
                Some(done) => return done,
            }
        }
        panic!("job {} never finished", id.0);
    }

    #[tokio::test]
    async fn scheduled_result_is_stored() {
        let jobs = InMemJobs::new(Fixed(ScheduleStatus::Scheduled));
        let id = jobs.enqueue(request());
        assert!(matches!(settle(&jobs, &id).await, JobStatus::Scheduled { .. }));
    }

    #[tokio::test]
    async fn infeasible_and_failed_runs_are_distinguished() {
        let jobs = InMemJobs::new(Fixed(ScheduleStatus::AssignmentInfeasible));
        let id = jobs.enqueue(request());
        match settle(&jobs, &id).await {
            JobStatus::Infeasible { result } => assert!(result.failure.is_some()),
            other => panic!("unexpected {other:?}"),
        }

        let jobs = InMemJobs::new(Fixed(ScheduleStatus::SlotFillInfeasible));
        let id = jobs.enqueue(request());
        assert!(matches!(settle(&jobs, &id).await, JobStatus::Infeasible { .. }));
    }

    #[tokio::test]
    async fn solver_error_marks_job_failed() {
        let jobs = InMemJobs::new(Failing);
        let id = jobs.enqueue(request());
        match settle(&jobs, &id).await {
            JobStatus::Failed { message } => assert_eq!(message, "invalid school: no classes"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_job_is_none() {
        let jobs = InMemJobs::new(Fixed(ScheduleStatus::Scheduled));
        assert!(jobs.get("nope").is_none());
    }
}
