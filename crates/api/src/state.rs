use std::sync::Arc;
use jobs::InMemJobs;
use solver_backtrack::BacktrackSolver;

#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<InMemJobs<BacktrackSolver>>,
}

impl AppState {
    pub fn new_default() -> Self {
        let jobs = InMemJobs::new(BacktrackSolver::new());
        Self { jobs: Arc::new(jobs) }
    }
}
