pub mod assign;
pub mod fill;
pub mod tracker;

use async_trait::async_trait;
use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sched_core::grid::{render, ClassPlan};
use sched_core::school::School;
use sched_core::{ScheduleError, ScheduleRequest, ScheduleResult, ScheduleStatus, Solver};
use tracing::{info, warn};
use types::SchedulerConfig;

use crate::assign::assign_teachers;
use crate::fill::fill_class;
use crate::tracker::Availability;

/// A complete run: one plan per class in school order.
#[derive(Clone, Debug)]
pub struct Schedule {
    pub plans: Vec<ClassPlan>,
    pub iterations: Vec<u64>,
}

/// Staffs every class, then fills the classes' weeks one after another
/// against a single shared availability tracker. Stops at the first class
/// that cannot be filled.
pub fn schedule<R: Rng + ?Sized>(
    school: &School,
    cfg: &SchedulerConfig,
    rng: &mut R,
) -> Result<Schedule, ScheduleError> {
    let staffing = assign_teachers(school, cfg.randomize_order, rng)?;

    let mut tracker = Availability::new(school.teacher_count(), cfg);
    let mut plans = Vec::with_capacity(school.class_count());
    let mut iterations = Vec::with_capacity(school.class_count());

    for ((cidx, class), staffing) in school.classes().zip(staffing) {
        info!(class = %class.id, subjects = class.subjects.len(), "filling week");
        let out = fill_class(school, cfg, cidx, &staffing, &mut tracker, rng)?;
        iterations.push(out.iterations);
        plans.push(ClassPlan {
            class: cidx,
            staffing,
            grid: out.grid,
        });
    }

    info!(classes = plans.len(), "schedule complete");
    Ok(Schedule { plans, iterations })
}

/// Runs [`schedule`] and folds the outcome into the wire result.
pub fn run<R: Rng + ?Sized>(school: &School, cfg: &SchedulerConfig, rng: &mut R) -> ScheduleResult {
    match schedule(school, cfg, rng) {
        Ok(done) => {
            let per_class: serde_json::Map<String, serde_json::Value> = done
                .plans
                .iter()
                .zip(&done.iterations)
                .map(|(p, n)| (school.class(p.class).id.0.clone(), serde_json::json!(n)))
                .collect();
            ScheduleResult {
                status: ScheduleStatus::Scheduled,
                timetables: done.plans.iter().map(|p| render(school, cfg, p)).collect(),
                failure: None,
                stats: serde_json::json!({
                    "method": "backtracking",
                    "seed": cfg.seed,
                    "iterations": per_class,
                }),
            }
        }
        Err(e) => {
            warn!(error = %e, "scheduling failed");
            ScheduleResult {
                status: e.status(),
                timetables: vec![],
                failure: Some(e.report()),
                stats: serde_json::json!({
                    "method": "backtracking",
                    "seed": cfg.seed,
                }),
            }
        }
    }
}

pub struct BacktrackSolver;
impl BacktrackSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BacktrackSolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Solver for BacktrackSolver {
    async fn solve(&self, req: ScheduleRequest) -> anyhow::Result<ScheduleResult> {
        let school = School::build(&req.school, &req.config)?;
        info!(
            classes = school.class_count(),
            teachers = school.teacher_count(),
            seed = req.config.seed,
            "received school"
        );
        let cfg = req.config;
        // CPU-bound search runs on the blocking pool
        let result = tokio::task::spawn_blocking(move || {
            let mut rng = ChaCha8Rng::seed_from_u64(cfg.seed);
            run(&school, &cfg, &mut rng)
        })
        .await?;
        Ok(result)
    }
}
