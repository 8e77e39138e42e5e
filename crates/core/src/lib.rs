pub mod analysis;
pub mod error;
pub mod grid;
pub mod school;

use std::collections::HashSet;

use async_trait::async_trait;

pub use error::{ScheduleError, SlotFillCause, ValidationError};
pub use types::{
    ClassSpec, ClassTimetable, FailureReport, ScheduleRequest, ScheduleResult, ScheduleStatus,
    SchedulerConfig, SchoolSpec, SubjectKind, SubjectSpec, TeacherSpec,
};

/// Upper bound on `periodsPerDay`; grids and trackers are sized from it.
pub const MAX_PERIODS_PER_DAY: u32 = 24;

/// Structural checks only; feasibility is left to the solvers.
pub fn validate(spec: &SchoolSpec, cfg: &SchedulerConfig) -> Result<(), ValidationError> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.workdays.is_empty() {
        errors.push("workdays is empty".into());
    }
    let mut days = HashSet::new();
    for d in &cfg.workdays {
        if !days.insert(d) {
            errors.push(format!("duplicate workday: {d}"));
        }
    }
    if cfg.periods_per_day == 0 {
        errors.push("periodsPerDay must be positive".into());
    } else if cfg.periods_per_day > MAX_PERIODS_PER_DAY {
        errors.push(format!(
            "periodsPerDay {} exceeds the limit of {MAX_PERIODS_PER_DAY}",
            cfg.periods_per_day
        ));
    }
    for &p in &cfg.break_periods {
        if p >= cfg.periods_per_day {
            errors.push(format!(
                "break period {p} is outside a {}-period day",
                cfg.periods_per_day
            ));
        }
    }
    if cfg.max_hours_per_day == 0 {
        errors.push("maxHoursPerDay must be positive".into());
    }
    if cfg.min_freshness > cfg.max_freshness {
        errors.push(format!(
            "minFreshness {} exceeds maxFreshness {}",
            cfg.min_freshness, cfg.max_freshness
        ));
    }
    if cfg.max_iterations == 0 {
        errors.push("maxIterations must be positive".into());
    }

    fn chk_unique<I: ToString>(name: &str, ids: impl Iterator<Item = I>, errors: &mut Vec<String>) {
        let mut seen = HashSet::new();
        for id in ids {
            let s = id.to_string();
            if !seen.insert(s.clone()) {
                errors.push(format!("duplicate {name} id: {s}"));
            }
        }
    }
    chk_unique("subject", spec.subjects.iter().map(|x| &x.id), &mut errors);
    chk_unique("teacher", spec.teachers.iter().map(|x| &x.id), &mut errors);
    chk_unique("class", spec.classes.iter().map(|x| &x.id), &mut errors);

    for s in &spec.subjects {
        if s.credit_hours == 0 {
            errors.push(format!("subject {} has creditHours=0", s.id));
        }
        if let SubjectKind::Lab { consecutive_slots } = s.kind {
            if consecutive_slots == 0 {
                errors.push(format!("lab {} has consecutiveSlots=0", s.id));
            } else if consecutive_slots > s.credit_hours {
                errors.push(format!(
                    "lab {} needs {} consecutive slots but only has {} credit hours",
                    s.id, consecutive_slots, s.credit_hours
                ));
            } else if consecutive_slots > cfg.periods_per_day {
                errors.push(format!(
                    "lab {} is longer than a {}-period day",
                    s.id, cfg.periods_per_day
                ));
            }
        }
    }

    let subjects: HashSet<_> = spec.subjects.iter().map(|s| &s.id).collect();
    for t in &spec.teachers {
        for s in &t.subjects {
            if !subjects.contains(s) {
                errors.push(format!("teacher {} references unknown subject {}", t.id, s));
            }
        }
    }
    for c in &spec.classes {
        let mut seen = HashSet::new();
        for s in &c.subjects {
            if !subjects.contains(s) {
                errors.push(format!("class {} references unknown subject {}", c.id, s));
            }
            if !seen.insert(s) {
                errors.push(format!("class {} lists subject {} twice", c.id, s));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Msg(errors.join("; ")))
    }
}

impl ScheduleError {
    pub fn status(&self) -> ScheduleStatus {
        match self {
            ScheduleError::AssignmentInfeasible { .. } => ScheduleStatus::AssignmentInfeasible,
            ScheduleError::SlotFillInfeasible { .. } => ScheduleStatus::SlotFillInfeasible,
        }
    }

    pub fn report(&self) -> FailureReport {
        match self {
            ScheduleError::AssignmentInfeasible {
                class,
                subject,
                unstaffed,
            } => FailureReport {
                class_id: class.clone(),
                subject_id: Some(subject.clone()),
                unstaffed_subjects: unstaffed.clone(),
                message: self.to_string(),
            },
            ScheduleError::SlotFillInfeasible { class, subject, .. } => FailureReport {
                class_id: class.clone(),
                subject_id: subject.clone(),
                unstaffed_subjects: Vec::new(),
                message: self.to_string(),
            },
        }
    }
}

#[async_trait]
pub trait Solver: Send + Sync + 'static {
    async fn solve(&self, req: ScheduleRequest) -> anyhow::Result<ScheduleResult>;
}
