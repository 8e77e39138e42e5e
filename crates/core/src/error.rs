use thiserror::Error;
use types::{ClassId, SubjectId};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid school: {0}")]
    Msg(String),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum SlotFillCause {
    /// The iteration budget ran out before a complete week was found.
    #[error("iteration budget exhausted after {iterations} decisions")]
    BudgetExhausted { iterations: u64 },
    /// Every placement order was tried and none covers all subjects.
    #[error("no placement covers every subject")]
    Exhausted,
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("no qualified free teacher for subject {subject} in class {class}; hire more teachers for it")]
    AssignmentInfeasible {
        class: ClassId,
        subject: SubjectId,
        unstaffed: Vec<SubjectId>,
    },
    #[error("cannot fill the week of class {class}: {cause}")]
    SlotFillInfeasible {
        class: ClassId,
        subject: Option<SubjectId>,
        cause: SlotFillCause,
    },
}
