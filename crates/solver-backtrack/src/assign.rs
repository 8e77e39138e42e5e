use rand::seq::SliceRandom;
use rand::Rng;
use sched_core::grid::Staffing;
use sched_core::school::{ClassIdx, School, SubjectIdx, TeacherIdx};
use sched_core::ScheduleError;
use tracing::{debug, info, warn};

enum Step {
    Done,
    Retry,
    /// The current class cannot be staffed under any binding order.
    Fatal,
}

struct Assigner<'a, R: Rng + ?Sized> {
    school: &'a School,
    randomize: bool,
    rng: &'a mut R,
    staffing: Vec<Staffing>,
    blocked: Option<(ClassIdx, usize, SubjectIdx)>,
}

impl<R: Rng + ?Sized> Assigner<'_, R> {
    fn step(&mut self, class: usize, pos: usize) -> Step {
        if class >= self.school.class_count() {
            return Step::Done;
        }
        let school = self.school;
        let cidx = ClassIdx(class);
        let subjects = &school.class(cidx).subjects;
        if pos >= subjects.len() {
            return match self.step(class + 1, 0) {
                Step::Done => Step::Done,
                // bindings never constrain other classes
                Step::Retry | Step::Fatal => Step::Fatal,
            };
        }
        let subject = subjects[pos];

        let mut candidates: Vec<TeacherIdx> = school
            .qualified_teachers(subject)
            .filter(|&t| !self.staffing[class].uses(t))
            .collect();
        if self.randomize {
            candidates.shuffle(&mut *self.rng);
        }
        if candidates.is_empty() {
            self.note_blocked(cidx, pos, subject);
        }

        for t in candidates {
            debug!(
                class = %school.class(cidx).id,
                subject = %school.subject(subject).id,
                teacher = %school.teacher(t).id,
                "trying teacher"
            );
            self.staffing[class].pairs.push((subject, t));
            match self.step(class, pos + 1) {
                Step::Done => return Step::Done,
                Step::Fatal => {
                    self.staffing[class].pairs.pop();
                    return Step::Fatal;
                }
                Step::Retry => {
                    self.staffing[class].pairs.pop();
                }
            }
        }

        if pos == 0 {
            Step::Fatal
        } else {
            Step::Retry
        }
    }

    fn note_blocked(&mut self, class: ClassIdx, pos: usize, subject: SubjectIdx) {
        let deeper = match self.blocked {
            Some((c, p, _)) => c != class || pos >= p,
            None => true,
        };
        if deeper {
            self.blocked = Some((class, pos, subject));
        }
    }
}

/// Binds one qualified teacher to every (class, subject) pair, never reusing a
/// teacher inside the same class. Returns one [`Staffing`] per class in school
/// order.
pub fn assign_teachers<R: Rng + ?Sized>(
    school: &School,
    randomize: bool,
    rng: &mut R,
) -> Result<Vec<Staffing>, ScheduleError> {
    let mut a = Assigner {
        school,
        randomize,
        rng,
        staffing: vec![Staffing::default(); school.class_count()],
        blocked: None,
    };

    match a.step(0, 0) {
        Step::Done => {
            info!(classes = school.class_count(), "teacher assignment complete");
            Ok(a.staffing)
        }
        Step::Retry | Step::Fatal => {
            let first_pair = || {
                school
                    .classes()
                    .find_map(|(c, class)| class.subjects.first().map(|&s| (c, 0, s)))
            };
            let Some((class, _, subject)) = a.blocked.or_else(first_pair) else {
                // no class lists a subject, so the empty staffing is complete
                return Ok(a.staffing);
            };
            let unstaffed = school
                .unstaffed_subjects()
                .into_iter()
                .map(|s| school.subject(s).id.clone())
                .collect();
            let err = ScheduleError::AssignmentInfeasible {
                class: school.class(class).id.clone(),
                subject: school.subject(subject).id.clone(),
                unstaffed,
            };
            warn!(error = %err, "teacher assignment failed");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use types::{
        ClassSpec, SchedulerConfig, SchoolSpec, SubjectKind, SubjectSpec, TeacherSpec,
    };

    fn school(teachers: &[(&str, &[&str])], classes: &[(&str, &[&str])]) -> School {
        let mut ids: Vec<&str> = classes.iter().flat_map(|(_, s)| s.iter().copied()).collect();
        ids.sort_unstable();
        ids.dedup();
        let spec = SchoolSpec {
            subjects: ids
                .iter()
                .map(|&id| SubjectSpec {
                    id: id.into(),
                    name: id.into(),
                    credit_hours: 2,
                    kind: SubjectKind::Plain,
                })
                .collect(),
            teachers: teachers
                .iter()
                .map(|&(id, subj)| TeacherSpec {
                    id: id.into(),
                    name: id.into(),
                    subjects: subj.iter().map(|&s| s.into()).collect(),
                })
                .collect(),
            classes: classes
                .iter()
                .map(|&(id, subj)| ClassSpec {
                    id: id.into(),
                    name: id.into(),
                    subjects: subj.iter().map(|&s| s.into()).collect(),
                })
                .collect(),
        };
        School::build(&spec, &SchedulerConfig::default()).unwrap()
    }

    #[test]
    fn backtracks_over_shared_qualifications() {
        // t1 can teach both, t2 only physics: math must go to t1
        let school = school(
            &[("t1", &["math", "phys"]), ("t2", &["phys"])],
            &[("a", &["phys", "math"]), ("b", &["math", "phys"])],
        );
        for seed in 0..16 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let staffing = assign_teachers(&school, true, &mut rng).unwrap();
            for (cidx, class) in school.classes() {
                let s = &staffing[cidx.0];
                assert_eq!(s.pairs.len(), class.subjects.len());
                for &(subj, t) in &s.pairs {
                    assert!(school.teacher(t).is_qualified(subj));
                }
                assert_ne!(s.pairs[0].1, s.pairs[1].1);
                let math = school.subjects().find(|(_, x)| x.id.0 == "math").unwrap().0;
                assert_eq!(school.teacher(s.teacher_for(math).unwrap()).id.0, "t1");
            }
        }
    }

    #[test]
    fn reports_blocked_subject() {
        let school = school(
            &[("t1", &["math", "phys"])],
            &[("a", &["math"]), ("b", &["math", "phys"])],
        );
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let err = assign_teachers(&school, true, &mut rng).unwrap_err();
        match err {
            ScheduleError::AssignmentInfeasible {
                class,
                subject,
                unstaffed,
            } => {
                assert_eq!(class.0, "b");
                assert_eq!(subject.0, "phys");
                assert!(unstaffed.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn lists_subjects_nobody_teaches() {
        let school = school(&[("t1", &["math"])], &[("a", &["math", "art"])]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let err = assign_teachers(&school, false, &mut rng).unwrap_err();
        let ScheduleError::AssignmentInfeasible { subject, unstaffed, .. } = err else {
            panic!("expected assignment failure");
        };
        assert_eq!(subject.0, "art");
        assert_eq!(unstaffed.len(), 1);
        assert_eq!(unstaffed[0].0, "art");
    }

    #[test]
    fn classes_without_subjects_need_no_staff() {
        let school = school(&[("t1", &[])], &[("a", &[]), ("b", &[])]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let staffing = assign_teachers(&school, true, &mut rng).unwrap();
        assert_eq!(staffing.len(), 2);
        assert!(staffing.iter().all(|s| s.pairs.is_empty()));
    }
}
