//! Interned entity model. Every entity is addressed by a dense index into the
//! owning [`School`]; display names are carried along but never compared.

use std::collections::HashMap;
use std::fmt;

use types::{ClassId, SchedulerConfig, SchoolSpec, SubjectId, SubjectKind, TeacherId};

use crate::{validate, ValidationError};

macro_rules! index_newtype {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
        pub struct $name(pub usize);

        impl $name {
            #[inline]
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "#{}", self.0)
            }
        }
    };
}
index_newtype!(SubjectIdx);
index_newtype!(TeacherIdx);
index_newtype!(ClassIdx);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    Plain,
    Lab { consecutive_slots: usize },
}

#[derive(Clone, Debug)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub credit_hours: u32,
    pub kind: Kind,
}

impl Subject {
    pub fn is_lab(&self) -> bool {
        matches!(self.kind, Kind::Lab { .. })
    }

    /// Number of contiguous periods one placement of this subject covers.
    pub fn block_len(&self) -> usize {
        match self.kind {
            Kind::Plain => 1,
            Kind::Lab { consecutive_slots } => consecutive_slots,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Teacher {
    pub id: TeacherId,
    pub name: String,
    /// Sorted, deduplicated.
    pub qualified: Vec<SubjectIdx>,
}

impl Teacher {
    pub fn is_qualified(&self, subject: SubjectIdx) -> bool {
        self.qualified.binary_search(&subject).is_ok()
    }
}

#[derive(Clone, Debug)]
pub struct Class {
    pub id: ClassId,
    pub name: String,
    pub subjects: Vec<SubjectIdx>,
}

#[derive(Clone, Debug)]
pub struct School {
    subjects: Vec<Subject>,
    teachers: Vec<Teacher>,
    classes: Vec<Class>,
}

impl School {
    /// Validates `spec` against `cfg` and interns all string ids.
    pub fn build(spec: &SchoolSpec, cfg: &SchedulerConfig) -> Result<Self, ValidationError> {
        validate(spec, cfg)?;

        let subject_index: HashMap<&SubjectId, SubjectIdx> = spec
            .subjects
            .iter()
            .enumerate()
            .map(|(i, s)| (&s.id, SubjectIdx(i)))
            .collect();
        let lookup = |id: &SubjectId| -> Result<SubjectIdx, ValidationError> {
            subject_index
                .get(id)
                .copied()
                .ok_or_else(|| ValidationError::Msg(format!("unknown subject {id}")))
        };

        let subjects = spec
            .subjects
            .iter()
            .map(|s| Subject {
                id: s.id.clone(),
                name: s.name.clone(),
                credit_hours: s.credit_hours,
                kind: match s.kind {
                    SubjectKind::Plain => Kind::Plain,
                    SubjectKind::Lab { consecutive_slots } => Kind::Lab {
                        consecutive_slots: consecutive_slots as usize,
                    },
                },
            })
            .collect();

        let mut teachers = Vec::with_capacity(spec.teachers.len());
        for t in &spec.teachers {
            let mut qualified = t.subjects.iter().map(&lookup).collect::<Result<Vec<_>, _>>()?;
            qualified.sort_unstable();
            qualified.dedup();
            teachers.push(Teacher {
                id: t.id.clone(),
                name: t.name.clone(),
                qualified,
            });
        }

        let mut classes = Vec::with_capacity(spec.classes.len());
        for c in &spec.classes {
            classes.push(Class {
                id: c.id.clone(),
                name: c.name.clone(),
                subjects: c.subjects.iter().map(&lookup).collect::<Result<_, _>>()?,
            });
        }

        Ok(Self {
            subjects,
            teachers,
            classes,
        })
    }

    pub fn subject(&self, idx: SubjectIdx) -> &Subject {
        &self.subjects[idx.0]
    }

    pub fn teacher(&self, idx: TeacherIdx) -> &Teacher {
        &self.teachers[idx.0]
    }

    pub fn class(&self, idx: ClassIdx) -> &Class {
        &self.classes[idx.0]
    }

    pub fn subjects(&self) -> impl Iterator<Item = (SubjectIdx, &Subject)> {
        self.subjects.iter().enumerate().map(|(i, s)| (SubjectIdx(i), s))
    }

    pub fn teachers(&self) -> impl Iterator<Item = (TeacherIdx, &Teacher)> {
        self.teachers.iter().enumerate().map(|(i, t)| (TeacherIdx(i), t))
    }

    pub fn classes(&self) -> impl Iterator<Item = (ClassIdx, &Class)> {
        self.classes.iter().enumerate().map(|(i, c)| (ClassIdx(i), c))
    }

    pub fn teacher_count(&self) -> usize {
        self.teachers.len()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn qualified_teachers(&self, subject: SubjectIdx) -> impl Iterator<Item = TeacherIdx> + '_ {
        self.teachers()
            .filter(move |(_, t)| t.is_qualified(subject))
            .map(|(i, _)| i)
    }

    /// Subjects required by some class that no teacher can teach.
    pub fn unstaffed_subjects(&self) -> Vec<SubjectIdx> {
        let mut out: Vec<SubjectIdx> = self
            .classes
            .iter()
            .flat_map(|c| c.subjects.iter().copied())
            .filter(|&s| self.qualified_teachers(s).next().is_none())
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{ClassSpec, SubjectSpec, TeacherSpec};

    fn spec() -> SchoolSpec {
        SchoolSpec {
            subjects: vec![
                SubjectSpec {
                    id: "math".into(),
                    name: "Mathematics".into(),
                    credit_hours: 4,
                    kind: SubjectKind::Plain,
                },
                SubjectSpec {
                    id: "phys-lab".into(),
                    name: "Physics".into(),
                    credit_hours: 2,
                    kind: SubjectKind::Lab {
                        consecutive_slots: 2,
                    },
                },
                SubjectSpec {
                    id: "phys".into(),
                    name: "Physics".into(),
                    credit_hours: 3,
                    kind: SubjectKind::Plain,
                },
            ],
            teachers: vec![TeacherSpec {
                id: "t1".into(),
                name: "Dr. Phys".into(),
                subjects: vec!["phys-lab".into(), "phys".into(), "phys".into()],
            }],
            classes: vec![ClassSpec {
                id: "11a".into(),
                name: "11-A".into(),
                subjects: vec!["math".into(), "phys".into(), "phys-lab".into()],
            }],
        }
    }

    #[test]
    fn interns_ids_and_keeps_same_named_subjects_apart() {
        let school = School::build(&spec(), &SchedulerConfig::default()).unwrap();
        let class = school.class(ClassIdx(0));
        assert_eq!(class.subjects, vec![SubjectIdx(0), SubjectIdx(2), SubjectIdx(1)]);

        let teacher = school.teacher(TeacherIdx(0));
        assert_eq!(teacher.qualified, vec![SubjectIdx(1), SubjectIdx(2)]);
        assert!(!teacher.is_qualified(SubjectIdx(0)));

        assert_eq!(school.subject(SubjectIdx(1)).block_len(), 2);
        assert_eq!(school.subject(SubjectIdx(2)).block_len(), 1);
        assert_eq!(
            school.subject(SubjectIdx(1)).name,
            school.subject(SubjectIdx(2)).name
        );
    }

    #[test]
    fn reports_subjects_without_any_teacher() {
        let school = School::build(&spec(), &SchedulerConfig::default()).unwrap();
        assert_eq!(school.unstaffed_subjects(), vec![SubjectIdx(0)]);
    }

    #[test]
    fn rejects_unknown_subject_reference() {
        let mut s = spec();
        s.classes[0].subjects.push("art".into());
        let err = School::build(&s, &SchedulerConfig::default()).unwrap_err();
        assert!(err.to_string().contains("unknown subject art"));
    }
}
