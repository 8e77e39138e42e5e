//! Free-period and staffing shortfall report over finished timetables.
//!
//! Works only on the rendered [`ClassTimetable`] surface so it can be run on
//! any stored or externally edited schedule.

use std::collections::{BTreeMap, HashMap};

use types::{
    CellView, ClassShortfall, ClassTimetable, SchedulerConfig, SchoolSpec, ShortfallReport,
    StaffingNeed, SubjectAllocation, SubjectId,
};

pub fn analyze(
    spec: &SchoolSpec,
    cfg: &SchedulerConfig,
    timetables: &[ClassTimetable],
) -> ShortfallReport {
    let credit_hours: HashMap<&SubjectId, u32> = spec
        .subjects
        .iter()
        .map(|s| (&s.id, s.credit_hours))
        .collect();

    let mut free_total = 0u32;
    let mut classes = Vec::with_capacity(timetables.len());
    let mut shortfall_by_subject: BTreeMap<SubjectId, u32> = BTreeMap::new();

    for tt in timetables {
        let mut free_by_day = BTreeMap::new();
        let mut placed: HashMap<&SubjectId, u32> = HashMap::new();
        for row in &tt.days {
            let mut free = 0u32;
            for cell in &row.cells {
                match cell {
                    CellView::Empty => free += 1,
                    CellView::Lesson { subject_id, .. } => *placed.entry(subject_id).or_default() += 1,
                    CellView::Break => {}
                }
            }
            free_by_day.insert(row.day, free);
        }
        let free_periods: u32 = free_by_day.values().sum();
        free_total += free_periods;

        let required: Vec<&SubjectId> = spec
            .classes
            .iter()
            .find(|c| c.id == tt.class_id)
            .map(|c| c.subjects.iter().collect())
            .unwrap_or_default();

        let subjects = required
            .into_iter()
            .map(|sid| {
                let required = credit_hours.get(sid).copied().unwrap_or(0);
                let placed = placed.get(sid).copied().unwrap_or(0);
                let shortfall = required.saturating_sub(placed);
                if shortfall > 0 {
                    let total = shortfall_by_subject.entry(sid.clone()).or_default();
                    *total = total.saturating_add(shortfall);
                }
                SubjectAllocation {
                    subject_id: sid.clone(),
                    placed,
                    required,
                    shortfall,
                }
            })
            .collect();

        classes.push(ClassShortfall {
            class_id: tt.class_id.clone(),
            free_periods,
            free_by_day,
            subjects,
        });
    }

    let daily_cap = cfg.max_hours_per_day.max(1);
    let staffing_needs = shortfall_by_subject
        .into_iter()
        .map(|(subject_id, hours_needed)| {
            let qualified_teachers = spec
                .teachers
                .iter()
                .filter(|t| t.subjects.contains(&subject_id))
                .count() as u32;
            let existing_capacity = qualified_teachers.saturating_mul(cfg.max_hours_per_day);
            let additional_teachers = hours_needed
                .saturating_sub(existing_capacity)
                .div_ceil(daily_cap);
            StaffingNeed {
                subject_id,
                hours_needed,
                qualified_teachers,
                existing_capacity,
                additional_teachers,
            }
        })
        .collect();

    ShortfallReport {
        free_periods: free_total,
        classes,
        staffing_needs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{ClassSpec, DayOfWeek, DayRow, SubjectKind, SubjectSpec, TeacherSpec};

    fn lesson(subject: &str) -> CellView {
        CellView::Lesson {
            subject_id: subject.into(),
            subject_name: subject.to_uppercase(),
            teacher_id: "t1".into(),
            teacher_name: "T1".into(),
            lab: false,
        }
    }

    #[test]
    fn counts_free_periods_and_shortfalls() {
        let spec = SchoolSpec {
            subjects: vec![
                SubjectSpec {
                    id: "math".into(),
                    name: "Math".into(),
                    credit_hours: 3,
                    kind: SubjectKind::Plain,
                },
                SubjectSpec {
                    id: "eng".into(),
                    name: "English".into(),
                    credit_hours: 8,
                    kind: SubjectKind::Plain,
                },
            ],
            teachers: vec![TeacherSpec {
                id: "t1".into(),
                name: "T1".into(),
                subjects: vec!["eng".into()],
            }],
            classes: vec![ClassSpec {
                id: "c".into(),
                name: "C".into(),
                subjects: vec!["math".into(), "eng".into()],
            }],
        };
        let cfg = SchedulerConfig {
            max_hours_per_day: 2,
            ..SchedulerConfig::default()
        };
        let tt = ClassTimetable {
            class_id: "c".into(),
            class_name: "C".into(),
            staffing: vec![],
            days: vec![
                DayRow {
                    day: DayOfWeek::Mon,
                    cells: vec![lesson("math"), CellView::Break, CellView::Empty, lesson("eng")],
                },
                DayRow {
                    day: DayOfWeek::Tue,
                    cells: vec![lesson("math"), CellView::Break, lesson("math"), CellView::Empty],
                },
            ],
        };

        let report = analyze(&spec, &cfg, &[tt]);
        assert_eq!(report.free_periods, 2);
        let class = &report.classes[0];
        assert_eq!(class.free_by_day[&DayOfWeek::Mon], 1);
        assert_eq!(class.free_by_day[&DayOfWeek::Tue], 1);

        let math = &class.subjects[0];
        assert_eq!((math.placed, math.required, math.shortfall), (3, 3, 0));
        let eng = &class.subjects[1];
        assert_eq!((eng.placed, eng.required, eng.shortfall), (1, 8, 7));

        assert_eq!(report.staffing_needs.len(), 1);
        let need = &report.staffing_needs[0];
        assert_eq!(need.subject_id.0, "eng");
        assert_eq!(need.qualified_teachers, 1);
        assert_eq!(need.existing_capacity, 2);
        assert_eq!(need.additional_teachers, 3);
    }

    #[test]
    fn huge_daily_cap_saturates_capacity() {
        let spec = SchoolSpec {
            subjects: vec![SubjectSpec {
                id: "eng".into(),
                name: "English".into(),
                credit_hours: 4,
                kind: SubjectKind::Plain,
            }],
            teachers: ["t1", "t2"]
                .into_iter()
                .map(|id| TeacherSpec {
                    id: id.into(),
                    name: id.to_uppercase(),
                    subjects: vec!["eng".into()],
                })
                .collect(),
            classes: vec![ClassSpec {
                id: "c".into(),
                name: "C".into(),
                subjects: vec!["eng".into()],
            }],
        };
        let cfg = SchedulerConfig {
            max_hours_per_day: u32::MAX,
            ..SchedulerConfig::default()
        };
        assert!(crate::validate(&spec, &cfg).is_ok());
        let tt = ClassTimetable {
            class_id: "c".into(),
            class_name: "C".into(),
            staffing: vec![],
            days: vec![DayRow {
                day: DayOfWeek::Mon,
                cells: vec![lesson("eng"), CellView::Empty],
            }],
        };

        let report = analyze(&spec, &cfg, &[tt]);
        let need = &report.staffing_needs[0];
        assert_eq!(need.hours_needed, 3);
        assert_eq!(need.qualified_teachers, 2);
        assert_eq!(need.existing_capacity, u32::MAX);
        assert_eq!(need.additional_teachers, 0);
    }
}
