use types::{CellView, ClassTimetable, DayRow, SchedulerConfig, StaffingEntry};

use crate::school::{ClassIdx, School, SubjectIdx, TeacherIdx};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Break,
    Occupied {
        subject: SubjectIdx,
        teacher: TeacherIdx,
    },
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// A class's week, indexed by (workday position, period).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Grid {
    days: usize,
    periods: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(days: usize, periods: usize, breaks: &[usize]) -> Self {
        let mut cells = vec![Cell::Empty; days * periods];
        for d in 0..days {
            for &p in breaks {
                if p < periods {
                    cells[d * periods + p] = Cell::Break;
                }
            }
        }
        Self {
            days,
            periods,
            cells,
        }
    }

    pub fn for_config(cfg: &SchedulerConfig) -> Self {
        let breaks: Vec<usize> = cfg.break_periods.iter().map(|&p| p as usize).collect();
        Self::new(cfg.workdays.len(), cfg.periods_per_day as usize, &breaks)
    }

    pub fn days(&self) -> usize {
        self.days
    }

    pub fn periods(&self) -> usize {
        self.periods
    }

    pub fn get(&self, day: usize, period: usize) -> Cell {
        self.cells[day * self.periods + period]
    }

    pub fn set(&mut self, day: usize, period: usize, cell: Cell) {
        debug_assert!(
            !matches!(self.get(day, period), Cell::Break),
            "break cells are immutable"
        );
        self.cells[day * self.periods + period] = cell;
    }

    pub fn row(&self, day: usize) -> &[Cell] {
        &self.cells[day * self.periods..(day + 1) * self.periods]
    }

    pub fn count_subject(&self, subject: SubjectIdx) -> usize {
        self.cells
            .iter()
            .filter(|c| matches!(c, Cell::Occupied { subject: s, .. } if *s == subject))
            .count()
    }
}

/// Subject→teacher bindings of one class, in the class's subject order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Staffing {
    pub pairs: Vec<(SubjectIdx, TeacherIdx)>,
}

impl Staffing {
    pub fn teacher_for(&self, subject: SubjectIdx) -> Option<TeacherIdx> {
        self.pairs
            .iter()
            .find(|(s, _)| *s == subject)
            .map(|&(_, t)| t)
    }

    pub fn uses(&self, teacher: TeacherIdx) -> bool {
        self.pairs.iter().any(|&(_, t)| t == teacher)
    }
}

#[derive(Clone, Debug)]
pub struct ClassPlan {
    pub class: ClassIdx,
    pub staffing: Staffing,
    pub grid: Grid,
}

/// Converts a finished plan into the name-carrying read surface used by
/// display, export and shortfall analysis.
pub fn render(school: &School, cfg: &SchedulerConfig, plan: &ClassPlan) -> ClassTimetable {
    let class = school.class(plan.class);
    let staffing = plan
        .staffing
        .pairs
        .iter()
        .map(|&(s, t)| {
            let subject = school.subject(s);
            let teacher = school.teacher(t);
            StaffingEntry {
                subject_id: subject.id.clone(),
                subject_name: subject.name.clone(),
                teacher_id: teacher.id.clone(),
                teacher_name: teacher.name.clone(),
            }
        })
        .collect();

    let days = cfg
        .workdays
        .iter()
        .enumerate()
        .map(|(d, &day)| DayRow {
            day,
            cells: plan
                .grid
                .row(d)
                .iter()
                .map(|cell| match *cell {
                    Cell::Empty => CellView::Empty,
                    Cell::Break => CellView::Break,
                    Cell::Occupied { subject, teacher } => {
                        let s = school.subject(subject);
                        let t = school.teacher(teacher);
                        CellView::Lesson {
                            subject_id: s.id.clone(),
                            subject_name: s.name.clone(),
                            teacher_id: t.id.clone(),
                            teacher_name: t.name.clone(),
                            lab: s.is_lab(),
                        }
                    }
                })
                .collect(),
        })
        .collect();

    ClassTimetable {
        class_id: class.id.clone(),
        class_name: class.name.clone(),
        staffing,
        days,
    }
}
