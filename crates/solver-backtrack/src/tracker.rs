//! Per-teacher availability shared by every class search of a run.
//!
//! Freshness is a per-(day, period) fatigue proxy: teaching a period costs
//! `fatigue` there and `spillover` on each neighbour. A teacher is free for a
//! period only while it is unoccupied, still fresh enough and under the
//! daily cap. [`Availability::occupy`] and [`Availability::release`] are exact
//! inverses.

use sched_core::school::{ClassIdx, TeacherIdx};
use types::SchedulerConfig;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Rules {
    min_freshness: i32,
    fatigue: i32,
    spillover: i32,
    daily_cap: u32,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Availability {
    days: usize,
    periods: usize,
    rules: Rules,
    /// [teacher][day][period]
    freshness: Vec<i32>,
    /// [teacher][day][period]
    occupant: Vec<Option<ClassIdx>>,
    /// [teacher][day]
    load: Vec<u32>,
}

impl Availability {
    pub fn new(teachers: usize, cfg: &SchedulerConfig) -> Self {
        let days = cfg.workdays.len();
        let periods = cfg.periods_per_day as usize;
        Self {
            days,
            periods,
            rules: Rules {
                min_freshness: cfg.min_freshness,
                fatigue: cfg.fatigue,
                spillover: cfg.spillover,
                daily_cap: cfg.max_hours_per_day,
            },
            freshness: vec![cfg.max_freshness; teachers * days * periods],
            occupant: vec![None; teachers * days * periods],
            load: vec![0; teachers * days],
        }
    }

    #[inline]
    fn cell(&self, t: TeacherIdx, day: usize, period: usize) -> usize {
        (t.0 * self.days + day) * self.periods + period
    }

    pub fn freshness(&self, t: TeacherIdx, day: usize, period: usize) -> i32 {
        self.freshness[self.cell(t, day, period)]
    }

    pub fn occupant(&self, t: TeacherIdx, day: usize, period: usize) -> Option<ClassIdx> {
        self.occupant[self.cell(t, day, period)]
    }

    pub fn load(&self, t: TeacherIdx, day: usize) -> u32 {
        self.load[t.0 * self.days + day]
    }

    pub fn is_available(&self, t: TeacherIdx, day: usize, period: usize) -> bool {
        let i = self.cell(t, day, period);
        self.occupant[i].is_none()
            && self.freshness[i] >= self.rules.min_freshness
            && self.load(t, day) < self.rules.daily_cap
    }

    /// Whether `len` periods starting at `start` can all be taken on `day`
    /// without pushing the teacher past the daily cap.
    pub fn can_take_block(&self, t: TeacherIdx, day: usize, start: usize, len: usize) -> bool {
        start + len <= self.periods
            && self.load(t, day) + len as u32 <= self.rules.daily_cap
            && (start..start + len).all(|p| self.is_available(t, day, p))
    }

    pub fn occupy(&mut self, t: TeacherIdx, day: usize, period: usize, class: ClassIdx) {
        let i = self.cell(t, day, period);
        debug_assert!(self.occupant[i].is_none(), "teacher double-booked");
        self.occupant[i] = Some(class);
        self.load[t.0 * self.days + day] += 1;
        self.shift_freshness(t, day, period, -1);
    }

    pub fn release(&mut self, t: TeacherIdx, day: usize, period: usize) {
        let i = self.cell(t, day, period);
        debug_assert!(self.occupant[i].is_some(), "releasing a free period");
        self.occupant[i] = None;
        self.load[t.0 * self.days + day] -= 1;
        self.shift_freshness(t, day, period, 1);
    }

    fn shift_freshness(&mut self, t: TeacherIdx, day: usize, period: usize, sign: i32) {
        let i = self.cell(t, day, period);
        self.freshness[i] += sign * self.rules.fatigue;
        if period > 0 {
            self.freshness[i - 1] += sign * self.rules.spillover;
        }
        if period + 1 < self.periods {
            self.freshness[i + 1] += sign * self.rules.spillover;
        }
    }
}
