//! Per-class weekly slot filling.
//!
//! Walks the week cell by cell in (day, period) order. At each empty cell the
//! bound subjects are tried in ascending distribution score; a cell nothing
//! fits into is left empty. A finished week must contain every lab block and
//! at least one period of every plain subject, otherwise the search backs up.
//! The number of decision nodes is capped by `max_iterations`.

use rand::seq::SliceRandom;
use rand::Rng;
use sched_core::grid::{Cell, Grid, Staffing};
use sched_core::school::{ClassIdx, School, SubjectIdx, TeacherIdx};
use sched_core::{ScheduleError, SlotFillCause};
use tracing::{debug, trace, warn};
use types::SchedulerConfig;

use crate::tracker::Availability;

const SAME_DAY_WEIGHT: u32 = 3;
const SAME_PERIOD_WEIGHT: u32 = 4;

/// One tentative placement: `len` periods of staffing entry `slot` starting
/// at `start` on `day`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Move {
    slot: usize,
    day: usize,
    start: usize,
    len: usize,
}

enum Outcome {
    Found,
    DeadEnd,
    OutOfBudget,
}

/// Everything a placement touches inside the class.
#[derive(Clone, Debug, Eq, PartialEq)]
struct FillState {
    grid: Grid,
    /// [slot][day]
    per_day: Vec<u32>,
    /// [slot][period]
    per_period: Vec<u32>,
    placed: Vec<u32>,
    lab_done: Vec<bool>,
    /// labs placed per day
    labs_on_day: Vec<u32>,
}

impl FillState {
    fn new(grid: Grid, slots: usize) -> Self {
        let (days, periods) = (grid.days(), grid.periods());
        Self {
            grid,
            per_day: vec![0; slots * days],
            per_period: vec![0; slots * periods],
            placed: vec![0; slots],
            lab_done: vec![false; slots],
            labs_on_day: vec![0; days],
        }
    }
}

pub struct FillOutcome {
    pub grid: Grid,
    pub iterations: u64,
}

struct SlotFiller<'a, R: Rng + ?Sized> {
    school: &'a School,
    cfg: &'a SchedulerConfig,
    class: ClassIdx,
    pairs: &'a [(SubjectIdx, TeacherIdx)],
    tracker: &'a mut Availability,
    rng: &'a mut R,
    day_order: Vec<usize>,
    state: FillState,
    iterations: u64,
    unplaced: Option<SubjectIdx>,
}

impl<'a, R: Rng + ?Sized> SlotFiller<'a, R> {
    fn new(
        school: &'a School,
        cfg: &'a SchedulerConfig,
        class: ClassIdx,
        staffing: &'a Staffing,
        tracker: &'a mut Availability,
        rng: &'a mut R,
    ) -> Self {
        let grid = Grid::for_config(cfg);
        let mut day_order: Vec<usize> = (0..grid.days()).collect();
        if cfg.randomize_order {
            day_order.shuffle(&mut *rng);
        }
        Self {
            school,
            cfg,
            class,
            pairs: &staffing.pairs,
            tracker,
            rng,
            day_order,
            state: FillState::new(grid, staffing.pairs.len()),
            iterations: 0,
            unplaced: None,
        }
    }

    fn periods(&self) -> usize {
        self.state.grid.periods()
    }

    fn score(&mut self, slot: usize, day: usize, period: usize) -> u32 {
        let days = self.state.grid.days();
        let periods = self.periods();
        SAME_DAY_WEIGHT * self.state.per_day[slot * days + day]
            + SAME_PERIOD_WEIGHT * self.state.per_period[slot * periods + period]
            + self.rng.gen_range(0..=1)
    }

    /// Candidate entries for a cell, lowest distribution score first.
    fn ordered_slots(&mut self, day: usize, period: usize) -> Vec<usize> {
        let mut scored: Vec<(u32, usize)> = (0..self.pairs.len())
            .map(|slot| (self.score(slot, day, period), slot))
            .collect();
        scored.sort_by_key(|&(score, _)| score);
        scored.into_iter().map(|(_, slot)| slot).collect()
    }

    fn admissible(&self, slot: usize, day: usize, period: usize) -> Option<Move> {
        let (subject, teacher) = self.pairs[slot];
        let subject = self.school.subject(subject);
        let len = subject.block_len();
        if self.state.placed[slot] + len as u32 > subject.credit_hours {
            return None;
        }
        if subject.is_lab() {
            if self.state.lab_done[slot] {
                return None;
            }
            if self.cfg.lab_same_day_exclusion && self.state.labs_on_day[day] > 0 {
                return None;
            }
            if period + len > self.periods() {
                return None;
            }
            if !(period..period + len).all(|p| self.state.grid.get(day, p).is_empty()) {
                return None;
            }
            if !self.tracker.can_take_block(teacher, day, period, len) {
                return None;
            }
        } else if !self.tracker.is_available(teacher, day, period) {
            return None;
        }
        Some(Move {
            slot,
            day,
            start: period,
            len,
        })
    }

    fn apply(&mut self, mv: Move) {
        let (subject, teacher) = self.pairs[mv.slot];
        let days = self.state.grid.days();
        let periods = self.periods();
        for p in mv.start..mv.start + mv.len {
            self.state.grid.set(mv.day, p, Cell::Occupied { subject, teacher });
            self.tracker.occupy(teacher, mv.day, p, self.class);
            self.state.per_day[mv.slot * days + mv.day] += 1;
            self.state.per_period[mv.slot * periods + p] += 1;
            self.state.placed[mv.slot] += 1;
        }
        if self.school.subject(subject).is_lab() {
            self.state.lab_done[mv.slot] = true;
            self.state.labs_on_day[mv.day] += 1;
        }
    }

    fn undo(&mut self, mv: Move) {
        let (subject, teacher) = self.pairs[mv.slot];
        let days = self.state.grid.days();
        let periods = self.periods();
        if self.school.subject(subject).is_lab() {
            self.state.labs_on_day[mv.day] -= 1;
            self.state.lab_done[mv.slot] = false;
        }
        for p in (mv.start..mv.start + mv.len).rev() {
            self.state.placed[mv.slot] -= 1;
            self.state.per_period[mv.slot * periods + p] -= 1;
            self.state.per_day[mv.slot * days + mv.day] -= 1;
            self.tracker.release(teacher, mv.day, p);
            self.state.grid.set(mv.day, p, Cell::Empty);
        }
    }

    /// First bound subject the week does not cover yet.
    fn uncovered(&self) -> Option<SubjectIdx> {
        self.pairs.iter().enumerate().find_map(|(slot, &(subject, _))| {
            let missing = if self.school.subject(subject).is_lab() {
                !self.state.lab_done[slot]
            } else {
                self.state.placed[slot] == 0
            };
            missing.then_some(subject)
        })
    }

    fn search(&mut self, pos: usize) -> Outcome {
        self.iterations += 1;
        if self.iterations > self.cfg.max_iterations {
            return Outcome::OutOfBudget;
        }

        let periods = self.periods();
        if pos >= self.day_order.len() * periods {
            return match self.uncovered() {
                None => Outcome::Found,
                Some(subject) => {
                    // keep the miss of the first complete pass
                    self.unplaced.get_or_insert(subject);
                    Outcome::DeadEnd
                }
            };
        }

        let day = self.day_order[pos / periods];
        let period = pos % periods;
        if !self.state.grid.get(day, period).is_empty() {
            return self.search(pos + 1);
        }

        for slot in self.ordered_slots(day, period) {
            let Some(mv) = self.admissible(slot, day, period) else {
                continue;
            };
            trace!(slot, day, period, len = mv.len, "placing");
            self.apply(mv);
            match self.search(pos + mv.len) {
                Outcome::Found => return Outcome::Found,
                Outcome::OutOfBudget => {
                    self.undo(mv);
                    return Outcome::OutOfBudget;
                }
                Outcome::DeadEnd => self.undo(mv),
            }
        }

        self.search(pos + 1)
    }
}

/// Fills the week of `class`. On success the placements stay recorded in
/// `tracker`; on failure the tracker is left exactly as it was on entry.
pub fn fill_class<R: Rng + ?Sized>(
    school: &School,
    cfg: &SchedulerConfig,
    class: ClassIdx,
    staffing: &Staffing,
    tracker: &mut Availability,
    rng: &mut R,
) -> Result<FillOutcome, ScheduleError> {
    let mut filler = SlotFiller::new(school, cfg, class, staffing, tracker, rng);
    let outcome = filler.search(0);
    let class_id = school.class(class).id.clone();
    let subject = filler.unplaced.map(|s| school.subject(s).id.clone());

    match outcome {
        Outcome::Found => {
            debug!(class = %class_id, iterations = filler.iterations, "week filled");
            Ok(FillOutcome {
                grid: filler.state.grid,
                iterations: filler.iterations,
            })
        }
        Outcome::DeadEnd => {
            let err = ScheduleError::SlotFillInfeasible {
                class: class_id,
                subject,
                cause: SlotFillCause::Exhausted,
            };
            warn!(error = %err, iterations = filler.iterations, "slot filling failed");
            Err(err)
        }
        Outcome::OutOfBudget => {
            let err = ScheduleError::SlotFillInfeasible {
                class: class_id,
                subject,
                cause: SlotFillCause::BudgetExhausted {
                    iterations: cfg.max_iterations,
                },
            };
            warn!(error = %err, "slot filling ran out of iterations");
            Err(err)
        }
    }
}
