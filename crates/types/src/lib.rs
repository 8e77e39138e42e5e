use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use utoipa::ToSchema;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Clone,
            Debug,
            Serialize,
            Deserialize,
            ToSchema,
            JsonSchema,
            Eq,
            PartialEq,
            Ord,
            PartialOrd,
            Hash,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}
id_newtype!(SubjectId);
id_newtype!(TeacherId);
id_newtype!(ClassId);

#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Ord, PartialOrd, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl DayOfWeek {
    pub const WORKWEEK: [DayOfWeek; 5] = [
        DayOfWeek::Mon,
        DayOfWeek::Tue,
        DayOfWeek::Wed,
        DayOfWeek::Thu,
        DayOfWeek::Fri,
    ];
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DayOfWeek::Mon => "mon",
            DayOfWeek::Tue => "tue",
            DayOfWeek::Wed => "wed",
            DayOfWeek::Thu => "thu",
            DayOfWeek::Fri => "fri",
            DayOfWeek::Sat => "sat",
            DayOfWeek::Sun => "sun",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Default, Eq, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SubjectKind {
    #[default]
    Plain,
    #[serde(rename_all = "camelCase")]
    Lab { consecutive_slots: u32 },
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubjectSpec {
    pub id: SubjectId,
    pub name: String,
    pub credit_hours: u32,
    #[serde(default)]
    pub kind: SubjectKind,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct TeacherSpec {
    pub id: TeacherId,
    pub name: String,
    #[serde(default)]
    pub subjects: Vec<SubjectId>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct ClassSpec {
    pub id: ClassId,
    pub name: String,
    #[serde(default)]
    pub subjects: Vec<SubjectId>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Default)]
pub struct SchoolSpec {
    #[serde(default)]
    pub subjects: Vec<SubjectSpec>,
    #[serde(default)]
    pub teachers: Vec<TeacherSpec>,
    #[serde(default)]
    pub classes: Vec<ClassSpec>,
}

/// Tunables read by both solvers. Defaults mirror a seven-period school day
/// with a morning and a lunch break.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulerConfig {
    pub periods_per_day: u32,
    pub workdays: Vec<DayOfWeek>,
    /// 0-based period indices reserved as breaks on every day.
    pub break_periods: Vec<u32>,
    pub max_hours_per_day: u32,
    pub max_freshness: i32,
    pub fatigue: i32,
    pub spillover: i32,
    pub min_freshness: i32,
    pub lab_same_day_exclusion: bool,
    pub max_iterations: u64,
    pub randomize_order: bool,
    pub seed: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            periods_per_day: 7,
            workdays: DayOfWeek::WORKWEEK.to_vec(),
            break_periods: vec![3, 5],
            max_hours_per_day: 3,
            max_freshness: 10,
            fatigue: 4,
            spillover: 2,
            min_freshness: 2,
            lab_same_day_exclusion: true,
            max_iterations: 1000,
            randomize_order: true,
            seed: 0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct ScheduleRequest {
    pub school: SchoolSpec,
    #[serde(default)]
    pub config: SchedulerConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CellView {
    Break,
    Empty,
    #[serde(rename_all = "camelCase")]
    Lesson {
        subject_id: SubjectId,
        subject_name: String,
        teacher_id: TeacherId,
        teacher_name: String,
        lab: bool,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct DayRow {
    pub day: DayOfWeek,
    pub cells: Vec<CellView>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffingEntry {
    pub subject_id: SubjectId,
    pub subject_name: String,
    pub teacher_id: TeacherId,
    pub teacher_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassTimetable {
    pub class_id: ClassId,
    pub class_name: String,
    pub staffing: Vec<StaffingEntry>,
    pub days: Vec<DayRow>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    Scheduled,
    AssignmentInfeasible,
    SlotFillInfeasible,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FailureReport {
    pub class_id: ClassId,
    #[serde(default)]
    pub subject_id: Option<SubjectId>,
    /// Subjects no teacher in the school is qualified for.
    #[serde(default)]
    pub unstaffed_subjects: Vec<SubjectId>,
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct ScheduleResult {
    pub status: ScheduleStatus,
    #[serde(default)]
    pub timetables: Vec<ClassTimetable>,
    #[serde(default)]
    pub failure: Option<FailureReport>,
    pub stats: serde_json::Value,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAllocation {
    pub subject_id: SubjectId,
    pub placed: u32,
    pub required: u32,
    pub shortfall: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassShortfall {
    pub class_id: ClassId,
    pub free_periods: u32,
    pub free_by_day: BTreeMap<DayOfWeek, u32>,
    pub subjects: Vec<SubjectAllocation>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffingNeed {
    pub subject_id: SubjectId,
    pub hours_needed: u32,
    pub qualified_teachers: u32,
    pub existing_capacity: u32,
    pub additional_teachers: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShortfallReport {
    pub free_periods: u32,
    pub classes: Vec<ClassShortfall>,
    pub staffing_needs: Vec<StaffingNeed>,
}
