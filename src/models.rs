use crate::dates::{calendar_day, calendar_day_opt, calendar_days};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExerciseSlot {
    Library {
        exercise_id: String,
        #[serde(default)]
        target: String,
    },
    FreeText {
        name: String,
        #[serde(default)]
        target: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DayTemplate {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub exercises: Vec<ExerciseSlot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanTemplate {
    pub id: String,
    pub name: String,
    #[serde(default = "default_weeks")]
    pub weeks: u32,
    #[serde(default)]
    pub days: Vec<DayTemplate>,
}

fn default_weeks() -> u32 {
    4
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Athlete,
    Coach,
    Admin,
}

/// An athlete together with their single plan assignment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Athlete {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub plan_id: Option<String>,
    #[serde(default, with = "calendar_day_opt")]
    pub plan_start_date: Option<NaiveDate>,
    #[serde(default, with = "calendar_days")]
    pub completed_dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub target: Option<String>,
}

/// One logged set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogEntry {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub exercise_id: Option<String>,
    #[serde(default)]
    pub exercise_name: Option<String>,
    #[serde(with = "calendar_day")]
    pub date: NaiveDate,
    #[serde(default)]
    pub week: Option<u32>,
    #[serde(default)]
    pub day_id: Option<String>,
    #[serde(default)]
    pub day_title: Option<String>,
    #[serde(default = "default_set_number")]
    pub set_number: u32,
    #[serde(default)]
    pub reps: u32,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub rpe: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
}

fn default_set_number() -> u32 {
    1
}

/// The whole persisted document.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    #[serde(default)]
    pub athletes: Vec<Athlete>,
    #[serde(default)]
    pub plans: Vec<PlanTemplate>,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
}

#[derive(Debug, Deserialize, Default)]
pub struct DateQuery {
    #[serde(default, with = "calendar_day_opt")]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ComplianceQuery {
    #[serde(default, with = "calendar_day_opt")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub plan_id: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CompleteRequest {
    #[serde(default, with = "calendar_day_opt")]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct NewLogEntry {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub exercise_id: Option<String>,
    #[serde(default)]
    pub exercise_name: Option<String>,
    #[serde(default, with = "calendar_day_opt")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub week: Option<u32>,
    #[serde(default)]
    pub day_id: Option<String>,
    #[serde(default)]
    pub day_title: Option<String>,
    #[serde(default)]
    pub set_number: Option<u32>,
    #[serde(default)]
    pub reps: Option<u32>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub rpe: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
}

/// Partial update of a logged set. An empty `exercise_id` clears it.
#[derive(Debug, Deserialize, Default)]
pub struct LogPatch {
    #[serde(default)]
    pub exercise_id: Option<String>,
    #[serde(default)]
    pub exercise_name: Option<String>,
    #[serde(default, with = "calendar_day_opt")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub week: Option<u32>,
    #[serde(default)]
    pub day_id: Option<String>,
    #[serde(default)]
    pub day_title: Option<String>,
    #[serde(default)]
    pub set_number: Option<u32>,
    #[serde(default)]
    pub reps: Option<u32>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub rpe: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    None,
    Exercise,
    User,
}

#[derive(Debug, Deserialize, Default)]
pub struct ReportQuery {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub exercise_id: Option<String>,
    #[serde(default, with = "calendar_day_opt")]
    pub from: Option<NaiveDate>,
    #[serde(default, with = "calendar_day_opt")]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub group_by: Option<GroupBy>,
    #[serde(default)]
    pub window: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct PlanSummary {
    pub id: String,
    pub name: String,
    pub weeks: u32,
}

#[derive(Debug, Serialize)]
pub struct PlanDayResponse {
    pub athlete_id: String,
    pub date: String,
    pub plan: Option<PlanSummary>,
    pub day_index: Option<usize>,
    pub day: Option<DayTemplate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CompletionResponse {
    pub athlete_id: String,
    pub date: String,
    pub completed_records: usize,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
pub struct Compliance {
    pub expected: u32,
    pub completed: u32,
    pub pct: u32,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComplianceResponse {
    Computed {
        expected: u32,
        completed: u32,
        pct: u32,
    },
    NotComputable {
        reason: String,
    },
}

impl From<Compliance> for ComplianceResponse {
    fn from(compliance: Compliance) -> Self {
        ComplianceResponse::Computed {
            expected: compliance.expected,
            completed: compliance.completed,
            pct: compliance.pct,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct WeeklyPoint {
    pub week: String,
    pub volume: f64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct GroupedWeeklyRow {
    pub week: String,
    pub volumes: BTreeMap<String, f64>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct GroupedWeeklyVolume {
    pub series_keys: Vec<String>,
    pub rows: Vec<GroupedWeeklyRow>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum VolumeResponse {
    Totals(Vec<WeeklyPoint>),
    Grouped(GroupedWeeklyVolume),
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DailyPoint {
    pub date: String,
    pub volume: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moving_average: Option<f64>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PersonalRecord {
    pub exercise: String,
    pub date: String,
    pub reps: u32,
    pub weight: f64,
    pub volume: f64,
}
