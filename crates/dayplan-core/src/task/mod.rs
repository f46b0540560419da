//! Task records as persisted by the task store, plus the projection the
//! timeline works with.
//!
//! Boundary JSON keeps the field names the web client speaks
//! (`start_date`, `end_date`, `task_type`); Rust code uses `start_at`,
//! `end_at` and `category`.

mod category;

pub use category::{CategoryRule, CategoryRules};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;
use crate::timeline::{ClockTime, MINUTES_PER_DAY};

/// Default duration for tasks that have a start but no end.
pub const DEFAULT_DURATION_MINUTES: i64 = 60;

/// Stable task identifier assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub i64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Completion state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "inprogress")]
    InProgress,
    #[serde(rename = "done")]
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "inprogress",
            Self::Done => "done",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "inprogress" | "in-progress" | "in_progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            _ => None,
        }
    }
}

/// Task type tag. Selects the auxiliary panel shown for a task; the
/// timeline ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    #[serde(alias = "bili")]
    Buy,
    Appointment,
    #[serde(alias = "punta")]
    Go,
    Study,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 4] = [Self::Buy, Self::Appointment, Self::Go, Self::Study];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Appointment => "appointment",
            Self::Go => "go",
            Self::Study => "study",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" | "bili" => Some(Self::Buy),
            "appointment" => Some(Self::Appointment),
            "go" | "punta" => Some(Self::Go),
            "study" => Some(Self::Study),
            _ => None,
        }
    }
}

/// A task as the store holds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub user_id: String,
    pub title: String,
    #[serde(rename = "start_date", default)]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(rename = "end_date", default)]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(rename = "due_date", default)]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(rename = "task_type", default)]
    pub category: Option<TaskCategory>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Applies `patch` and returns the result; `self` is untouched.
    pub fn patched(&self, patch: &TaskPatch) -> Task {
        let mut next = self.clone();
        if let Some(title) = &patch.title {
            next.title = title.clone();
        }
        if let Some(start) = patch.start_at {
            next.start_at = Some(start);
        }
        if let Some(end) = patch.end_at {
            next.end_at = Some(end);
        }
        if let Some(status) = patch.status {
            next.status = status;
        }
        if let Some(category) = patch.category {
            next.category = Some(category);
        }
        next
    }
}

/// Fields for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(rename = "start_date", default)]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(rename = "end_date", default)]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(rename = "due_date", default)]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(rename = "task_type", default)]
    pub category: Option<TaskCategory>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_times(mut self, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Self {
        self.start_at = Some(start);
        self.end_at = end;
        self
    }

    pub fn with_category(mut self, category: TaskCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// # Errors
    /// Empty title, or an end that is not after the start.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        check_range(self.start_at, self.end_at)
    }
}

/// Partial update. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "start_date", default, skip_serializing_if = "Option::is_none")]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(rename = "end_date", default, skip_serializing_if = "Option::is_none")]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(rename = "task_type", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<TaskCategory>,
}

impl TaskPatch {
    pub fn times(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start_at: Some(start),
            end_at: Some(end),
            ..Self::default()
        }
    }

    pub fn end(end: DateTime<Utc>) -> Self {
        Self {
            end_at: Some(end),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Checks the patch against the task it will be applied to.
    ///
    /// # Errors
    /// Empty title, or a resulting end that is not after the start.
    pub fn validate_against(&self, current: &Task) -> Result<(), ValidationError> {
        if matches!(&self.title, Some(title) if title.trim().is_empty()) {
            return Err(ValidationError::MissingField("title"));
        }
        let next = current.patched(self);
        check_range(next.start_at, next.end_at)
    }
}

fn check_range(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<(), ValidationError> {
    match (start, end) {
        (Some(start), Some(end)) if end <= start => {
            Err(ValidationError::InvalidTimeRange { start, end })
        }
        _ => Ok(()),
    }
}

/// Midnight UTC at the start of `date`.
pub fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc()
}

/// Timestamp `minutes` after midnight of `date`; values past 1440 land on
/// the following day.
pub fn at_minute(date: NaiveDate, minutes: i64) -> DateTime<Utc> {
    day_start(date) + Duration::minutes(minutes)
}

/// Parses a `YYYY-MM-DD` day slug.
///
/// # Errors
/// Anything that is not a calendar date in that format.
pub fn parse_day(slug: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(slug.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::MalformedDate(slug.to_string()))
}

/// A task placed on one day's timeline, in minutes since that day's
/// midnight. `end_minute` may exceed 1440 for tasks running past midnight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayTask {
    pub id: TaskId,
    pub title: String,
    pub start_minute: i64,
    pub end_minute: i64,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub category: Option<TaskCategory>,
}

impl DayTask {
    pub fn from_clock(id: TaskId, title: impl Into<String>, start: ClockTime, end: ClockTime) -> Self {
        Self {
            id,
            title: title.into(),
            start_minute: start.minutes(),
            end_minute: end.minutes(),
            status: TaskStatus::InProgress,
            category: None,
        }
    }

    /// Projects a stored task onto `date`. Tasks without a start have no
    /// place on the timeline; a missing end means a one-hour task.
    pub fn project(task: &Task, date: NaiveDate) -> Option<Self> {
        let start = task.start_at?;
        let end = task
            .end_at
            .unwrap_or(start + Duration::minutes(DEFAULT_DURATION_MINUTES));
        let midnight = day_start(date);
        Some(Self {
            id: task.id,
            title: task.title.clone(),
            start_minute: (start - midnight).num_minutes(),
            end_minute: (end - midnight).num_minutes(),
            status: task.status,
            category: task.category,
        })
    }

    pub fn start_time(&self) -> ClockTime {
        ClockTime::from_minutes(self.start_minute)
    }

    pub fn end_time(&self) -> ClockTime {
        ClockTime::from_minutes(self.end_minute)
    }

    pub fn duration_minutes(&self) -> i64 {
        self.end_minute - self.start_minute
    }

    /// Whether the start lies within `[00:00, 24:00)` of the projected day.
    pub fn starts_on_day(&self) -> bool {
        (0..MINUTES_PER_DAY).contains(&self.start_minute)
    }
}

/// Projects the tasks starting on `date`, keeping store order.
pub fn project_day(tasks: &[Task], date: NaiveDate) -> Vec<DayTask> {
    tasks
        .iter()
        .filter_map(|task| DayTask::project(task, date))
        .filter(DayTask::starts_on_day)
        .collect()
}
