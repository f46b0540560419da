//! # Dayplan Core Library
//!
//! This library provides the day-timeline engine behind the Dayplan planner.
//! All operations are available through the standalone `dayplan` CLI; other
//! front ends are thin layers over the same core.
//!
//! ## Architecture
//!
//! - **Timeline**: coordinate mapping with grid snapping, overlap packing and
//!   the per-task layout derived from them
//! - **Session**: the visible day's task list, drag and resize gestures, and
//!   versioned reconciliation with asynchronous persistence
//! - **Suggest**: batch schedule suggestions from an external source, merged
//!   back task by task
//! - **Storage**: SQLite task store and TOML configuration
//!
//! ## Key Components
//!
//! - [`TimeScale`]: time/coordinate conversion
//! - [`compute_layout`]: layout records for a day
//! - [`DaySession`]: gesture state machine and optimistic updates
//! - [`ScheduleReconciler`]: suggestion validation and write-back
//! - [`TaskStore`]: persistence collaborator, with [`TaskDb`] and
//!   [`InMemoryTaskStore`] implementations
//! - [`Config`]: application configuration management

pub mod error;
pub mod identity;
pub mod session;
pub mod storage;
pub mod suggest;
pub mod task;
pub mod timeline;
pub mod week;

pub use error::{ConfigError, CoreError, DatabaseError, ErrorClass, Result, ValidationError};
pub use identity::Identity;
pub use session::{DayContext, DaySession, Gesture, PendingUpdate, PersistOutcome, Settlement};
pub use storage::{Config, InMemoryTaskStore, TaskDb, TaskStore};
pub use suggest::{
    HttpSuggestionSource, ReconcileReport, ScheduleReconciler, SuggestionRequest, SuggestionSource,
};
pub use task::{
    CategoryRule, CategoryRules, DayTask, NewTask, Task, TaskCategory, TaskId, TaskPatch,
    TaskStatus,
};
pub use timeline::{
    compute_layout, hour_label, pack, ClockTime, ColumnSlot, Interval, LayoutRecord,
    NowIndicator, TimeScale,
};
pub use week::{Week, WeekDay};
