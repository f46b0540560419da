//! Interactive day view: the task list for one visible day, pointer
//! gestures over it, and reconciliation with asynchronous persistence.
//!
//! The session is the single owner of the day's tasks. Gestures update the
//! list optimistically and hand back a [`PendingUpdate`] for the caller to
//! send to the task store; the store's answer comes back through
//! [`DaySession::apply_outcome`]. Every edit of a task carries a version
//! number, and answers for anything older than the task's latest version
//! are dropped, so a slow response can never overwrite a newer gesture.
//!
//! Each mutation swaps in a complete new task list. Layout is derived from
//! that list on demand and never sees a half-applied change.

pub mod gesture;

use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use crate::error::{CoreError, Result, ValidationError};
use crate::identity::Identity;
use crate::storage::{Config, TaskStore};
use crate::task::{at_minute, project_day, DayTask, Task, TaskId, TaskPatch};
use crate::timeline::{compute_layout, initial_scroll, LayoutRecord, TimeScale};

pub use gesture::Gesture;

/// Padding above the earliest task when the view first scrolls.
pub const DEFAULT_SCROLL_PADDING: f64 = 60.0;

/// Everything a day view needs to know about where it is. Created when the
/// view mounts and handed back by [`DaySession::close`] on navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct DayContext {
    pub identity: Identity,
    pub date: NaiveDate,
    pub scale: TimeScale,
    pub scroll_padding: f64,
}

impl DayContext {
    pub fn new(identity: Identity, date: NaiveDate, scale: TimeScale) -> Self {
        Self {
            identity,
            date,
            scale,
            scroll_padding: DEFAULT_SCROLL_PADDING,
        }
    }

    pub fn from_config(identity: Identity, date: NaiveDate, config: &Config) -> Self {
        Self {
            scroll_padding: config.timeline.scroll_padding,
            ..Self::new(identity, date, config.timeline.scale())
        }
    }

    /// Same user and geometry, another day.
    pub fn with_date(self, date: NaiveDate) -> Self {
        Self { date, ..self }
    }

    /// Opens a session over already-fetched tasks.
    pub fn open(self, tasks: &[Task]) -> DaySession {
        DaySession::new(self, tasks)
    }

    /// Fetches the day from `store` and opens a session over it.
    ///
    /// # Errors
    /// Whatever the store reports.
    pub async fn load(self, store: &dyn TaskStore) -> Result<DaySession> {
        let tasks = store.list_for_day(&self.identity, self.date).await?;
        Ok(self.open(&tasks))
    }
}

/// An update the session has applied locally and wants persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingUpdate {
    pub task_id: TaskId,
    pub version: u64,
    pub patch: TaskPatch,
}

impl PendingUpdate {
    /// Sends the update. Never retries; the outcome goes back to
    /// [`DaySession::apply_outcome`].
    pub async fn send(self, store: &dyn TaskStore, user: &Identity) -> PersistOutcome {
        let result = store.update(user, self.task_id, self.patch.clone()).await;
        PersistOutcome {
            task_id: self.task_id,
            version: self.version,
            patch: self.patch,
            result,
        }
    }
}

/// The store's answer to a [`PendingUpdate`].
#[derive(Debug)]
pub struct PersistOutcome {
    pub task_id: TaskId,
    pub version: u64,
    pub patch: TaskPatch,
    pub result: Result<Task>,
}

/// What [`DaySession::apply_outcome`] did with an answer.
#[derive(Debug)]
pub enum Settlement {
    /// The stored task replaced the optimistic one.
    Confirmed,
    /// A newer edit of the task exists; the answer was ignored.
    Stale,
    /// The task went back to its last confirmed state.
    RolledBack(CoreError),
    /// Optimistic state kept; [`DaySession::retry`] can resend it.
    RetryPending(CoreError),
}

pub struct DaySession {
    ctx: DayContext,
    tasks: Vec<DayTask>,
    /// Last state the store agreed to, per task.
    confirmed: HashMap<TaskId, DayTask>,
    /// Latest version handed out, per task.
    versions: HashMap<TaskId, u64>,
    /// Patches whose persistence failed upstream.
    failed: HashMap<TaskId, TaskPatch>,
    gesture: Gesture,
    scrolled: bool,
}

impl DaySession {
    pub fn new(ctx: DayContext, tasks: &[Task]) -> Self {
        let tasks = project_day(tasks, ctx.date);
        let confirmed = tasks.iter().map(|t| (t.id, t.clone())).collect();
        debug!(date = %ctx.date, tasks = tasks.len(), "day session opened");
        Self {
            ctx,
            tasks,
            confirmed,
            versions: HashMap::new(),
            failed: HashMap::new(),
            gesture: Gesture::Idle,
            scrolled: false,
        }
    }

    pub fn context(&self) -> &DayContext {
        &self.ctx
    }

    pub fn date(&self) -> NaiveDate {
        self.ctx.date
    }

    pub fn scale(&self) -> &TimeScale {
        &self.ctx.scale
    }

    pub fn tasks(&self) -> &[DayTask] {
        &self.tasks
    }

    pub fn task(&self, id: TaskId) -> Option<&DayTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Layout of the current task list, widest first.
    pub fn layout(&self) -> Vec<LayoutRecord> {
        compute_layout(&self.tasks, &self.ctx.scale)
    }

    /// Scroll offset for the first paint. Yields a value once, and only
    /// when the day has tasks.
    pub fn initial_scroll(&mut self) -> Option<f64> {
        if self.scrolled {
            return None;
        }
        let offset = initial_scroll(&self.tasks, &self.ctx.scale, self.ctx.scroll_padding)?;
        self.scrolled = true;
        Some(offset)
    }

    /// Tasks with a failed update waiting for [`retry`](Self::retry).
    pub fn pending_retries(&self) -> Vec<TaskId> {
        let mut ids: Vec<TaskId> = self.failed.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Tears the session down. Unsettled updates are forgotten.
    pub fn close(self) -> DayContext {
        debug!(date = %self.ctx.date, "day session closed");
        self.ctx
    }

    // =========================================================================
    // Drag
    // =========================================================================

    /// # Errors
    /// Another gesture is active, or the task is not on this day.
    pub fn begin_drag(&mut self, task_id: TaskId) -> Result<(), ValidationError> {
        self.expect_idle()?;
        self.require_task(task_id)?;
        self.transition(Gesture::Dragging { task_id });
        Ok(())
    }

    /// Ends the drag with a vertical pointer delta. Horizontal movement has
    /// no meaning on the timeline and is not taken.
    ///
    /// # Errors
    /// No drag is active.
    pub fn drag_end(&mut self, delta: f64) -> Result<PendingUpdate, ValidationError> {
        let Gesture::Dragging { task_id } = self.gesture else {
            return Err(self.conflict("drag_end"));
        };
        let task = self.require_task(task_id)?.clone();
        self.transition(Gesture::Idle);

        let start = gesture::drag_start_minute(&task, delta, &self.ctx.scale);
        let end = start + task.duration_minutes();
        self.replace_task(DayTask {
            start_minute: start,
            end_minute: end,
            ..task
        });

        let patch = TaskPatch::times(at_minute(self.ctx.date, start), at_minute(self.ctx.date, end));
        Ok(self.issue(task_id, patch))
    }

    /// `begin_drag` followed by `drag_end`.
    ///
    /// # Errors
    /// Same as the two steps.
    pub fn move_task(&mut self, task_id: TaskId, delta: f64) -> Result<PendingUpdate, ValidationError> {
        self.begin_drag(task_id)?;
        self.drag_end(delta)
    }

    // =========================================================================
    // Resize
    // =========================================================================

    /// # Errors
    /// Another gesture is active, or the task is not on this day.
    pub fn begin_resize(&mut self, task_id: TaskId) -> Result<(), ValidationError> {
        self.expect_idle()?;
        let original = self.require_task(task_id)?.clone();
        self.transition(Gesture::Resizing { task_id, original });
        Ok(())
    }

    /// Follows the pointer. Only local state changes; returns the new end
    /// coordinate.
    ///
    /// # Errors
    /// No resize is active.
    pub fn resize_move(&mut self, pointer_y: f64, scroll_top: f64) -> Result<f64, ValidationError> {
        let Gesture::Resizing { task_id, .. } = self.gesture else {
            return Err(self.conflict("resize_move"));
        };
        let (_, end_coord) = self.resize_to(task_id, pointer_y, scroll_top)?;
        Ok(end_coord)
    }

    /// Finishes the resize. The only point of a resize that produces an
    /// update.
    ///
    /// # Errors
    /// No resize is active.
    pub fn resize_end(&mut self, pointer_y: f64, scroll_top: f64) -> Result<PendingUpdate, ValidationError> {
        let Gesture::Resizing { task_id, .. } = self.gesture else {
            return Err(self.conflict("resize_end"));
        };
        let (end, _) = self.resize_to(task_id, pointer_y, scroll_top)?;
        self.transition(Gesture::Idle);
        Ok(self.issue(task_id, TaskPatch::end(at_minute(self.ctx.date, end))))
    }

    /// Whole resize in one step, with the pointer at content coordinate
    /// `end_coord`.
    ///
    /// # Errors
    /// Same as the individual steps.
    pub fn resize_task(&mut self, task_id: TaskId, end_coord: f64) -> Result<PendingUpdate, ValidationError> {
        self.begin_resize(task_id)?;
        self.resize_end(end_coord, 0.0)
    }

    fn resize_to(&mut self, task_id: TaskId, pointer_y: f64, scroll_top: f64) -> Result<(i64, f64), ValidationError> {
        let task = self.require_task(task_id)?.clone();
        let scale = self.ctx.scale;
        let top = scale.minutes_to_coord(task.start_minute);
        let end_coord = gesture::resize_end_coord(top, gesture::content_coord(pointer_y, scroll_top), &scale);
        let end = gesture::resize_end_minute(end_coord, &scale);
        self.replace_task(DayTask {
            end_minute: end,
            ..task
        });
        Ok((end, end_coord))
    }

    /// Abandons the active gesture. A resize puts the task back the way it
    /// was on pointer-down.
    pub fn cancel(&mut self) {
        if let Gesture::Resizing { original, .. } = std::mem::take(&mut self.gesture) {
            self.replace_task(original);
        }
        debug!("gesture cancelled");
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Folds a store answer back into the day.
    pub fn apply_outcome(&mut self, outcome: PersistOutcome) -> Settlement {
        let PersistOutcome {
            task_id,
            version,
            patch,
            result,
        } = outcome;

        let latest = self.versions.get(&task_id).copied().unwrap_or(0);
        if version < latest {
            debug!(%task_id, version, latest, "discarding stale response");
            return Settlement::Stale;
        }

        match result {
            Ok(task) => {
                self.failed.remove(&task_id);
                self.merge_confirmed(&[task]);
                info!(%task_id, version, "update persisted");
                Settlement::Confirmed
            }
            Err(err) if err.is_retryable() => {
                warn!(%task_id, version, error = %err, "update not persisted, retry available");
                self.failed.insert(task_id, patch);
                Settlement::RetryPending(err)
            }
            Err(err) => {
                warn!(%task_id, version, error = %err, "update rejected, rolling back");
                self.failed.remove(&task_id);
                if let Some(previous) = self.confirmed.get(&task_id).cloned() {
                    self.replace_task(previous);
                }
                Settlement::RolledBack(err)
            }
        }
    }

    /// Reissues a failed update under a fresh version.
    pub fn retry(&mut self, task_id: TaskId) -> Option<PendingUpdate> {
        let patch = self.failed.remove(&task_id)?;
        debug!(%task_id, "retrying update");
        Some(self.issue(task_id, patch))
    }

    /// Merges reconciled tasks in one step. Older in-flight updates of the
    /// same tasks become stale.
    pub fn apply_suggestions(&mut self, tasks: &[Task]) {
        for task in tasks {
            self.bump_version(task.id);
            self.failed.remove(&task.id);
        }
        self.merge_confirmed(tasks);
        info!(tasks = tasks.len(), "suggested schedule applied");
    }

    /// Replaces the whole day with a fresh fetch.
    pub fn reload(&mut self, tasks: &[Task]) {
        let next = project_day(tasks, self.ctx.date);
        self.confirmed = next.iter().map(|t| (t.id, t.clone())).collect();
        self.failed.clear();
        for task in &next {
            self.bump_version(task.id);
        }
        self.tasks = next;
        self.gesture = Gesture::Idle;
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn issue(&mut self, task_id: TaskId, patch: TaskPatch) -> PendingUpdate {
        let version = self.bump_version(task_id);
        debug!(%task_id, version, "update issued");
        PendingUpdate {
            task_id,
            version,
            patch,
        }
    }

    fn bump_version(&mut self, task_id: TaskId) -> u64 {
        let version = self.versions.entry(task_id).or_insert(0);
        *version += 1;
        *version
    }

    /// Stored tasks replace their local copies. Tasks that moved off this
    /// day leave the list; tasks that landed on it join at the end, in the
    /// order given.
    fn merge_confirmed(&mut self, stored: &[Task]) {
        let date = self.ctx.date;
        let updates: HashMap<TaskId, Option<DayTask>> = stored
            .iter()
            .map(|task| (task.id, DayTask::project(task, date).filter(DayTask::starts_on_day)))
            .collect();

        let mut next: Vec<DayTask> = self
            .tasks
            .iter()
            .filter_map(|task| match updates.get(&task.id) {
                Some(update) => update.clone(),
                None => Some(task.clone()),
            })
            .collect();

        let held: HashSet<TaskId> = self.tasks.iter().map(|task| task.id).collect();
        for task in stored {
            if held.contains(&task.id) || next.iter().any(|t| t.id == task.id) {
                continue;
            }
            if let Some(Some(joined)) = updates.get(&task.id) {
                debug!(task_id = %task.id, "task joined the day");
                next.push(joined.clone());
            }
        }

        for (id, update) in &updates {
            match update {
                Some(task) => {
                    self.confirmed.insert(*id, task.clone());
                }
                None => {
                    self.confirmed.remove(id);
                }
            }
        }
        self.tasks = next;
    }

    fn replace_task(&mut self, replacement: DayTask) {
        self.tasks = self
            .tasks
            .iter()
            .map(|task| {
                if task.id == replacement.id {
                    replacement.clone()
                } else {
                    task.clone()
                }
            })
            .collect();
    }

    fn require_task(&self, task_id: TaskId) -> Result<&DayTask, ValidationError> {
        self.task(task_id)
            .ok_or(ValidationError::NotOnTimeline(task_id))
    }

    fn expect_idle(&self) -> Result<(), ValidationError> {
        match self.gesture {
            Gesture::Idle => Ok(()),
            _ => Err(self.conflict("begin")),
        }
    }

    fn conflict(&self, event: &str) -> ValidationError {
        ValidationError::GestureConflict(format!("{event} while {}", self.gesture.name()))
    }

    fn transition(&mut self, next: Gesture) {
        debug!(from = self.gesture.name(), to = next.name(), "gesture");
        self.gesture = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorClass;
    use crate::task::TaskStatus;
    use chrono::{DateTime, TimeZone, Utc};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 15).unwrap()
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 15, h, m, 0).unwrap()
    }

    fn stored(id: i64, start: (u32, u32), end: (u32, u32)) -> Task {
        Task {
            id: TaskId(id),
            user_id: "alice".into(),
            title: format!("task {id}"),
            start_at: Some(at(start.0, start.1)),
            end_at: Some(at(end.0, end.1)),
            due_at: None,
            status: TaskStatus::InProgress,
            category: None,
            created_at: Utc::now(),
        }
    }

    fn session(tasks: &[Task]) -> DaySession {
        let identity = Identity::new("alice").unwrap();
        DayContext::new(identity, date(), TimeScale::default()).open(tasks)
    }

    fn outcome(pending: &PendingUpdate, result: Result<Task>) -> PersistOutcome {
        PersistOutcome {
            task_id: pending.task_id,
            version: pending.version,
            patch: pending.patch.clone(),
            result,
        }
    }

    #[test]
    fn drag_moves_and_keeps_duration() {
        let mut s = session(&[stored(1, (9, 0), (10, 0))]);
        let pending = s.move_task(TaskId(1), 47.0).unwrap();

        let task = s.task(TaskId(1)).unwrap();
        assert_eq!(task.start_time().to_string(), "09:45");
        assert_eq!(task.end_time().to_string(), "10:45");
        assert_eq!(pending.patch, TaskPatch::times(at(9, 45), at(10, 45)));
        assert_eq!(pending.version, 1);
        assert_eq!(s.gesture(), &Gesture::Idle);
    }

    #[test]
    fn gesture_conflicts_are_rejected() {
        let mut s = session(&[stored(1, (9, 0), (10, 0)), stored(2, (11, 0), (12, 0))]);
        s.begin_drag(TaskId(1)).unwrap();
        assert!(matches!(
            s.begin_resize(TaskId(2)),
            Err(ValidationError::GestureConflict(_))
        ));
        assert!(matches!(
            s.resize_end(0.0, 0.0),
            Err(ValidationError::GestureConflict(_))
        ));
        s.cancel();
        assert!(matches!(
            s.begin_drag(TaskId(9)),
            Err(ValidationError::NotOnTimeline(TaskId(9)))
        ));
    }

    #[test]
    fn resize_moves_are_local_and_end_issues_once() {
        let mut s = session(&[stored(1, (9, 0), (10, 0))]);
        s.begin_resize(TaskId(1)).unwrap();
        // Pointer at 100 in a container scrolled to 500: content 600.
        assert_eq!(s.resize_move(100.0, 500.0).unwrap(), 600.0);
        assert_eq!(s.resize_move(152.0, 500.0).unwrap(), 645.0);
        assert_eq!(s.task(TaskId(1)).unwrap().end_minute, 645);
        assert!(s.versions.is_empty());

        let pending = s.resize_end(170.0, 500.0).unwrap();
        assert_eq!(pending.patch, TaskPatch::end(at(11, 15)));
        assert_eq!(pending.version, 1);
        assert_eq!(s.gesture(), &Gesture::Idle);
    }

    #[test]
    fn resize_never_goes_below_minimum() {
        let mut s = session(&[stored(1, (9, 0), (10, 0))]);
        s.resize_task(TaskId(1), 0.0).unwrap();
        let layout = s.layout();
        assert_eq!(layout[0].height, 15.0);
        assert_eq!(s.task(TaskId(1)).unwrap().end_time().to_string(), "09:15");
    }

    #[test]
    fn cancel_restores_resized_task() {
        let mut s = session(&[stored(1, (9, 0), (10, 0))]);
        s.begin_resize(TaskId(1)).unwrap();
        s.resize_move(800.0, 0.0).unwrap();
        s.cancel();
        assert_eq!(s.task(TaskId(1)).unwrap().end_minute, 600);
        assert_eq!(s.gesture(), &Gesture::Idle);
    }

    #[test]
    fn late_response_for_superseded_edit_is_discarded() {
        let mut s = session(&[stored(1, (9, 0), (10, 0))]);
        let first = s.move_task(TaskId(1), 60.0).unwrap();
        let second = s.move_task(TaskId(1), 60.0).unwrap();

        let confirmed = s.apply_outcome(outcome(&second, Ok(stored(1, (11, 0), (12, 0)))));
        assert!(matches!(confirmed, Settlement::Confirmed));

        let stale = s.apply_outcome(outcome(&first, Ok(stored(1, (10, 0), (11, 0)))));
        assert!(matches!(stale, Settlement::Stale));
        assert_eq!(s.task(TaskId(1)).unwrap().start_time().to_string(), "11:00");
    }

    #[test]
    fn unauthorized_rolls_back_to_confirmed() {
        let mut s = session(&[stored(1, (9, 0), (10, 0))]);
        let pending = s.move_task(TaskId(1), 120.0).unwrap();
        let settled = s.apply_outcome(outcome(
            &pending,
            Err(CoreError::Unauthorized { task_id: TaskId(1) }),
        ));
        match settled {
            Settlement::RolledBack(err) => {
                assert_eq!(err.class(), ErrorClass::NotFoundOrUnauthorized)
            }
            other => panic!("unexpected settlement: {other:?}"),
        }
        assert_eq!(s.task(TaskId(1)).unwrap().start_minute, 540);
        assert!(s.pending_retries().is_empty());
    }

    #[test]
    fn upstream_failure_keeps_state_and_allows_retry() {
        let mut s = session(&[stored(1, (9, 0), (10, 0))]);
        let pending = s.move_task(TaskId(1), 120.0).unwrap();
        let settled = s.apply_outcome(outcome(
            &pending,
            Err(CoreError::upstream("task store", "timeout")),
        ));
        assert!(matches!(settled, Settlement::RetryPending(_)));
        assert_eq!(s.task(TaskId(1)).unwrap().start_minute, 660);
        assert_eq!(s.pending_retries(), vec![TaskId(1)]);

        let again = s.retry(TaskId(1)).unwrap();
        assert_eq!(again.patch, pending.patch);
        assert!(again.version > pending.version);
        assert!(s.retry(TaskId(1)).is_none());
    }

    #[test]
    fn suggestions_supersede_in_flight_updates() {
        let mut s = session(&[stored(1, (9, 0), (10, 0)), stored(2, (10, 0), (11, 0))]);
        let pending = s.move_task(TaskId(1), 30.0).unwrap();

        s.apply_suggestions(&[stored(1, (14, 0), (15, 0))]);
        assert_eq!(s.task(TaskId(1)).unwrap().start_minute, 840);

        let settled = s.apply_outcome(outcome(&pending, Ok(stored(1, (9, 30), (10, 30)))));
        assert!(matches!(settled, Settlement::Stale));
        assert_eq!(s.task(TaskId(1)).unwrap().start_minute, 840);
        assert_eq!(s.task(TaskId(2)).unwrap().start_minute, 600);
    }

    #[test]
    fn task_moved_to_other_day_leaves_session() {
        let mut s = session(&[stored(1, (9, 0), (10, 0))]);
        let mut moved = stored(1, (9, 0), (10, 0));
        moved.start_at = Some(Utc.with_ymd_and_hms(2025, 8, 16, 9, 0, 0).unwrap());
        moved.end_at = Some(Utc.with_ymd_and_hms(2025, 8, 16, 10, 0, 0).unwrap());
        s.apply_suggestions(&[moved]);
        assert!(s.tasks().is_empty());
    }

    #[test]
    fn suggestion_landing_on_the_day_joins_it() {
        let mut s = session(&[stored(1, (9, 0), (10, 0))]);
        s.apply_suggestions(&[stored(2, (11, 0), (12, 0))]);

        let ids: Vec<TaskId> = s.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![TaskId(1), TaskId(2)]);
        assert_eq!(s.task(TaskId(2)).unwrap().start_time().to_string(), "11:00");
        assert_eq!(s.layout().len(), 2);

        // Confirmed state is tracked for the newcomer, so a later rejection
        // rolls back to it.
        let pending = s.move_task(TaskId(2), 60.0).unwrap();
        let err = CoreError::Unauthorized { task_id: TaskId(2) };
        assert!(matches!(s.apply_outcome(outcome(&pending, Err(err))), Settlement::RolledBack(_)));
        assert_eq!(s.task(TaskId(2)).unwrap().start_time().to_string(), "11:00");
    }

    #[test]
    fn tasks_for_other_days_do_not_join() {
        let mut s = session(&[stored(1, (9, 0), (10, 0))]);
        let mut tomorrow = stored(2, (11, 0), (12, 0));
        tomorrow.start_at = tomorrow.start_at.map(|t| t + chrono::Duration::days(1));
        tomorrow.end_at = tomorrow.end_at.map(|t| t + chrono::Duration::days(1));
        s.apply_suggestions(&[tomorrow]);
        assert_eq!(s.tasks().len(), 1);
    }

    #[test]
    fn zero_length_task_dragged_down_stays_on_the_day() {
        let mut s = session(&[stored(1, (9, 0), (9, 0))]);
        let pending = s.move_task(TaskId(1), 5000.0).unwrap();
        assert_eq!(pending.patch, TaskPatch::times(at(23, 45), at(23, 45)));

        let layout = s.layout();
        assert_eq!(layout[0].top, 1425.0);
        assert!(layout[0].top + layout[0].height <= s.scale().timeline_height());
    }

    #[test]
    fn initial_scroll_is_one_shot() {
        let mut s = session(&[stored(1, (9, 0), (10, 0)), stored(2, (7, 30), (8, 0))]);
        assert_eq!(s.initial_scroll(), Some(390.0));
        assert_eq!(s.initial_scroll(), None);

        let mut empty = session(&[]);
        assert_eq!(empty.initial_scroll(), None);
    }

    #[test]
    fn close_returns_context_for_navigation() {
        let s = session(&[stored(1, (9, 0), (10, 0))]);
        let next_day = date().succ_opt().unwrap();
        let ctx = s.close().with_date(next_day);
        assert_eq!(ctx.date, next_day);
        assert!(ctx.open(&[stored(1, (9, 0), (10, 0))]).tasks().is_empty());
    }
}
