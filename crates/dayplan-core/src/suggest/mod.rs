//! Schedule suggestions.
//!
//! [`ScheduleReconciler`] sends the day's tasks to a [`SuggestionSource`],
//! checks that the reply is a task array naming only tasks it asked about,
//! and writes the suggested times and categories back one task at a time.
//! A reply of the wrong shape rejects the whole batch. A single task that
//! fails to save is logged and left out of the result.

pub mod http;
mod prompt;
pub mod spacing;

pub use http::HttpSuggestionSource;
pub use prompt::{build_prompt, extract_json};
pub use spacing::{Slot, SpacingChecker, SpacingViolation};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

use crate::error::{CoreError, Result};
use crate::identity::Identity;
use crate::storage::{Config, TaskStore};
use crate::task::{CategoryRules, Task, TaskCategory, TaskId, TaskPatch, DEFAULT_DURATION_MINUTES};

/// What goes to the suggestion source.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestionRequest {
    pub prompt: String,
    pub tasks: Vec<Task>,
}

/// External collaborator that proposes a schedule for a set of tasks.
///
/// Implementations return the raw reply; shape checks happen in the
/// reconciler. May take several seconds.
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    async fn suggest(&self, request: &SuggestionRequest) -> Result<Value>;
}

/// One entry of a suggestion reply. Only the fields the reconciler takes
/// are read; anything else the source echoes back is ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Suggestion {
    pub id: TaskId,
    #[serde(rename = "start_date", default)]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(rename = "end_date", default)]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(rename = "task_type", default, deserialize_with = "lenient_category")]
    pub category: Option<TaskCategory>,
}

/// Unknown category names count as "no suggestion".
fn lenient_category<'de, D>(deserializer: D) -> std::result::Result<Option<TaskCategory>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(TaskCategory::parse))
}

/// Validates a reply against the ids that were sent.
///
/// # Errors
/// [`CoreError::InvalidResponse`] when the reply is not an array, an item
/// has no usable id, names a task that was not sent, or repeats one.
pub fn parse_suggestions(reply: Value, expected: &HashSet<TaskId>) -> Result<Vec<Suggestion>> {
    let Value::Array(items) = reply else {
        return Err(CoreError::InvalidResponse("expected a task array".into()));
    };

    let mut seen = HashSet::new();
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let suggestion: Suggestion = serde_json::from_value(item)
                .map_err(|e| CoreError::InvalidResponse(format!("item {i}: {e}")))?;
            if !expected.contains(&suggestion.id) {
                return Err(CoreError::InvalidResponse(format!(
                    "item {i}: task {} was not part of the request",
                    suggestion.id
                )));
            }
            if !seen.insert(suggestion.id) {
                return Err(CoreError::InvalidResponse(format!(
                    "item {i}: task {} appears twice",
                    suggestion.id
                )));
            }
            Ok(suggestion)
        })
        .collect()
}

/// A task whose suggested update could not be saved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedUpdate {
    pub task_id: TaskId,
    pub error: String,
}

/// Result of one reconciliation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    /// Tasks as stored after the update, in reply order.
    pub updated: Vec<Task>,
    pub failed: Vec<FailedUpdate>,
    /// Spacing problems found in the reply (logged, not enforced).
    pub violations: Vec<SpacingViolation>,
}

pub struct ScheduleReconciler<'a> {
    source: &'a dyn SuggestionSource,
    store: &'a dyn TaskStore,
    rules: CategoryRules,
    checker: SpacingChecker,
    min_gap_minutes: i64,
    enforce_spacing: bool,
}

impl<'a> ScheduleReconciler<'a> {
    pub fn new(source: &'a dyn SuggestionSource, store: &'a dyn TaskStore) -> Self {
        let min_gap_minutes = 15;
        Self {
            source,
            store,
            rules: CategoryRules::default(),
            checker: SpacingChecker::new().with_min_gap(min_gap_minutes),
            min_gap_minutes,
            enforce_spacing: false,
        }
    }

    pub fn from_config(source: &'a dyn SuggestionSource, store: &'a dyn TaskStore, config: &Config) -> Self {
        Self::new(source, store)
            .with_rules(config.categories.clone())
            .with_min_gap(config.suggestion.min_gap_minutes)
            .enforce_spacing(config.suggestion.enforce_spacing)
    }

    pub fn with_rules(mut self, rules: CategoryRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_min_gap(mut self, minutes: i64) -> Self {
        self.min_gap_minutes = minutes;
        self.checker = SpacingChecker::new().with_min_gap(minutes);
        self
    }

    /// Reject replies with spacing violations before anything is saved.
    pub fn enforce_spacing(mut self, enforce: bool) -> Self {
        self.enforce_spacing = enforce;
        self
    }

    /// Asks for a schedule covering `tasks` and saves what comes back.
    ///
    /// # Errors
    /// Upstream failures of the source, an invalid reply, or spacing
    /// violations when enforced. Failures saving individual tasks are not
    /// errors; they are listed in the report.
    pub async fn reconcile(&self, user: &Identity, tasks: &[Task]) -> Result<ReconcileReport> {
        if tasks.is_empty() {
            return Ok(ReconcileReport::default());
        }

        let hinted: Vec<Task> = tasks
            .iter()
            .map(|task| Task {
                category: task.category.or_else(|| self.rules.classify(&task.title)),
                ..task.clone()
            })
            .collect();
        let request = SuggestionRequest {
            prompt: build_prompt(&hinted, self.min_gap_minutes)?,
            tasks: hinted,
        };

        let reply = self.source.suggest(&request).await?;
        let by_id: HashMap<TaskId, &Task> = request.tasks.iter().map(|t| (t.id, t)).collect();
        let expected: HashSet<TaskId> = by_id.keys().copied().collect();
        let suggestions = parse_suggestions(reply, &expected)?;

        let patches: Vec<(TaskId, TaskPatch)> = suggestions
            .iter()
            .filter_map(|s| by_id.get(&s.id).map(|current| (s.id, resolve_patch(s, current))))
            .collect();

        let violations = self.check_spacing(&patches);
        if self.enforce_spacing && !violations.is_empty() {
            let summary: Vec<String> = violations.iter().map(ToString::to_string).collect();
            return Err(CoreError::InvalidResponse(format!(
                "suggested schedule violates spacing: {}",
                summary.join("; ")
            )));
        }

        let mut report = ReconcileReport {
            violations,
            ..ReconcileReport::default()
        };
        for (task_id, patch) in patches {
            match self.store.update(user, task_id, patch).await {
                Ok(task) => {
                    info!(%task_id, "suggested schedule saved");
                    report.updated.push(task);
                }
                Err(err) => {
                    warn!(%task_id, error = %err, "failed to save suggested schedule");
                    report.failed.push(FailedUpdate {
                        task_id,
                        error: err.to_string(),
                    });
                }
            }
        }
        Ok(report)
    }

    fn check_spacing(&self, patches: &[(TaskId, TaskPatch)]) -> Vec<SpacingViolation> {
        let slots: Vec<Slot> = patches
            .iter()
            .filter_map(|(id, patch)| {
                Some(Slot {
                    id: *id,
                    start: patch.start_at?,
                    end: patch.end_at?,
                })
            })
            .collect();
        let violations = self.checker.check(&slots);
        for violation in &violations {
            warn!(%violation, "suggested schedule is crowded");
        }
        violations
    }
}

/// Start, end and category for one task: the suggestion's values, else the
/// task's current ones. A start without any end gets the default duration.
fn resolve_patch(suggestion: &Suggestion, current: &Task) -> TaskPatch {
    let start_at = suggestion.start_at.or(current.start_at);
    let end_at = suggestion
        .end_at
        .or(current.end_at)
        .or_else(|| start_at.map(|s| s + Duration::minutes(DEFAULT_DURATION_MINUTES)));
    TaskPatch {
        start_at,
        end_at,
        category: suggestion.category.or(current.category),
        ..TaskPatch::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorClass;
    use crate::storage::InMemoryTaskStore;
    use crate::task::NewTask;
    use chrono::TimeZone;
    use serde_json::json;
    use std::sync::Mutex;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 15, h, m, 0).unwrap()
    }

    /// Returns a canned reply and remembers the request.
    struct CannedSource {
        reply: Value,
        seen: Mutex<Option<SuggestionRequest>>,
    }

    impl CannedSource {
        fn new(reply: Value) -> Self {
            Self {
                reply,
                seen: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl SuggestionSource for CannedSource {
        async fn suggest(&self, request: &SuggestionRequest) -> Result<Value> {
            *self.seen.lock().unwrap() = Some(request.clone());
            Ok(self.reply.clone())
        }
    }

    struct DownSource;

    #[async_trait]
    impl SuggestionSource for DownSource {
        async fn suggest(&self, _request: &SuggestionRequest) -> Result<Value> {
            Err(CoreError::upstream("suggestion source", "connection refused"))
        }
    }

    async fn seeded() -> (InMemoryTaskStore, Identity, Vec<Task>) {
        let store = InMemoryTaskStore::new();
        let user = Identity::new("alice").unwrap();
        let mut tasks = Vec::new();
        for (title, h) in [("Buy groceries", 9), ("Dentist appointment", 11)] {
            let task = store
                .create(&user, NewTask::new(title).with_times(at(h, 0), None))
                .await
                .unwrap();
            tasks.push(task);
        }
        (store, user, tasks)
    }

    #[test]
    fn parse_rejects_non_array_and_unknown_ids() {
        let expected: HashSet<TaskId> = [TaskId(1)].into_iter().collect();
        let err = parse_suggestions(json!({"id": 1}), &expected).unwrap_err();
        assert_eq!(err.class(), ErrorClass::InvalidResponse);

        let err = parse_suggestions(json!([{"id": 2}]), &expected).unwrap_err();
        assert_eq!(err.class(), ErrorClass::InvalidResponse);

        let err = parse_suggestions(json!([{"title": "no id"}]), &expected).unwrap_err();
        assert_eq!(err.class(), ErrorClass::InvalidResponse);

        let err = parse_suggestions(json!([{"id": 1}, {"id": 1}]), &expected).unwrap_err();
        assert_eq!(err.class(), ErrorClass::InvalidResponse);
    }

    #[test]
    fn parse_accepts_legacy_and_unknown_categories() {
        let expected: HashSet<TaskId> = [TaskId(1), TaskId(2)].into_iter().collect();
        let parsed = parse_suggestions(
            json!([
                {"id": 1, "task_type": "punta", "end_date": "2025-08-15T10:00:00.000Z"},
                {"id": 2, "task_type": "chores", "user_id": "ignored"}
            ]),
            &expected,
        )
        .unwrap();
        assert_eq!(parsed[0].category, Some(TaskCategory::Go));
        assert_eq!(parsed[0].end_at, Some(at(10, 0)));
        assert_eq!(parsed[1].category, None);
    }

    #[tokio::test]
    async fn reconcile_saves_suggested_fields() {
        let (store, user, tasks) = seeded().await;
        let source = CannedSource::new(json!([
            {"id": tasks[0].id, "start_date": "2025-08-15T09:00:00Z", "end_date": "2025-08-15T10:00:00Z", "task_type": "bili"},
            {"id": tasks[1].id, "start_date": "2025-08-15T11:00:00Z", "end_date": "2025-08-15T12:00:00Z"}
        ]));
        let reconciler = ScheduleReconciler::new(&source, &store);

        let report = reconciler.reconcile(&user, &tasks).await.unwrap();
        assert_eq!(report.updated.len(), 2);
        assert!(report.failed.is_empty());
        assert!(report.violations.is_empty());
        assert_eq!(report.updated[0].category, Some(TaskCategory::Buy));
        assert_eq!(report.updated[0].end_at, Some(at(10, 0)));
        // No category in the reply: the local keyword match is used.
        assert_eq!(report.updated[1].category, Some(TaskCategory::Appointment));

        let sent = source.seen.lock().unwrap().clone().unwrap();
        assert_eq!(sent.tasks[0].category, Some(TaskCategory::Buy));
        assert!(sent.prompt.contains("Buy groceries"));
    }

    #[tokio::test]
    async fn invalid_reply_saves_nothing() {
        let (store, user, tasks) = seeded().await;
        let source = CannedSource::new(json!({"text": "sorry"}));
        let err = ScheduleReconciler::new(&source, &store)
            .reconcile(&user, &tasks)
            .await
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::InvalidResponse);
        assert_eq!(store.list_all(&user).await.unwrap(), tasks);
    }

    #[tokio::test]
    async fn upstream_failure_propagates() {
        let (store, user, tasks) = seeded().await;
        let err = ScheduleReconciler::new(&DownSource, &store)
            .reconcile(&user, &tasks)
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn spacing_is_advisory_unless_enforced() {
        let (store, user, tasks) = seeded().await;
        let crowded = json!([
            {"id": tasks[0].id, "start_date": "2025-08-15T09:00:00Z", "end_date": "2025-08-15T10:00:00Z"},
            {"id": tasks[1].id, "start_date": "2025-08-15T10:05:00Z", "end_date": "2025-08-15T11:00:00Z"}
        ]);

        let source = CannedSource::new(crowded.clone());
        let report = ScheduleReconciler::new(&source, &store)
            .reconcile(&user, &tasks)
            .await
            .unwrap();
        assert_eq!(report.updated.len(), 2);
        assert_eq!(report.violations.len(), 1);

        let source = CannedSource::new(crowded);
        let err = ScheduleReconciler::new(&source, &store)
            .enforce_spacing(true)
            .reconcile(&user, &tasks)
            .await
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::InvalidResponse);
    }

    #[tokio::test]
    async fn empty_day_skips_the_source() {
        let store = InMemoryTaskStore::new();
        let user = Identity::new("alice").unwrap();
        let report = ScheduleReconciler::new(&DownSource, &store)
            .reconcile(&user, &[])
            .await
            .unwrap();
        assert!(report.updated.is_empty());
    }

    #[test]
    fn missing_end_gets_default_duration() {
        let task = Task {
            id: TaskId(1),
            user_id: "alice".into(),
            title: "Walk".into(),
            start_at: Some(at(9, 0)),
            end_at: None,
            due_at: None,
            status: Default::default(),
            category: None,
            created_at: Utc::now(),
        };
        let suggestion = Suggestion {
            id: TaskId(1),
            start_at: Some(at(13, 0)),
            end_at: None,
            category: None,
        };
        let patch = resolve_patch(&suggestion, &task);
        assert_eq!(patch.start_at, Some(at(13, 0)));
        assert_eq!(patch.end_at, Some(at(14, 0)));
    }
}
