//! Visual layout of a day's tasks.
//!
//! Widths step down by a fixed 25% per column instead of splitting evenly,
//! and narrower cards are anchored to the right edge and stacked above the
//! wider ones they overlap.

use serde::Serialize;

use super::packer::{pack, ColumnSlot, Interval};
use super::scale::TimeScale;
use crate::task::{DayTask, TaskId};

const WIDTH_STEP_PERCENT: f64 = 25.0;
const MIN_WIDTH_PERCENT: f64 = 25.0;
const STACK_BASE: i32 = 1000;

/// Placement of one task card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutRecord {
    pub task_id: TaskId,
    pub top: f64,
    pub height: f64,
    pub column: ColumnSlot,
    pub width_percent: f64,
    pub left_percent: f64,
    /// Higher values paint above lower ones.
    pub stack_order: i32,
}

/// `100` for a lone card, otherwise `max(100 - index * 25, 25)`.
pub fn width_percent(slot: ColumnSlot) -> f64 {
    if slot.size == 1 {
        return 100.0;
    }
    (100.0 - slot.index as f64 * WIDTH_STEP_PERCENT).max(MIN_WIDTH_PERCENT)
}

/// Derives one record per task, ordered widest first for painting.
///
/// This is a pure function of `tasks`; any change to the task set means
/// calling it again.
pub fn compute_layout(tasks: &[DayTask], scale: &TimeScale) -> Vec<LayoutRecord> {
    let intervals: Vec<Interval> = tasks
        .iter()
        .map(|task| Interval::new(task.id, task.start_minute, task.end_minute))
        .collect();
    let slots = pack(&intervals);

    let mut records: Vec<LayoutRecord> = tasks
        .iter()
        .zip(slots)
        .map(|(task, column)| {
            let top = scale.minutes_to_coord(task.start_minute);
            let bottom = scale.minutes_to_coord(task.end_minute);
            let width = width_percent(column);
            LayoutRecord {
                task_id: task.id,
                top,
                height: (bottom - top).max(scale.min_height),
                column,
                width_percent: width,
                left_percent: (100.0 - width).max(0.0),
                stack_order: STACK_BASE - width.round() as i32,
            }
        })
        .collect();

    // Stable, so equal widths keep task order.
    records.sort_by(|a, b| b.width_percent.total_cmp(&a.width_percent));

    tracing::debug!(tasks = tasks.len(), "layout recomputed");
    records
}

/// Scroll offset that brings the earliest task into view with `padding`
/// above it. `None` for an empty day.
pub fn initial_scroll(tasks: &[DayTask], scale: &TimeScale, padding: f64) -> Option<f64> {
    tasks
        .iter()
        .map(|task| scale.minutes_to_coord(task.start_minute))
        .min_by(f64::total_cmp)
        .map(|top| (top - padding).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;

    fn task(id: i64, start: &str, end: &str) -> DayTask {
        DayTask::from_clock(
            TaskId(id),
            format!("task {id}"),
            start.parse().unwrap(),
            end.parse().unwrap(),
        )
    }

    fn by_id(records: &[LayoutRecord], id: i64) -> &LayoutRecord {
        records.iter().find(|r| r.task_id == TaskId(id)).unwrap()
    }

    #[test]
    fn width_steps_down_and_clamps() {
        let widths: Vec<f64> = (0..6)
            .map(|index| width_percent(ColumnSlot { index, size: 6 }))
            .collect();
        assert_eq!(widths, vec![100.0, 75.0, 50.0, 25.0, 25.0, 25.0]);
        assert_eq!(width_percent(ColumnSlot::FULL), 100.0);
    }

    #[test]
    fn two_overlapping_tasks() {
        let tasks = vec![task(1, "09:00", "10:00"), task(2, "09:15", "10:15")];
        let records = compute_layout(&tasks, &TimeScale::default());

        let first = by_id(&records, 1);
        assert_eq!(first.column, ColumnSlot { index: 0, size: 2 });
        assert_eq!(first.width_percent, 100.0);
        assert_eq!(first.left_percent, 0.0);
        assert_eq!(first.top, 540.0);
        assert_eq!(first.height, 60.0);

        let second = by_id(&records, 2);
        assert_eq!(second.column, ColumnSlot { index: 1, size: 2 });
        assert_eq!(second.width_percent, 75.0);
        assert_eq!(second.left_percent, 25.0);
        assert!(second.stack_order > first.stack_order);
    }

    #[test]
    fn paint_order_is_widest_first() {
        let tasks = vec![
            task(1, "09:30", "10:30"),
            task(2, "09:00", "11:00"),
            task(3, "09:45", "10:00"),
        ];
        let records = compute_layout(&tasks, &TimeScale::default());
        let widths: Vec<f64> = records.iter().map(|r| r.width_percent).collect();
        assert_eq!(widths, vec![100.0, 75.0, 50.0]);
        assert_eq!(records[0].task_id, TaskId(2));
    }

    #[test]
    fn short_and_inverted_tasks_get_min_height() {
        let tasks = vec![task(1, "10:00", "09:00"), task(2, "12:00", "12:05")];
        let records = compute_layout(&tasks, &TimeScale::default());
        assert_eq!(by_id(&records, 1).height, 15.0);
        assert_eq!(by_id(&records, 2).height, 15.0);
    }

    #[test]
    fn scroll_to_earliest_with_padding() {
        let scale = TimeScale::default();
        let tasks = vec![task(1, "13:00", "14:00"), task(2, "08:30", "09:00")];
        assert_eq!(initial_scroll(&tasks, &scale, 60.0), Some(450.0));
        assert_eq!(initial_scroll(&[task(3, "00:30", "01:00")], &scale, 60.0), Some(0.0));
        assert_eq!(initial_scroll(&[], &scale, 60.0), None);
    }

    #[test]
    fn done_tasks_still_laid_out() {
        let mut done = task(1, "09:00", "10:00");
        done.status = TaskStatus::Done;
        assert_eq!(compute_layout(&[done], &TimeScale::default()).len(), 1);
    }
}
