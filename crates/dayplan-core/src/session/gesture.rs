//! Pointer gesture state and the geometry of drag and resize.
//!
//! Nothing here knows about input events. Callers translate whatever their
//! framework delivers into `begin`, `move` and `end` calls on the session.

use crate::task::{DayTask, TaskId};
use crate::timeline::TimeScale;

/// Gesture state of the day view. At most one task is being manipulated.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging {
        task_id: TaskId,
    },
    Resizing {
        task_id: TaskId,
        /// Task as it was on pointer-down, restored on cancel.
        original: DayTask,
    },
}

impl Gesture {
    pub fn task_id(&self) -> Option<TaskId> {
        match self {
            Self::Idle => None,
            Self::Dragging { task_id } | Self::Resizing { task_id, .. } => Some(*task_id),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dragging { .. } => "dragging",
            Self::Resizing { .. } => "resizing",
        }
    }
}

/// Pointer position converted to a coordinate on the scrolled content.
pub fn content_coord(pointer_y: f64, scroll_top: f64) -> f64 {
    pointer_y + scroll_top
}

/// New start minute for `task` moved vertically by `delta`.
///
/// The card's rendered height is `max(duration * ppm, min_height)`. Its top
/// is clamped to `[0, timeline_height - height]` and snapped; a snap that
/// rounds past the latest start steps back grid lines until the whole card
/// fits again.
pub fn drag_start_minute(task: &DayTask, delta: f64, scale: &TimeScale) -> i64 {
    let duration = task.duration_minutes().max(0);
    let height = (duration as f64 * scale.px_per_minute).max(scale.min_height);
    let max_top = (scale.timeline_height() - height).max(0.0);
    let top = scale.minutes_to_coord(task.start_minute);
    let target = (top + delta).clamp(0.0, max_top);

    let first = scale.first_minute();
    // Absorb float noise before rounding down.
    let last = first + (max_top / scale.px_per_minute + 1e-9).floor() as i64;
    let mut start = scale.coord_to_snapped_minutes(target);
    while start > last && start > first {
        start -= scale.snap_step();
    }
    start.max(first)
}

/// End coordinate for a resize whose pointer sits at `coord` on the content.
///
/// Snapped first, then kept within `[top + min_height, timeline_height]`.
pub fn resize_end_coord(top: f64, coord: f64, scale: &TimeScale) -> f64 {
    let floor = top + scale.min_height;
    let ceiling = scale.timeline_height().max(floor);
    scale.snap_coord(coord).clamp(floor, ceiling)
}

/// Minute of day at a resize end coordinate. Rounded up so the card never
/// ends up shorter than the coordinate it was dragged to.
pub fn resize_end_minute(end_coord: f64, scale: &TimeScale) -> i64 {
    // Absorb float noise before rounding up.
    let minutes = scale.coord_to_minutes(end_coord);
    let nearest = minutes.round();
    if (minutes - nearest).abs() < 1e-9 {
        nearest as i64
    } else {
        minutes.ceil() as i64
    }
}
