//! Column assignment for overlapping intervals.
//!
//! Each interval is compared only against the intervals that directly
//! overlap it, not against the whole connected cluster. An interval that
//! overlaps two intervals which do not overlap each other therefore gets
//! `size = 3`, even though the other two could share a column. Callers rely
//! on this: the layout widths are derived from these exact numbers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::task::TaskId;

/// Half-open `[start, end)` span in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub id: TaskId,
    pub start: i64,
    pub end: i64,
}

impl Interval {
    pub fn new(id: TaskId, start: i64, end: i64) -> Self {
        Self { id, start, end }
    }

    /// Touching at a boundary (`a.end == b.start`) is not an overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        !(other.end <= self.start || other.start >= self.end)
    }
}

/// Column position of one interval among its direct peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSlot {
    pub index: usize,
    pub size: usize,
}

impl ColumnSlot {
    pub const FULL: ColumnSlot = ColumnSlot { index: 0, size: 1 };
}

/// Assigns a column slot to every interval, in input order.
///
/// The peer set of an interval always contains the interval itself, so
/// `size >= 1` and `index < size`. Ties on `(start, end)` keep input order.
pub fn pack(intervals: &[Interval]) -> Vec<ColumnSlot> {
    intervals
        .iter()
        .enumerate()
        .map(|(pos, interval)| {
            let mut peers: Vec<usize> = intervals
                .iter()
                .enumerate()
                .filter(|(other_pos, other)| *other_pos == pos || interval.overlaps(other))
                .map(|(other_pos, _)| other_pos)
                .collect();
            peers.sort_by_key(|&p| (intervals[p].start, intervals[p].end));

            let index = peers.iter().position(|&p| p == pos).unwrap_or(0);
            ColumnSlot {
                index,
                size: peers.len().max(1),
            }
        })
        .collect()
}

/// [`pack`] keyed by task id. Later duplicates win.
pub fn pack_by_id(intervals: &[Interval]) -> HashMap<TaskId, ColumnSlot> {
    intervals
        .iter()
        .zip(pack(intervals))
        .map(|(interval, slot)| (interval.id, slot))
        .collect()
}
