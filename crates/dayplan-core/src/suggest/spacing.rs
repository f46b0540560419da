//! Overlap and minimum-gap check for a suggested schedule.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::task::TaskId;

/// A scheduled span to check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub id: TaskId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Two consecutive tasks on the same day that are too close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpacingViolation {
    pub first: TaskId,
    pub second: TaskId,
    /// Minutes between the end of `first` and the start of `second`;
    /// negative when they overlap.
    pub gap_minutes: i64,
}

impl SpacingViolation {
    pub fn is_overlap(&self) -> bool {
        self.gap_minutes < 0
    }
}

impl fmt::Display for SpacingViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_overlap() {
            write!(f, "tasks {} and {} overlap", self.first, self.second)
        } else {
            write!(
                f,
                "tasks {} and {} are only {} minutes apart",
                self.first, self.second, self.gap_minutes
            )
        }
    }
}

/// Checks spacing per day.
pub struct SpacingChecker {
    min_gap_minutes: i64,
}

impl Default for SpacingChecker {
    fn default() -> Self {
        Self { min_gap_minutes: 15 }
    }
}

impl SpacingChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_gap(mut self, minutes: i64) -> Self {
        self.min_gap_minutes = minutes;
        self
    }

    /// Finds every task that starts less than the minimum gap after the
    /// latest end seen so far on its day (UTC).
    pub fn check(&self, slots: &[Slot]) -> Vec<SpacingViolation> {
        let mut by_day: BTreeMap<NaiveDate, Vec<Slot>> = BTreeMap::new();
        for slot in slots {
            by_day.entry(slot.start.date_naive()).or_default().push(*slot);
        }

        let mut violations = Vec::new();
        for mut day in by_day.into_values() {
            day.sort_by_key(|s| (s.start, s.end));

            let mut latest: Option<Slot> = None;
            for slot in day {
                if let Some(prev) = latest {
                    let gap = (slot.start - prev.end).num_minutes();
                    if gap < self.min_gap_minutes {
                        violations.push(SpacingViolation {
                            first: prev.id,
                            second: slot.id,
                            gap_minutes: gap,
                        });
                    }
                }
                if latest.map_or(true, |prev| slot.end > prev.end) {
                    latest = Some(slot);
                }
            }
        }
        violations
    }
}
