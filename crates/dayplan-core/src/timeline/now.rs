//! The "now" line on the day timeline.

use chrono::{DateTime, Duration, TimeZone, Timelike};

use super::scale::TimeScale;

/// Position of the current-time line, refreshed on a fixed cadence.
#[derive(Debug, Clone)]
pub struct NowIndicator {
    scale: TimeScale,
    refresh_every: Duration,
    last_refresh_minute: Option<i64>,
    refreshed_at: Option<i64>,
    coord: Option<f64>,
}

impl NowIndicator {
    pub fn new(scale: TimeScale, refresh_every: Duration) -> Self {
        Self {
            scale,
            refresh_every,
            last_refresh_minute: None,
            refreshed_at: None,
            coord: None,
        }
    }

    /// Recomputes the line if the refresh interval has elapsed since the
    /// last refresh. Returns true when a refresh happened.
    pub fn tick<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> bool {
        let stamp = now.timestamp();
        if let Some(last) = self.refreshed_at {
            if stamp - last < self.refresh_every.num_seconds() {
                return false;
            }
        }
        let minute = i64::from(now.hour()) * 60 + i64::from(now.minute());
        self.refreshed_at = Some(stamp);
        self.last_refresh_minute = Some(minute);
        self.coord = self.scale.visible_coord(minute);
        true
    }

    /// `None` before the first tick or while outside the visible range.
    pub fn coord(&self) -> Option<f64> {
        self.coord
    }

    pub fn minute_of_day(&self) -> Option<i64> {
        self.last_refresh_minute
    }
}
