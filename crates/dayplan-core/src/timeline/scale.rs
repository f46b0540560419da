//! Conversion between wall-clock times and vertical timeline coordinates.
//!
//! A coordinate is elapsed minutes since the first visible hour, scaled by
//! `px_per_minute`. Converting a coordinate back to a time always snaps to
//! the grid, so the round trip is lossy: `coord_to_time` after
//! `time_to_coord` after `coord_to_time` yields the same time as the first
//! `coord_to_time`, but the original coordinate is not recovered.

use serde::{Deserialize, Serialize};

use super::clock::ClockTime;

/// Geometry of the day timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeScale {
    pub px_per_minute: f64,
    /// First visible hour (0 = midnight).
    pub day_start_hour: u32,
    pub visible_hours: u32,
    /// Snap granularity in minutes.
    pub snap_minutes: u32,
    /// Floor applied to card heights so zero-length tasks stay visible.
    pub min_height: f64,
}

impl Default for TimeScale {
    fn default() -> Self {
        Self {
            px_per_minute: 1.0,
            day_start_hour: 0,
            visible_hours: 24,
            snap_minutes: 15,
            min_height: 15.0,
        }
    }
}

/// A horizontal grid line on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridMark {
    pub coord: f64,
    /// True on the full hour.
    pub major: bool,
}

/// Rounds half up, so `x.5` always goes towards positive infinity.
fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

impl TimeScale {
    /// Minutes since midnight at the top edge.
    pub fn first_minute(&self) -> i64 {
        i64::from(self.day_start_hour) * 60
    }

    /// Visible span in minutes.
    pub fn span_minutes(&self) -> i64 {
        i64::from(self.visible_hours) * 60
    }

    /// Snap granularity, never below one minute.
    pub fn snap_step(&self) -> i64 {
        i64::from(self.snap_minutes.max(1))
    }

    /// Total height of the scrollable content.
    pub fn timeline_height(&self) -> f64 {
        f64::from(self.visible_hours) * 60.0 * self.px_per_minute
    }

    /// `(hour - day_start_hour) * 60 * ppm + minute * ppm`. Not range checked.
    pub fn time_to_coord(&self, time: ClockTime) -> f64 {
        (f64::from(time.hour()) - f64::from(self.day_start_hour)) * 60.0 * self.px_per_minute
            + f64::from(time.minute()) * self.px_per_minute
    }

    /// Same mapping for minutes since midnight, which may run past 24:00.
    pub fn minutes_to_coord(&self, minutes: i64) -> f64 {
        (minutes - self.first_minute()) as f64 * self.px_per_minute
    }

    /// Minutes since midnight at `coord`, rounded to the nearest snap step.
    /// Unlike [`coord_to_time`](Self::coord_to_time) this does not wrap at
    /// midnight.
    pub fn coord_to_snapped_minutes(&self, coord: f64) -> i64 {
        let snap = self.snap_step();
        let steps = round_half_up(coord / self.px_per_minute / snap as f64) as i64;
        steps * snap + self.first_minute()
    }

    /// Unsnapped, fractional minutes since midnight at `coord`.
    pub fn coord_to_minutes(&self, coord: f64) -> f64 {
        coord / self.px_per_minute + self.first_minute() as f64
    }

    pub fn coord_to_time(&self, coord: f64) -> ClockTime {
        ClockTime::from_minutes(self.coord_to_snapped_minutes(coord))
    }

    /// Moves `coord` onto the nearest grid line.
    pub fn snap_coord(&self, coord: f64) -> f64 {
        self.minutes_to_coord(self.coord_to_snapped_minutes(coord))
    }

    /// Coordinate of `minutes` if it lies on the visible range.
    pub fn visible_coord(&self, minutes: i64) -> Option<f64> {
        let coord = self.minutes_to_coord(minutes);
        (0.0..=self.timeline_height()).contains(&coord).then_some(coord)
    }

    /// Hours with a label row, top to bottom.
    pub fn hour_slots(&self) -> impl Iterator<Item = u32> {
        let start = self.day_start_hour;
        (0..self.visible_hours).map(move |i| start + i)
    }

    /// Quarter-hour lines, from the top edge to the bottom edge inclusive.
    pub fn grid_marks(&self) -> Vec<GridMark> {
        let quarters = self.visible_hours * 4;
        (0..=quarters)
            .map(|i| GridMark {
                coord: f64::from(i * 15) * self.px_per_minute,
                major: i % 4 == 0,
            })
            .collect()
    }
}

/// `12AM`, `1AM`, ... `12PM`, `1PM`, ... for an hour slot.
pub fn hour_label(hour: u32) -> String {
    match hour % 24 {
        0 => "12AM".to_string(),
        h @ 1..=11 => format!("{h}AM"),
        12 => "12PM".to_string(),
        h => format!("{}PM", h - 12),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> ClockTime {
        s.parse().unwrap()
    }

    #[test]
    fn time_to_coord_default_scale() {
        let scale = TimeScale::default();
        assert_eq!(scale.time_to_coord(t("00:00")), 0.0);
        assert_eq!(scale.time_to_coord(t("09:00")), 540.0);
        assert_eq!(scale.time_to_coord(t("23:59")), 1439.0);
    }

    #[test]
    fn time_to_coord_honours_day_start_and_density() {
        let scale = TimeScale {
            px_per_minute: 2.0,
            day_start_hour: 6,
            ..TimeScale::default()
        };
        assert_eq!(scale.time_to_coord(t("06:00")), 0.0);
        assert_eq!(scale.time_to_coord(t("07:30")), 180.0);
        // Before the first visible hour is negative, not an error.
        assert_eq!(scale.time_to_coord(t("05:00")), -120.0);
    }

    #[test]
    fn coord_to_time_snaps_to_nearest_step() {
        let scale = TimeScale::default();
        assert_eq!(scale.coord_to_time(543.0).to_string(), "09:00");
        assert_eq!(scale.coord_to_time(587.0).to_string(), "09:45");
        // Exactly half a step rounds up.
        assert_eq!(scale.coord_to_time(547.5).to_string(), "09:15");
        assert_eq!(scale.coord_to_time(1440.0).to_string(), "00:00");
    }

    #[test]
    fn coord_to_time_adds_day_start() {
        let scale = TimeScale {
            day_start_hour: 8,
            ..TimeScale::default()
        };
        assert_eq!(scale.coord_to_time(0.0).to_string(), "08:00");
        assert_eq!(scale.coord_to_time(125.0).to_string(), "10:00");
    }

    #[test]
    fn snapped_minutes_do_not_wrap() {
        let scale = TimeScale::default();
        assert_eq!(scale.coord_to_snapped_minutes(1440.0), 1440);
        assert_eq!(scale.snap_coord(1432.0), 1425.0);
    }

    #[test]
    fn zero_snap_means_minute_resolution() {
        let scale = TimeScale {
            snap_minutes: 0,
            ..TimeScale::default()
        };
        assert_eq!(scale.coord_to_time(543.0).to_string(), "09:03");
    }

    #[test]
    fn visible_coord_hides_outside_range() {
        let scale = TimeScale {
            day_start_hour: 8,
            visible_hours: 10,
            ..TimeScale::default()
        };
        assert_eq!(scale.visible_coord(9 * 60), Some(60.0));
        assert_eq!(scale.visible_coord(7 * 60), None);
        assert_eq!(scale.visible_coord(19 * 60), None);
    }

    #[test]
    fn labels_and_grid() {
        assert_eq!(hour_label(0), "12AM");
        assert_eq!(hour_label(9), "9AM");
        assert_eq!(hour_label(12), "12PM");
        assert_eq!(hour_label(17), "5PM");

        let scale = TimeScale::default();
        assert_eq!(scale.hour_slots().count(), 24);
        let marks = scale.grid_marks();
        assert_eq!(marks.len(), 97);
        assert!(marks[0].major);
        assert!(!marks[1].major);
        assert_eq!(marks[96].coord, 1440.0);
    }
}
