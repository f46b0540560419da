//! Day timeline geometry.
//!
//! This module provides:
//! - `HH:MM` clock values and coordinate conversion with grid snapping
//! - Column packing for overlapping tasks
//! - Per-task card layout and the initial scroll position
//! - The current-time indicator

mod clock;
mod layout;
mod now;
mod packer;
mod scale;

pub use clock::{ClockTime, MINUTES_PER_DAY};
pub use layout::{compute_layout, initial_scroll, width_percent, LayoutRecord};
pub use now::NowIndicator;
pub use packer::{pack, pack_by_id, ColumnSlot, Interval};
pub use scale::{hour_label, GridMark, TimeScale};
