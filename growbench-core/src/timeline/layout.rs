//! The swimlane layout engine: maps schedulable items onto non-overlapping
//! display rows and a linear time/pixel coordinate space, with snap-to-grid
//! support for drag-to-reschedule.

use super::items::{collect_timeline_items, TimelineItem};
use chrono::{DateTime, Duration, Utc};
use growbench_schemas::experiment::Experiment;
use growbench_schemas::timer::{minutes_to_duration, StandaloneTimer};
use serde::{Deserialize, Serialize};

pub const PIXELS_PER_MINUTE: f64 = 3.0;
pub const SNAP_MINUTES: i64 = 1;
/// Narrowest rendered bar; short timers still need a readable label.
pub const MIN_ITEM_WIDTH_PX: f64 = 60.0;
/// Gap between items sharing a row, so bars never read as overlapping.
pub const ROW_SPACING_MINUTES: f64 = 5.0;
/// Aesthetic floor on the row count.
pub const MIN_ROWS: usize = 6;

/// The visible time window. Always covers the recent past, the full
/// lookahead of scheduled work, and an hour of margin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Viewport {
    pub view_start: DateTime<Utc>,
    pub view_end: DateTime<Utc>,
}

impl Viewport {
    /// `now - 30min` through `max(now + 240min, latest end + 60min)`.
    pub fn compute(items: &[TimelineItem], now: DateTime<Utc>) -> Self {
        let max_content_end = items.iter().map(|i| i.end).max().unwrap_or(now).max(now);
        Self {
            view_start: now - Duration::minutes(30),
            view_end: (now + Duration::minutes(240)).max(max_content_end + Duration::minutes(60)),
        }
    }

    /// Linear time-to-pixel mapping from the left edge of the viewport.
    pub fn position(&self, t: DateTime<Utc>) -> f64 {
        (t - self.view_start).num_milliseconds() as f64 / 60_000.0 * PIXELS_PER_MINUTE
    }

    /// Inverse mapping for drop targets. Compose with [`snap_to_grid`] to
    /// get a droppable timestamp.
    pub fn time_at_x(&self, x: f64) -> DateTime<Utc> {
        self.view_start + Duration::milliseconds((x / PIXELS_PER_MINUTE * 60_000.0).round() as i64)
    }

    pub fn width_px(&self) -> f64 {
        self.position(self.view_end)
    }
}

/// Rounds a timestamp to the nearest `SNAP_MINUTES` grid boundary.
pub fn snap_to_grid(t: DateTime<Utc>) -> DateTime<Utc> {
    let coeff = SNAP_MINUTES * 60_000;
    let ms = t.timestamp_millis();
    let snapped = ((ms as f64 / coeff as f64).round() as i64) * coeff;
    DateTime::<Utc>::from_timestamp_millis(snapped).unwrap_or(t)
}

/// A fully laid out timeline: the viewport, items with rows assigned, and
/// the row count (at least [`MIN_ROWS`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TimelineLayout {
    pub viewport: Viewport,
    pub items: Vec<TimelineItem>,
    pub total_rows: usize,
}

/// Greedy first-fit interval packing in ascending start order. The occupied
/// interval of an item is its *visual* footprint: at least
/// `MIN_ITEM_WIDTH_PX` wide on screen, plus the inter-item spacing margin.
/// First-fit rather than best-fit; lane counts stay small in practice and
/// the simpler policy is stable under item churn.
pub fn assign_rows(mut items: Vec<TimelineItem>) -> (Vec<TimelineItem>, usize) {
    items.sort_by(|a, b| a.start.cmp(&b.start));

    // Visual end time of the last item placed in each row.
    let mut row_ends: Vec<DateTime<Utc>> = Vec::new();

    for item in &mut items {
        let visual_minutes = item
            .duration_minutes
            .max(MIN_ITEM_WIDTH_PX / PIXELS_PER_MINUTE);
        let visual_end = item.start + minutes_to_duration(visual_minutes + ROW_SPACING_MINUTES);

        match row_ends.iter().position(|end| *end <= item.start) {
            Some(row) => {
                item.row_index = row;
                row_ends[row] = visual_end;
            }
            None => {
                item.row_index = row_ends.len();
                row_ends.push(visual_end);
            }
        }
    }

    let total_rows = row_ends.len().max(MIN_ROWS);
    (items, total_rows)
}

/// Convenience entry point: normalize, compute the viewport, pack rows.
pub fn layout_timeline(
    experiments: &[Experiment],
    timers: &[StandaloneTimer],
    now: DateTime<Utc>,
) -> TimelineLayout {
    let items = collect_timeline_items(experiments, timers, now);
    let viewport = Viewport::compute(&items, now);
    let (items, total_rows) = assign_rows(items);
    TimelineLayout {
        viewport,
        items,
        total_rows,
    }
}
