//! Normalizes running timers and tracked experiments into a single item
//! shape the layout engine can pack onto swimlanes.

use crate::calculator::calculate_results;
use chrono::{DateTime, Utc};
use growbench_schemas::experiment::Experiment;
use growbench_schemas::timer::{StandaloneTimer, TimerStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineKind {
    Timer,
    Experiment,
}

/// One schedulable bar on the timeline. `row_index` is assigned by the
/// layout engine and is not part of the source entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TimelineItem {
    pub id: String,
    pub kind: TimelineKind,
    pub label: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_minutes: f64,
    /// Percent elapsed, 0 for items scheduled in the future.
    pub progress: f64,
    pub is_draggable: bool,
    /// True when the start time lies in the future.
    pub is_scheduled: bool,
    pub row_index: usize,
}

/// Collects the items visible on the timeline: tracked experiments with a
/// valid prediction, and running timers (including ones scheduled ahead).
/// Idle and paused timers live in the unscheduled list instead. Items come
/// back sorted by ascending start time, rows unassigned.
pub fn collect_timeline_items(
    experiments: &[Experiment],
    timers: &[StandaloneTimer],
    now: DateTime<Utc>,
) -> Vec<TimelineItem> {
    let mut items = Vec::new();

    for exp in experiments {
        let Some(started) = exp.tracking_start_time else {
            continue;
        };
        let results = calculate_results(exp, Some(started), now);
        if !results.is_valid {
            continue;
        }
        let Some(harvest) = results.harvest_date else {
            continue;
        };
        let total = results.minutes_to_harvest;
        let elapsed = (now - started).num_milliseconds() as f64 / 60_000.0;
        let progress = if total > 0.0 {
            (elapsed / total * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        items.push(TimelineItem {
            id: exp.id.clone(),
            kind: TimelineKind::Experiment,
            label: exp.name.clone(),
            start: started,
            end: harvest,
            duration_minutes: total,
            progress,
            is_draggable: false,
            is_scheduled: false,
            row_index: 0,
        });
    }

    for timer in timers {
        if timer.status != TimerStatus::Running {
            continue;
        }
        let (Some(start), Some(end)) = (timer.start_time, timer.end_time()) else {
            continue;
        };
        let is_scheduled = start > now;
        let progress = if is_scheduled {
            0.0
        } else {
            let elapsed = (now - start).num_milliseconds() as f64 / 60_000.0;
            if timer.duration_minutes > 0.0 {
                (elapsed / timer.duration_minutes * 100.0).clamp(0.0, 100.0)
            } else {
                0.0
            }
        };
        items.push(TimelineItem {
            id: timer.id.clone(),
            kind: TimelineKind::Timer,
            label: timer.label.clone(),
            start,
            end,
            duration_minutes: timer.duration_minutes,
            progress,
            is_draggable: true,
            is_scheduled,
            row_index: 0,
        });
    }

    items.sort_by(|a, b| a.start.cmp(&b.start));
    items
}
