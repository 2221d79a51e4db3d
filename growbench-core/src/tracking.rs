//! Live projection of a tracked culture: elapsed time, current OD, and
//! completion against the predicted harvest.

use crate::calculator::CalculationResult;
use crate::growth;
use chrono::{DateTime, Utc};
use growbench_schemas::experiment::Experiment;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TrackingStatus {
    pub elapsed_minutes: f64,
    pub current_od: f64,
    /// Elapsed duration rendered as `HH:MM:SS`. Hours do not wrap at 24.
    pub formatted_time: String,
    /// Percent of the predicted harvest window, clamped to [0, 100].
    pub completion_percentage: f64,
}

/// Projects the live status of a tracked experiment. Returns `None` when the
/// experiment is not tracking or the base result is invalid.
pub fn calculate_tracking(
    experiment: &Experiment,
    tracking_start_time: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    results: &CalculationResult,
) -> Option<TrackingStatus> {
    let started = tracking_start_time?;
    if !results.is_valid {
        return None;
    }

    let elapsed_minutes = (now - started).num_milliseconds() as f64 / 60_000.0;

    let start_od = experiment.target_start_od.parse()?;
    let doubling_time = experiment.doubling_time.parse()?;
    let lag_time = experiment.lag_time.parse_or(0.0);

    let current_od = growth::current_od(
        elapsed_minutes,
        start_od,
        doubling_time,
        lag_time,
        results.carrying_capacity,
    );

    let completion_percentage = if results.minutes_to_harvest > 0.0 {
        (elapsed_minutes / results.minutes_to_harvest * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    Some(TrackingStatus {
        elapsed_minutes,
        current_od,
        formatted_time: format_duration_hms(elapsed_minutes),
        completion_percentage,
    })
}

/// `HH:MM:SS` duration rendering. Negative durations clamp to zero.
pub fn format_duration_hms(minutes: f64) -> String {
    let total_seconds = (minutes * 60.0).max(0.0).floor() as u64;
    let hours = total_seconds / 3600;
    let mins = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, mins, secs)
}
