//! Bounded, evenly-sampled growth curves for visualization. Pure in its
//! inputs: recomputing with the same experiment, result, and tracking status
//! yields an identical sequence, so a render pipeline can diff without
//! flicker.

use crate::calculator::CalculationResult;
use crate::growth;
use crate::tracking::TrackingStatus;
use growbench_schemas::experiment::Experiment;
use serde::{Deserialize, Serialize};

/// Sample count for dashboard-sized charts.
pub const CHART_POINTS: usize = 60;
/// Sample count for the full-page chart.
pub const DETAIL_CHART_POINTS: usize = 100;

/// Shortest window shown, minutes.
const MIN_WINDOW_MINUTES: f64 = 120.0;
/// Longest window shown, minutes (48 hours).
const MAX_WINDOW_MINUTES: f64 = 48.0 * 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GrowthDataPoint {
    /// Minutes since inoculation.
    pub time: f64,
    pub od: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GrowthSeries {
    pub data: Vec<GrowthDataPoint>,
    /// Minutes at which the stationary phase begins, for the boundary
    /// annotation.
    pub stationary_start: f64,
}

impl GrowthSeries {
    fn empty() -> Self {
        Self {
            data: Vec::new(),
            stationary_start: 0.0,
        }
    }
}

/// Samples the projected curve from 0 to a bounded max time: at least two
/// hours, at most 48, covering 1.5x the harvest window and 1.1x the
/// stationary boundary, and stretched so a live tracking marker never falls
/// off-chart. Returns an empty series when the base result is invalid.
pub fn generate_chart_data(
    experiment: &Experiment,
    results: &CalculationResult,
    tracking_status: Option<&TrackingStatus>,
    point_count: usize,
) -> GrowthSeries {
    if !results.is_valid || point_count == 0 {
        return GrowthSeries::empty();
    }

    let (start_od, doubling_time) = match (
        experiment.target_start_od.parse(),
        experiment.doubling_time.parse(),
    ) {
        (Some(s), Some(d)) => (s, d),
        _ => return GrowthSeries::empty(),
    };
    let lag_time = experiment.lag_time.parse_or(0.0);

    let harvest_time = results.minutes_to_harvest;
    let k = results.carrying_capacity;

    let stationary_start =
        growth::stationary_phase_start(start_od, doubling_time, lag_time, k, harvest_time);

    let mut max_time = (harvest_time * 1.5)
        .max(stationary_start * 1.1)
        .clamp(MIN_WINDOW_MINUTES, MAX_WINDOW_MINUTES);
    if let Some(status) = tracking_status {
        if status.elapsed_minutes > max_time {
            max_time = status.elapsed_minutes * 1.1;
        }
    }

    let data = (0..=point_count)
        .map(|i| {
            let time = max_time * i as f64 / point_count as f64;
            let od = growth::current_od(time, start_od, doubling_time, lag_time, k);
            GrowthDataPoint { time, od }
        })
        .collect();

    GrowthSeries {
        data,
        stationary_start,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::calculate_results;
    use crate::tracking::calculate_tracking;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap()
    }

    fn valid_setup() -> (Experiment, CalculationResult) {
        let exp = Experiment::with_defaults("Exp 1", fixed_now());
        let results = calculate_results(&exp, None, fixed_now());
        (exp, results)
    }

    #[test]
    fn invalid_result_yields_empty_series() {
        let mut exp = Experiment::with_defaults("Exp 1", fixed_now());
        exp.doubling_time = "fast".into();
        let results = calculate_results(&exp, None, fixed_now());
        let series = generate_chart_data(&exp, &results, None, CHART_POINTS);
        assert!(series.data.is_empty());
        assert_eq!(series.stationary_start, 0.0);
    }

    #[test]
    fn series_spans_at_least_two_hours_with_fixed_count() {
        let (exp, results) = valid_setup();
        let series = generate_chart_data(&exp, &results, None, CHART_POINTS);
        assert_eq!(series.data.len(), CHART_POINTS + 1);
        assert_eq!(series.data.first().unwrap().time, 0.0);
        let last = series.data.last().unwrap();
        assert!(last.time >= MIN_WINDOW_MINUTES);
        assert!(last.time <= MAX_WINDOW_MINUTES);
        assert!(last.time >= results.minutes_to_harvest * 1.5);
    }

    #[test]
    fn window_is_capped_at_48_hours() {
        let mut exp = Experiment::with_defaults("Slow", fixed_now());
        exp.doubling_time = "600".into();
        let results = calculate_results(&exp, None, fixed_now());
        assert!(results.is_valid);
        let series = generate_chart_data(&exp, &results, None, CHART_POINTS);
        assert_eq!(series.data.last().unwrap().time, MAX_WINDOW_MINUTES);
    }

    #[test]
    fn tracking_marker_extends_the_window() {
        let mut exp = Experiment::with_defaults("Exp 1", fixed_now());
        exp.tracking_start_time = Some(fixed_now());
        let now = fixed_now() + Duration::hours(6);
        let results = calculate_results(&exp, exp.tracking_start_time, now);
        let status = calculate_tracking(&exp, exp.tracking_start_time, now, &results).unwrap();

        let without = generate_chart_data(&exp, &results, None, CHART_POINTS);
        let with = generate_chart_data(&exp, &results, Some(&status), CHART_POINTS);
        assert!(status.elapsed_minutes > without.data.last().unwrap().time);
        let expected = status.elapsed_minutes * 1.1;
        assert!((with.data.last().unwrap().time - expected).abs() < 1e-9);
    }

    #[test]
    fn series_is_deterministic_and_monotonic() {
        let (exp, results) = valid_setup();
        let a = generate_chart_data(&exp, &results, None, DETAIL_CHART_POINTS);
        let b = generate_chart_data(&exp, &results, None, DETAIL_CHART_POINTS);
        assert_eq!(a, b, "same inputs must yield an identical sequence");

        for pair in a.data.windows(2) {
            assert!(pair[1].od >= pair[0].od);
            assert!(pair[1].od <= results.carrying_capacity);
        }
    }
}
