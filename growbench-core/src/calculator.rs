//! The single entry point combining dilution and growth math into one
//! `CalculationResult` for an experiment, given "now" and an optional
//! tracking baseline.

use crate::error::CalcError;
use crate::{dilution, growth};
use chrono::{DateTime, Utc};
use growbench_schemas::experiment::{CalculationMode, Experiment};
use growbench_schemas::timer::minutes_to_duration;
use serde::{Deserialize, Serialize};

/// The derived recipe and prediction for an experiment. Always fully formed:
/// an invalid input state yields a zeroed result rather than an error value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CalculationResult {
    /// Inoculum to pipette, mL.
    pub inoculum_volume: f64,
    /// Fresh media to add, mL.
    pub media_volume: f64,
    pub minutes_to_harvest: f64,
    /// Predicted harvest wall-clock time; `None` only while awaiting input.
    pub harvest_date: Option<DateTime<Utc>>,
    pub is_valid: bool,
    pub error: Option<CalcError>,
    pub carrying_capacity: f64,
}

impl CalculationResult {
    fn awaiting_input(carrying_capacity: f64) -> Self {
        Self {
            inoculum_volume: 0.0,
            media_volume: 0.0,
            minutes_to_harvest: 0.0,
            harvest_date: None,
            is_valid: false,
            error: None,
            carrying_capacity,
        }
    }
}

/// Computes the full recipe and harvest prediction.
///
/// The tracking baseline freezes the predicted harvest clock time: before
/// tracking starts the prediction is re-anchored to `now` on every tick, and
/// once tracking is active it becomes a fixed offset from the real start.
///
/// Two invalid states are distinguished: unparsable or non-positive required
/// inputs produce a silent zeroed result (awaiting input), while a computed
/// infeasibility carries a `CalcError`. When both a dilution and a capacity
/// problem exist the capacity error wins; it is the more actionable message
/// and only one is shown at a time.
pub fn calculate_results(
    experiment: &Experiment,
    tracking_start_time: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> CalculationResult {
    let carrying_capacity = growth::carrying_capacity(&experiment.target_harvest_od);

    let parsed = (
        experiment.inoculum_od.parse(),
        experiment.target_volume.parse(),
        experiment.target_start_od.parse(),
        experiment.target_harvest_od.parse(),
        experiment.doubling_time.parse(),
    );
    let (inoculum_od, input_volume, start_od, harvest_od, doubling_time) = match parsed {
        (Some(a), Some(b), Some(c), Some(d), Some(e))
            if a > 0.0 && b > 0.0 && c > 0.0 && e > 0.0 =>
        {
            (a, b, c, d, e)
        }
        _ => return CalculationResult::awaiting_input(carrying_capacity),
    };
    let lag_time = experiment.lag_time.parse_or(0.0);

    let dilution = match experiment.calculation_mode {
        CalculationMode::FixedMedia => dilution::solve_fixed_media(inoculum_od, input_volume, start_od),
        CalculationMode::TotalVolume => dilution::solve_total_volume(inoculum_od, input_volume, start_od),
    };

    let capacity_error = (harvest_od >= carrying_capacity)
        .then_some(CalcError::TargetExceedsCapacity {
            capacity: carrying_capacity,
        });
    let error = capacity_error.or(dilution.error);

    let mut minutes_to_harvest = 0.0;
    if error.is_none() && harvest_od > start_od {
        if let Some(total) =
            growth::time_to_reach_od(start_od, harvest_od, doubling_time, lag_time, carrying_capacity)
        {
            minutes_to_harvest = total;
        }
    }

    let base_time = tracking_start_time.unwrap_or(now);
    let harvest_date = Some(base_time + minutes_to_duration(minutes_to_harvest));

    CalculationResult {
        inoculum_volume: dilution.inoculum_volume,
        media_volume: dilution.media_volume,
        minutes_to_harvest,
        harvest_date,
        is_valid: error.is_none(),
        error,
        carrying_capacity,
    }
}
