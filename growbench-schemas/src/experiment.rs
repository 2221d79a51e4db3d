//! Defines the data structures for a tracked culture experiment: the dilution
//! and growth-kinetics inputs a planner edits, plus the tracking baseline that
//! freezes the harvest prediction once a culture is actually inoculated.

use crate::numeric::RawNumeric;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Selects how the dilution is solved: fill the inoculum up to a total target
/// volume, or add inoculum on top of a fixed volume of fresh media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMode {
    TotalVolume,
    FixedMedia,
}

impl Default for CalculationMode {
    fn default() -> Self {
        CalculationMode::TotalVolume
    }
}

/// A single tracked culture. Numeric fields are kept raw because they are
/// edited as text; they are parsed defensively at calculation time. While
/// `tracking_start_time` is set the inputs are treated as immutable by
/// consumers (the math layer does not enforce this).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Experiment {
    pub id: String,
    pub name: String,
    /// OD600 of the overnight/stock culture used as inoculum.
    pub inoculum_od: RawNumeric,
    /// Target total volume (mL) in `total_volume` mode, or the fixed media
    /// volume (mL) in `fixed_media` mode.
    pub target_volume: RawNumeric,
    /// OD600 the diluted culture should start at.
    pub target_start_od: RawNumeric,
    /// OD600 at which the culture is harvested.
    pub target_harvest_od: RawNumeric,
    /// Doubling time during exponential growth, in minutes.
    pub doubling_time: RawNumeric,
    /// Lag phase after inoculation, in minutes.
    pub lag_time: RawNumeric,
    pub calculation_mode: CalculationMode,
    /// Non-null while the culture is being tracked against the wall clock.
    pub tracking_start_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Experiment {
    /// Creates an experiment with the standard bench defaults: a dense
    /// overnight culture diluted into 500 mL to OD 0.1, harvested at OD 0.8,
    /// with a 20 minute doubling time and a 20 minute lag.
    pub fn with_defaults(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            inoculum_od: "2.5".into(),
            target_volume: "500".into(),
            target_start_od: "0.1".into(),
            target_harvest_od: "0.8".into(),
            doubling_time: "20".into(),
            lag_time: "20".into(),
            calculation_mode: CalculationMode::TotalVolume,
            tracking_start_time: None,
            created_at: now,
        }
    }

    /// Applies a partial update. `id` and `created_at` are never touched.
    pub fn apply(&mut self, updates: &ExperimentDraft) {
        if let Some(name) = &updates.name {
            self.name = name.clone();
        }
        if let Some(v) = &updates.inoculum_od {
            self.inoculum_od = v.clone();
        }
        if let Some(v) = &updates.target_volume {
            self.target_volume = v.clone();
        }
        if let Some(v) = &updates.target_start_od {
            self.target_start_od = v.clone();
        }
        if let Some(v) = &updates.target_harvest_od {
            self.target_harvest_od = v.clone();
        }
        if let Some(v) = &updates.doubling_time {
            self.doubling_time = v.clone();
        }
        if let Some(v) = &updates.lag_time {
            self.lag_time = v.clone();
        }
        if let Some(mode) = updates.calculation_mode {
            self.calculation_mode = mode;
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking_start_time.is_some()
    }
}

/// A partial experiment: every field optional. This is the shape drafts and
/// protocol-step actions use to override the defaults at creation time, and
/// the shape field-by-field edits arrive in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct ExperimentDraft {
    pub name: Option<String>,
    pub inoculum_od: Option<RawNumeric>,
    pub target_volume: Option<RawNumeric>,
    pub target_start_od: Option<RawNumeric>,
    pub target_harvest_od: Option<RawNumeric>,
    pub doubling_time: Option<RawNumeric>,
    pub lag_time: Option<RawNumeric>,
    pub calculation_mode: Option<CalculationMode>,
}
