use crate::{experiment::ExperimentDraft, protocol::StepAction};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct BenchFile {
    pub schema_version: String,
    #[serde(default)]
    pub experiments: Vec<ExperimentSeed>,
    #[serde(default)]
    pub timers: Vec<TimerSeed>,
    #[serde(default)]
    pub protocols: Vec<ProtocolSeed>,
}

#[derive(Debug, Deserialize)]
pub struct ExperimentSeed {
    #[serde(flatten)]
    pub config: ExperimentDraft,
    #[serde(default)]
    pub start_tracking: bool,
}

#[derive(Debug, Deserialize)]
pub struct TimerSeed {
    pub label: String,
    pub duration_minutes: f64,
    #[serde(default)]
    pub auto_start: bool,
    /// Minutes from bench start at which the timer is scheduled to begin;
    /// overrides `auto_start` when present.
    #[serde(default)]
    pub start_offset_minutes: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ProtocolSeed {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub steps: Vec<StepSeed>,
}

#[derive(Debug, Deserialize)]
pub struct StepSeed {
    pub text: String,
    #[serde(default)]
    pub action: Option<StepAction>,
}
