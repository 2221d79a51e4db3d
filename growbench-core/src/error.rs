use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Infeasibility of a requested calculation. These are user-facing states
/// carried as data on a `CalculationResult`, never raised across a component
/// boundary. Display strings are shown verbatim in the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CalcError {
    /// Fixed-media mode needs the inoculum denser than the target start.
    #[error("Inoculum OD must be greater than Start OD.")]
    InoculumOdTooLow,

    /// Total-volume mode computed an inoculum volume larger than the target.
    #[error("Inoculum volume > target.")]
    InoculumExceedsTarget,

    /// The harvest target is at or above the logistic carrying capacity.
    #[error("Target OD > Capacity ({capacity:.1}).")]
    TargetExceedsCapacity { capacity: f64 },
}

#[derive(Debug, Error)]
pub enum GrowbenchError {
    #[error("Experiment '{0}' not found on the bench")]
    ExperimentNotFound(String),

    #[error("Timer '{0}' not found on the bench")]
    TimerNotFound(String),

    #[error("Protocol '{0}' not found on the bench")]
    ProtocolNotFound(String),

    #[error("Step '{1}' not found in protocol '{0}'")]
    StepNotFound(String, String),

    #[error("Step '{0}' has no attached action")]
    StepHasNoAction(String),

    #[error("I/O error for file '{0}': {1}")]
    FileIO(String, #[source] std::io::Error),

    #[error("An error occurred during logging: {0}")]
    LoggingError(#[from] anyhow::Error),
}
