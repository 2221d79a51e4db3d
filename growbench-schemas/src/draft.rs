use crate::experiment::ExperimentDraft;
use crate::protocol::Protocol;
use crate::timer::TimerSpec;
use serde::{Deserialize, Serialize};

/// The three plain-data shapes an assistant collaborator may hand to the
/// core. Drafts are accepted as-is; only the standard defensive numeric
/// validation applies once the created entity is calculated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssistantDraft {
    Experiment { data: ExperimentDraft },
    Timer { data: TimerSpec },
    Protocol { data: Protocol },
}
