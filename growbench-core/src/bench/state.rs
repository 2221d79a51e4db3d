use growbench_schemas::{
    experiment::Experiment, protocol::Protocol, timer::StandaloneTimer,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BenchEvent {
    TimerCompleted { id: String },
    TimerSpawned { id: String, source_step: String },
    ExperimentSpawned { id: String },
}

#[derive(Debug, Clone)]
pub struct BenchState {
    pub tick: u64,
    pub experiments: Vec<Experiment>,
    pub timers: Vec<StandaloneTimer>,
    pub protocols: Vec<Protocol>,
    /// Events raised during the most recent tick or command.
    pub events: Vec<BenchEvent>,
}
