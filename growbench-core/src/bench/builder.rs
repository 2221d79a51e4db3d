use super::{engine::Workbench, state::BenchState};
use crate::{error::GrowbenchError, logger::TimeSeriesLogger};
use growbench_schemas::{
    experiment::Experiment, protocol::Protocol, timer::StandaloneTimer,
};

/// A fluent builder for constructing a `Workbench`.
///
/// Everything is optional: an empty bench is legal and entities can be added
/// afterwards through the workbench's creation functions.
#[derive(Default)]
pub struct WorkbenchBuilder {
    experiments: Vec<Experiment>,
    timers: Vec<StandaloneTimer>,
    protocols: Vec<Protocol>,
    log_path: Option<String>,
}

impl WorkbenchBuilder {
    /// Creates a new, empty `WorkbenchBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the bench with pre-built experiments.
    pub fn with_experiments(mut self, experiments: Vec<Experiment>) -> Self {
        self.experiments = experiments;
        self
    }

    /// Seeds the bench with pre-built timers.
    pub fn with_timers(mut self, timers: Vec<StandaloneTimer>) -> Self {
        self.timers = timers;
        self
    }

    /// Seeds the bench with protocols.
    pub fn with_protocols(mut self, protocols: Vec<Protocol>) -> Self {
        self.protocols = protocols;
        self
    }

    /// Configures the bench to append tracked-experiment status rows to the
    /// specified CSV file on every tick.
    pub fn with_timeseries_logging_to_file(mut self, path: &str) -> Self {
        self.log_path = Some(path.to_string());
        self
    }

    /// Consumes the builder and returns a ready `Workbench`.
    ///
    /// # Errors
    ///
    /// Returns a `GrowbenchError` when the time-series log file cannot be
    /// created.
    pub fn build(self) -> Result<Workbench, GrowbenchError> {
        let logger = match self.log_path {
            Some(path) => Some(
                TimeSeriesLogger::new(&path)
                    .map_err(|e| GrowbenchError::FileIO(path.clone(), e))?,
            ),
            None => None,
        };

        Ok(Workbench {
            state: BenchState {
                tick: 0,
                experiments: self.experiments,
                timers: self.timers,
                protocols: self.protocols,
                events: Vec::new(),
            },
            logger,
        })
    }
}
