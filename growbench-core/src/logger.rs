use crate::calculator::CalculationResult;
use crate::tracking::TrackingStatus;
use chrono::{DateTime, Utc};
use csv::Writer;
use growbench_schemas::experiment::Experiment;
use serde::Serialize;
use std::fs;
use std::io;

#[derive(Debug, Serialize)]
struct LogEntry {
    tick: u64,
    timestamp: String,
    experiment_id: String,
    name: String,
    elapsed_minutes: f64,
    current_od: f64,
    completion_percentage: f64,
    minutes_to_harvest: f64,
}

pub struct TimeSeriesLogger {
    writer: Writer<fs::File>,
}

impl TimeSeriesLogger {
    pub fn new(path: &str) -> Result<Self, io::Error> {
        let writer = Writer::from_path(path)?;
        Ok(Self { writer })
    }

    pub fn log_status(
        &mut self,
        tick: u64,
        now: DateTime<Utc>,
        experiment: &Experiment,
        results: &CalculationResult,
        status: &TrackingStatus,
    ) -> Result<(), anyhow::Error> {
        let entry = LogEntry {
            tick,
            timestamp: now.to_rfc3339(),
            experiment_id: experiment.id.clone(),
            name: experiment.name.clone(),
            elapsed_minutes: status.elapsed_minutes,
            current_od: status.current_od,
            completion_percentage: status.completion_percentage,
            minutes_to_harvest: results.minutes_to_harvest,
        };

        self.writer.serialize(entry)?;
        self.writer.flush()?;
        Ok(())
    }
}
