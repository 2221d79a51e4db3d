use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use growbench_core::bench::{builder::WorkbenchBuilder, engine::Workbench};
use growbench_core::timeline::layout::snap_to_grid;
use growbench_schemas::{
    command::Command,
    file_formats::BenchFile,
    protocol::{Protocol, ProtocolStep},
    timer::minutes_to_duration,
};
use std::fs;

/// Loads a bench definition from a YAML file.
pub fn load_bench(path: &str) -> Result<BenchFile> {
    println!("Loading bench definition from '{}'...", path);
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read bench file: {}", path))?;
    let file: BenchFile = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse YAML from {}", path))?;
    println!("Bench definition loaded (schema {}).", file.schema_version);
    Ok(file)
}

/// Builds a workbench from the seeds in a bench file. Entities go through
/// the workbench's own creation functions so ids and defaults behave exactly
/// as they do for interactively created records.
pub fn build_workbench(
    file: &BenchFile,
    log_path: &str,
    now: DateTime<Utc>,
) -> Result<Workbench> {
    let mut bench = WorkbenchBuilder::new()
        .with_timeseries_logging_to_file(log_path)
        .build()?;

    for seed in &file.experiments {
        let id = bench.add_experiment(Some(&seed.config), now);
        if seed.start_tracking {
            bench.execute_command(Command::StartTracking { experiment_id: id }, now)?;
        }
    }

    for seed in &file.timers {
        let auto_start = seed.auto_start && seed.start_offset_minutes.is_none();
        let id = bench.add_timer(seed.label.clone(), seed.duration_minutes, auto_start, now);
        if let Some(offset) = seed.start_offset_minutes {
            let slot = snap_to_grid(now + minutes_to_duration(offset));
            bench.execute_command(
                Command::ScheduleTimer {
                    timer_id: id,
                    start_time: slot,
                },
                now,
            )?;
        }
    }

    for seed in &file.protocols {
        let steps = seed
            .steps
            .iter()
            .map(|s| ProtocolStep::new(s.text.clone(), s.action.clone()))
            .collect();
        bench.add_protocol(Protocol::new(
            seed.title.clone(),
            seed.description.clone(),
            seed.tags.clone(),
            steps,
            now,
        ));
    }

    Ok(bench)
}
