use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::Parser;
use growbench_core::chart::{CHART_POINTS, DETAIL_CHART_POINTS};
use log::info;
use std::fs;
use std::path::Path;

mod config;
mod plotting;
mod report;

/// Plans dilution recipes and harvest times for microbial cultures, then
/// simulates the bench clock to exercise timers and tracking.
#[derive(Parser)]
#[command(name = "growbench", version, about)]
struct Cli {
    /// Bench definition YAML file
    #[arg(short, long, default_value = "growbench-app/bench.yaml")]
    bench: String,

    /// Output directory; a timestamped directory under ./data/runs is
    /// created when omitted
    #[arg(short, long)]
    output: Option<String>,

    /// Number of simulated clock ticks to run
    #[arg(long, default_value_t = 180)]
    ticks: u64,

    /// Simulated minutes per tick
    #[arg(long, default_value_t = 1.0)]
    tick_minutes: f64,

    /// Render growth charts at full-page resolution
    #[arg(long)]
    detail: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    println!("--- Growbench Application ---");

    let bench_file = config::load_bench(&cli.bench)?;

    let output_dir = cli.output.unwrap_or_else(|| {
        format!("./data/runs/bench_{}", Utc::now().format("%Y%m%d_%H%M%S"))
    });
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir))?;

    // Copy the bench file to the output directory for traceability
    fs::copy(&cli.bench, Path::new(&output_dir).join("bench.yaml"))?;

    let start = Utc::now();
    let log_path = Path::new(&output_dir).join("tracking_log.csv");
    let mut bench = config::build_workbench(
        &bench_file,
        log_path.to_str().unwrap(),
        start,
    )?;

    info!(
        "Simulating {} ticks of {} minute(s) for {} experiments and {} timers",
        cli.ticks,
        cli.tick_minutes,
        bench.get_experiments().len(),
        bench.get_timers().len()
    );

    let tick_step = Duration::milliseconds((cli.tick_minutes * 60_000.0).round() as i64);
    let mut now = start;
    for _ in 0..cli.ticks {
        now = now + tick_step;
        bench.tick(now)?;
        for event in bench.get_events() {
            info!("tick {}: {:?}", bench.get_tick(), event);
        }
    }

    report::print_summary_report(&bench, now);

    let point_count = if cli.detail { DETAIL_CHART_POINTS } else { CHART_POINTS };
    plotting::generate_all_plots(&output_dir, &bench, now, point_count)?;

    println!("\nBench run complete. Results are in '{}'", output_dir);

    Ok(())
}
