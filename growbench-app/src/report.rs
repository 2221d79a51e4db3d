use chrono::{DateTime, Utc};
use growbench_core::bench::engine::Workbench;
use growbench_core::calculator::calculate_results;
use growbench_core::timeline::layout::layout_timeline;
use growbench_core::tracking::calculate_tracking;
use growbench_schemas::timer::TimerStatus;

/// Volumes under a millilitre read better in microlitres.
fn format_volume(ml: f64) -> String {
    if ml < 1.0 {
        format!("{:.0} µL", ml * 1000.0)
    } else {
        format!("{:.2} mL", ml)
    }
}

pub fn print_summary_report(bench: &Workbench, now: DateTime<Utc>) {
    println!("\n\n--- [Bench Summary Report] ---");
    println!("========================================");

    println!("Experiments:");
    for exp in bench.get_experiments() {
        let results = calculate_results(exp, exp.tracking_start_time, now);
        println!("\n  {} ({:?} mode)", exp.name, exp.calculation_mode);

        if !results.is_valid {
            match &results.error {
                Some(error) => println!("    Infeasible: {}", error),
                None => println!("    Awaiting input."),
            }
            continue;
        }

        println!(
            "    Recipe: {} inoculum + {} media",
            format_volume(results.inoculum_volume),
            format_volume(results.media_volume)
        );
        println!(
            "    Carrying capacity: OD {:.1} | Minutes to harvest: {:.1}",
            results.carrying_capacity, results.minutes_to_harvest
        );
        if let Some(harvest) = results.harvest_date {
            println!("    Predicted harvest: {}", harvest.format("%Y-%m-%d %H:%M"));
        }

        if let Some(status) =
            calculate_tracking(exp, exp.tracking_start_time, now, &results)
        {
            println!(
                "    Tracking: {} elapsed | OD {:.3} | {:.0}% complete",
                status.formatted_time, status.current_od, status.completion_percentage
            );
        }
    }

    println!("\nTimers:");
    for timer in bench.get_timers() {
        let detail = match timer.status {
            TimerStatus::Running => {
                let end = timer.end_time().unwrap_or(now);
                let remaining = (end - now).num_seconds().max(0) as f64 / 60.0;
                if timer.start_time.map_or(false, |s| s > now) {
                    format!("scheduled for {}", timer.start_time.unwrap().format("%H:%M"))
                } else {
                    format!("running, {:.1} min left", remaining)
                }
            }
            TimerStatus::Paused => format!(
                "paused, {:.1} min left",
                timer.paused_time_remaining.unwrap_or(timer.duration_minutes)
            ),
            TimerStatus::Idle => "idle".to_string(),
            TimerStatus::Completed => "completed".to_string(),
        };
        println!("  - {:<24} {:>6.1} min | {}", timer.label, timer.duration_minutes, detail);
    }

    if !bench.get_protocols().is_empty() {
        println!("\nProtocols:");
        for protocol in bench.get_protocols() {
            println!(
                "  - {:<32} {}/{} steps complete",
                protocol.title,
                protocol.completed_steps(),
                protocol.steps.len()
            );
        }
    }

    let layout = layout_timeline(bench.get_experiments(), bench.get_timers(), now);
    println!(
        "\nTimeline: {} item(s) on {} row(s), {} - {}",
        layout.items.len(),
        layout.total_rows,
        layout.viewport.view_start.format("%H:%M"),
        layout.viewport.view_end.format("%H:%M")
    );
    for item in &layout.items {
        println!(
            "  row {} | {:<24} {} -> {} ({:.0}%{})",
            item.row_index,
            item.label,
            item.start.format("%H:%M"),
            item.end.format("%H:%M"),
            item.progress,
            if item.is_scheduled { ", scheduled" } else { "" }
        );
    }

    println!("========================================");
}
