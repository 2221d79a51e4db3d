//! This module renders the bench state to PNGs: one growth curve per valid
//! experiment and a Gantt-style view of the computed timeline layout.

use anyhow::Result;
use chrono::{DateTime, Duration, Timelike, Utc};
use growbench_core::bench::engine::Workbench;
use growbench_core::calculator::calculate_results;
use growbench_core::chart::generate_chart_data;
use growbench_core::timeline::items::TimelineKind;
use growbench_core::timeline::layout::{
    layout_timeline, snap_to_grid, TimelineLayout, MIN_ITEM_WIDTH_PX, PIXELS_PER_MINUTE,
};
use growbench_core::tracking::calculate_tracking;
use plotters::prelude::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

const ROW_HEIGHT: i32 = 52;
const HEADER_HEIGHT: i32 = 40;
const BAR_HEIGHT: i32 = 44;

/// The columns of the tracking log CSV this module plots; the reader matches
/// by header name, so the remaining columns are simply skipped.
#[derive(Debug, Deserialize)]
struct LogRecord {
    name: String,
    elapsed_minutes: f64,
    current_od: f64,
}

/// The main function to generate and save all plots for a bench run.
pub fn generate_all_plots(
    output_dir: &str,
    bench: &Workbench,
    now: DateTime<Utc>,
    point_count: usize,
) -> Result<()> {
    println!("[Plotting] Generating graphs from bench state...");

    plot_growth_curves(output_dir, bench, now, point_count)?;
    plot_timeline(output_dir, bench, now)?;
    plot_tracking_log(output_dir)?;

    println!("[Plotting] Graphs have been saved to '{}'.", output_dir);
    Ok(())
}

/// One chart per experiment with a valid calculation: the projected OD
/// curve, the lag and stationary phase boundaries, and the harvest point.
fn plot_growth_curves(
    output_dir: &str,
    bench: &Workbench,
    now: DateTime<Utc>,
    point_count: usize,
) -> Result<()> {
    for (i, exp) in bench.get_experiments().iter().enumerate() {
        let results = calculate_results(exp, exp.tracking_start_time, now);
        if !results.is_valid {
            continue;
        }
        let status = calculate_tracking(exp, exp.tracking_start_time, now, &results);
        let series = generate_chart_data(exp, &results, status.as_ref(), point_count);
        if series.data.is_empty() {
            continue;
        }

        let path = format!("{}/growth_{}.png", output_dir, i + 1);
        let root = BitMapBackend::new(&path, (1024, 768)).into_drawing_area();
        root.fill(&WHITE)?;

        let max_time = series.data.last().map_or(120.0, |p| p.time);
        let max_od = results.carrying_capacity * 1.05;

        let mut chart = ChartBuilder::on(&root)
            .caption(format!("Growth Projection: {}", exp.name), ("sans-serif", 40).into_font())
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(50)
            .build_cartesian_2d(0f64..max_time, 0f64..max_od)?;

        chart
            .configure_mesh()
            .x_desc("Time (minutes)")
            .y_desc("OD600")
            .draw()?;

        chart
            .draw_series(LineSeries::new(
                series.data.iter().map(|p| (p.time, p.od)),
                GREEN.stroke_width(2),
            ))?
            .label("Projected OD")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREEN.filled()));

        let lag_time = exp.lag_time.parse_or(0.0);
        if lag_time > 0.0 && lag_time < max_time {
            chart
                .draw_series(DashedLineSeries::new(
                    [(lag_time, 0.0), (lag_time, max_od)],
                    5,
                    5,
                    (&BLUE).into(),
                ))?
                .label("Lag phase end")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.filled()));
        }

        if series.stationary_start > 0.0 && series.stationary_start < max_time {
            chart
                .draw_series(DashedLineSeries::new(
                    [
                        (series.stationary_start, 0.0),
                        (series.stationary_start, max_od),
                    ],
                    5,
                    5,
                    (&BLACK).into(),
                ))?
                .label("Stationary phase")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK.filled()));
        }

        if results.minutes_to_harvest > 0.0 {
            let harvest_od = exp.target_harvest_od.parse_or(0.0);
            chart
                .draw_series(std::iter::once(Circle::new(
                    (results.minutes_to_harvest, harvest_od),
                    5,
                    RED.filled(),
                )))?
                .label("Harvest")
                .legend(|(x, y)| Circle::new((x + 10, y), 4, RED.filled()));
        }

        if let Some(status) = &status {
            chart.draw_series(std::iter::once(Cross::new(
                (status.elapsed_minutes, status.current_od),
                6,
                RED.stroke_width(2),
            )))?;
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
        root.present()?;
    }
    Ok(())
}

/// Renders the swimlane layout: grid lines every 15 minutes, one bar per
/// item at its assigned row, a progress strip, and the now-line.
fn plot_timeline(output_dir: &str, bench: &Workbench, now: DateTime<Utc>) -> Result<()> {
    let layout = layout_timeline(bench.get_experiments(), bench.get_timers(), now);

    let width = (layout.viewport.width_px().ceil() as u32).clamp(990, 8192);
    let height = (HEADER_HEIGHT + layout.total_rows as i32 * ROW_HEIGHT + 40) as u32;

    let path = format!("{}/timeline.png", output_dir);
    let root = BitMapBackend::new(&path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;
    root.titled("Schedule Overview", ("sans-serif", 24))?;

    draw_time_grid(&root, &layout, height)?;

    for item in &layout.items {
        let x0 = layout.viewport.position(item.start) as i32;
        let bar_width = (item.duration_minutes * PIXELS_PER_MINUTE).max(MIN_ITEM_WIDTH_PX) as i32;
        let y0 = HEADER_HEIGHT + item.row_index as i32 * ROW_HEIGHT;
        let (x1, y1) = (x0 + bar_width, y0 + BAR_HEIGHT);

        let fill = match (item.kind, item.is_scheduled) {
            (_, true) => RGBColor(200, 200, 200).mix(0.5),
            (TimelineKind::Experiment, _) => RGBColor(16, 185, 129).mix(0.35),
            (TimelineKind::Timer, _) => RGBColor(59, 130, 246).mix(0.35),
        };
        root.draw(&Rectangle::new(
            [(x0, y0), (x1, y1)],
            ShapeStyle {
                color: fill,
                filled: true,
                stroke_width: 1,
            },
        ))?;

        if item.progress > 0.0 && !item.is_scheduled {
            let progress_width = (bar_width as f64 * item.progress / 100.0) as i32;
            let color = match item.kind {
                TimelineKind::Experiment => RGBColor(16, 185, 129),
                TimelineKind::Timer => RGBColor(59, 130, 246),
            };
            root.draw(&Rectangle::new(
                [(x0, y1 - 4), (x0 + progress_width, y1)],
                color.filled(),
            ))?;
        }

        let text_style = TextStyle::from(("sans-serif", 14).into_font()).color(&BLACK);
        root.draw_text(&item.label, &text_style, (x0 + 6, y0 + 8))?;
        let time_style = TextStyle::from(("sans-serif", 12).into_font())
            .color(&RGBColor(100, 100, 100));
        root.draw_text(
            &format!("{} - {}", item.start.format("%H:%M"), item.end.format("%H:%M")),
            &time_style,
            (x0 + 6, y0 + 26),
        )?;
    }

    // Current time line
    let now_x = layout.viewport.position(now) as i32;
    root.draw(&PathElement::new(
        vec![(now_x, HEADER_HEIGHT - 10), (now_x, height as i32)],
        RED.stroke_width(2),
    ))?;
    let now_style = TextStyle::from(("sans-serif", 12).into_font()).color(&RED);
    root.draw_text("NOW", &now_style, (now_x + 4, HEADER_HEIGHT - 10))?;

    root.present()?;
    Ok(())
}

/// Plots the OD trajectory actually logged during the run, one line per
/// tracked experiment. Skipped when nothing was tracked.
fn plot_tracking_log(output_dir: &str) -> Result<()> {
    let log_path = format!("{}/tracking_log.csv", output_dir);
    if !Path::new(&log_path).exists() {
        return Ok(());
    }

    let mut reader = csv::Reader::from_path(&log_path)?;
    let mut by_experiment: BTreeMap<String, Vec<(f64, f64)>> = BTreeMap::new();
    for result in reader.deserialize() {
        let record: LogRecord = result?;
        by_experiment
            .entry(record.name)
            .or_default()
            .push((record.elapsed_minutes, record.current_od));
    }
    if by_experiment.is_empty() {
        return Ok(());
    }

    let max_minutes = by_experiment
        .values()
        .flat_map(|points| points.iter().map(|p| p.0))
        .fold(1.0, f64::max);
    let max_od = by_experiment
        .values()
        .flat_map(|points| points.iter().map(|p| p.1))
        .fold(0.0, f64::max);

    let path = format!("{}/tracked_od.png", output_dir);
    let root = BitMapBackend::new(&path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Tracked OD Over Time", ("sans-serif", 40).into_font())
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..max_minutes * 1.05, 0f64..max_od * 1.1)?;

    chart
        .configure_mesh()
        .x_desc("Elapsed (minutes)")
        .y_desc("OD600")
        .draw()?;

    let colors = [GREEN, BLUE, RED, MAGENTA, CYAN];
    for (i, (name, points)) in by_experiment.iter().enumerate() {
        let color = colors[i % colors.len()];
        chart
            .draw_series(LineSeries::new(points.iter().cloned(), color.stroke_width(2)))?
            .label(name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

fn draw_time_grid(
    root: &DrawingArea<BitMapBackend<'_>, plotters::coord::Shift>,
    layout: &TimelineLayout,
    height: u32,
) -> Result<()> {
    let grid_style = RGBColor(225, 225, 225).stroke_width(1);
    let label_style = TextStyle::from(("sans-serif", 11).into_font())
        .color(&RGBColor(150, 150, 150));

    let mut t = snap_to_grid(layout.viewport.view_start);
    while t <= layout.viewport.view_end {
        if t.minute() % 15 == 0 {
            let x = layout.viewport.position(t) as i32;
            root.draw(&PathElement::new(
                vec![(x, HEADER_HEIGHT), (x, height as i32 - 20)],
                grid_style,
            ))?;
            root.draw_text(
                &t.format("%H:%M").to_string(),
                &label_style,
                (x + 2, height as i32 - 16),
            )?;
        }
        t = t + Duration::minutes(1);
    }
    Ok(())
}
