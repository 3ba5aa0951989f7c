use crate::presenter::render_bar;
use lib::output_log::{ComparisonReport, RunLog};

const CHART_WIDTH: usize = 40;

fn format_row(label: &str, run_log: &RunLog, longest_secs: f64) -> String {
    let ratio = if longest_secs > 0.0 {
        run_log.elapsed_secs / longest_secs
    } else {
        0.0
    };
    format!(
        "{:<9}{} {:.2}s  ({} cores, {} ticks)",
        label,
        render_bar(ratio, CHART_WIDTH),
        run_log.elapsed_secs,
        run_log.number_of_cores,
        run_log.total_ticks
    )
}

/// Text bar chart of both execution times, longest bar filling the chart.
pub fn format_summary(report: &ComparisonReport) -> String {
    let longest_secs = report
        .serial
        .elapsed_secs
        .max(report.parallel.elapsed_secs);
    let mut lines = vec![
        "Execution time comparison".to_string(),
        format_row("Single", &report.serial, longest_secs),
        format_row("Parallel", &report.parallel, longest_secs),
    ];
    if let Some(speedup) = report.speedup {
        lines.push(format!("Speedup: {:.2}x", speedup));
    }
    if let Some(tick_speedup) = report.tick_speedup {
        lines.push(format!("Speedup in ticks: {:.2}x", tick_speedup));
    }
    lines.push(format!(
        "Average core utilization (parallel): {:.1}%",
        report.parallel.processor_log.average_utilization * 100.0
    ));
    lines.join("\n")
}
