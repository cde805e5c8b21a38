use std::fmt::Write;

use comfy_table::Cell;
use serde_json::Value;

use crate::series::{MetricSeries, Point, ResponseTimeSeries, YearMonth};

use super::styling::{bright, bright_yellow, cyan, dim};
use super::tables::{create_table, cyan_header, level_cells};

/// Entries per row in listings and Markdown tables.
pub const ROW_WIDTH: usize = 4;

const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Renders a JSON value the way it should read in a table cell.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// `MM/YYYY: value` cells in series order.
pub fn cells(points: &[Point<Value>]) -> Vec<String> {
    points
        .iter()
        .map(|p| format!("{}: {}", p.label(), display_value(&p.value)))
        .collect()
}

/// Tab separated rows of [`ROW_WIDTH`] cells. The last row is left short.
pub fn listing(cells: &[String]) -> String {
    cells
        .chunks(ROW_WIDTH)
        .map(|row| format!("\t{}", row.join("\t")))
        .collect::<Vec<_>>()
        .join("\n")
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn sparkline(values: &[f64]) -> String {
    let (min, max) = min_max(values);
    let span = max - min;
    let top = SPARKS.len() - 1;

    values
        .iter()
        .map(|value| {
            if span > 0.0 && span.is_finite() {
                let idx = ((value - min) / span * top as f64).round() as usize;
                SPARKS[idx.min(top)]
            } else {
                SPARKS[top / 2]
            }
        })
        .collect()
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        })
}

fn add_title(output: &mut String, label: &str) {
    let _ = writeln!(output, "{}", bright(format!("{label}:")));
}

fn add_no_data(output: &mut String, label: &str) {
    let _ = writeln!(
        output,
        "\t{}",
        bright_yellow(format!(
            "{label} data not found or not updated yet, try another month or metric"
        ))
    );
}

/// Title, sparkline and a chunked listing of the series.
pub fn render_series(label: &str, series: &MetricSeries) -> String {
    let mut output = String::new();
    add_title(&mut output, label);

    if series.is_empty() {
        add_no_data(&mut output, label);
        return output;
    }

    if let Some(values) = series.numeric_values() {
        let (min, max) = min_max(&values);
        let _ = writeln!(
            output,
            "  {} {}",
            cyan(sparkline(&values)),
            dim(format!(
                "{} to {}, min {}, max {}",
                series.points[0].label(),
                series.points[series.points.len() - 1].label(),
                format_number(min),
                format_number(max)
            ))
        );
    }

    let _ = writeln!(output, "{}", listing(&cells(&series.points)));
    output
}

/// Per-month table of the average and the four level buckets.
pub fn render_response_time(label: &str, series: &ResponseTimeSeries) -> String {
    let mut output = String::new();
    add_title(&mut output, label);

    if series.is_empty() {
        add_no_data(&mut output, label);
        return output;
    }

    let mut table = create_table();
    table.set_header(cyan_header(&[
        "Period", "Average", "Level 1", "Level 2", "Level 3", "Level 4",
    ]));

    for (period, avg, levels) in series.rows() {
        let mut row = vec![
            Cell::new(period.label()),
            Cell::new(avg.map_or_else(|| "-".to_string(), format_number)),
        ];
        row.extend(level_cells(levels, format_number));
        table.add_row(row);
    }

    let _ = writeln!(output, "{table}");
    output
}

/// Single-month printout for flat and snapshot resources.
pub fn render_month_value(label: &str, month: YearMonth, value: Option<&Value>) -> String {
    match value {
        None => format!(
            "\t{}\n",
            bright_yellow(format!("{label} in {month}: no data"))
        ),
        Some(Value::Array(items)) => {
            let cells: Vec<String> = items.iter().map(display_value).collect();
            if cells.is_empty() {
                format!("\t{label} in {month}: none\n")
            } else {
                format!("\t{label} in {month}:\n{}\n", listing(&cells))
            }
        }
        Some(value) => format!("\t{label} in {month}: {}\n", display_value(value)),
    }
}

pub fn render_response_time_month(
    label: &str,
    month: YearMonth,
    avg: Option<f64>,
    levels: Option<[f64; 4]>,
) -> String {
    if avg.is_none() && levels.is_none() {
        return render_month_value(label, month, None);
    }

    let avg = avg.map_or_else(|| "-".to_string(), format_number);
    let levels = levels.map_or_else(
        || "-".to_string(),
        |l| {
            l.iter()
                .map(|v| format_number(*v))
                .collect::<Vec<_>>()
                .join(", ")
        },
    );
    format!("\t{label} in {month}: average {avg}, levels [{levels}]\n")
}
