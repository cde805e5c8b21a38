use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::series::{MetricSeries, ResponseTimeSeries, YearMonth};

use super::terminal::{cells, display_value, format_number, ROW_WIDTH};

pub const REPORT_FILE: &str = "OpenDiggerInfo.md";

/// The single Markdown report written during one run.
///
/// Created (and truncated) once per run; every pipeline appends its sections in
/// order and the file is flushed by [`MarkdownReport::finish`].
pub struct MarkdownReport {
    path: PathBuf,
    out: BufWriter<File>,
}

impl MarkdownReport {
    /// Creates `dir` if needed and opens `dir/OpenDiggerInfo.md` for writing.
    pub fn create(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(REPORT_FILE);
        let out = BufWriter::new(File::create(&path)?);
        Ok(Self { path, out })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())
    }

    pub fn finish(mut self) -> io::Result<PathBuf> {
        self.out.flush()?;
        Ok(self.path)
    }
}

pub fn header(repo: &str, month: Option<YearMonth>) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# OpenDigger Data Analysis - {repo}\n");
    let _ = writeln!(output, "### Repo");
    let _ = writeln!(output, "- repo name: {repo}");
    let _ = writeln!(output, "- repo url: https://github.com/{repo}");
    if let Some(month) = month {
        let _ = writeln!(output, "- month: {month}");
    }
    output.push('\n');
    output
}

pub fn group_heading(title: &str) -> String {
    format!("## {title}\n\n")
}

pub fn kind_heading(title: &str) -> String {
    format!("### {title}\n\n")
}

pub fn notice(text: &str) -> String {
    format!("> {text}\n\n")
}

/// Four-column table of `label: value` cells. A short final row is padded with
/// empty cells so every row has the same number of columns.
pub fn table(title: &str, cells: &[String]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "| {title} |{}", " |".repeat(ROW_WIDTH - 1));
    let _ = writeln!(output, "|{}", " --- |".repeat(ROW_WIDTH));

    for row in cells.chunks(ROW_WIDTH) {
        let mut padded: Vec<&str> = row.iter().map(String::as_str).collect();
        padded.resize(ROW_WIDTH, "");
        let _ = writeln!(output, "| {} |", padded.join(" | "));
    }

    output.push('\n');
    output
}

fn image(label: &str, file: &str) -> String {
    format!("![{label}](./{file})\n\n")
}

/// Heading, summary sentence, optional chart reference and the value table.
pub fn series_section(label: &str, series: &MetricSeries, chart_file: Option<&str>) -> String {
    let mut output = format!("#### {label}\n");

    if series.is_empty() {
        output.push_str(&notice(&format!("No {label} data available")));
        return output;
    }

    let first = series.points[0].label();
    let last = series.points[series.points.len() - 1].label();
    output.push_str(&notice(&format!(
        "{} **{label}** trend from {first} to {last} is as follows:",
        series.repo_name
    )));

    if let Some(file) = chart_file {
        output.push_str(&image(label, file));
    }

    output.push_str(&table(&format!("Dates and {label}"), &cells(&series.points)));
    output
}

pub fn response_time_section(
    label: &str,
    series: &ResponseTimeSeries,
    chart_file: Option<&str>,
) -> String {
    let mut output = format!("#### {label}\n");

    if series.is_empty() {
        output.push_str(&notice(&format!("No {label} data available")));
        return output;
    }

    output.push_str(&notice(&format!(
        "{} **{label}** average and level distribution is as follows:",
        series.repo_name
    )));

    if let Some(file) = chart_file {
        output.push_str(&image(label, file));
    }

    let _ = writeln!(output, "| Period | Average | Level 1 | Level 2 | Level 3 | Level 4 |");
    let _ = writeln!(output, "| --- | --- | --- | --- | --- | --- |");
    for (period, avg, levels) in series.rows() {
        let avg = avg.map_or_else(String::new, format_number);
        let levels = levels.map_or_else(
            || vec![String::new(); 4],
            |l| l.iter().map(|v| format_number(*v)).collect(),
        );
        let _ = writeln!(output, "| {} | {avg} | {} |", period.label(), levels.join(" | "));
    }

    output.push('\n');
    output
}

pub fn month_value(label: &str, month: YearMonth, value: Option<&Value>) -> String {
    match value {
        None => format!("- {label} in {month}: no data\n"),
        Some(Value::Array(items)) => {
            let mut output = format!("- {label} in {month}:\n");
            for item in items {
                let _ = writeln!(output, "  - {}", display_value(item));
            }
            output
        }
        Some(value) => format!("- {label} in {month}: {}\n", display_value(value)),
    }
}

pub fn response_time_month(
    label: &str,
    month: YearMonth,
    avg: Option<f64>,
    levels: Option<[f64; 4]>,
) -> String {
    if avg.is_none() && levels.is_none() {
        return month_value(label, month, None);
    }

    let mut output = format!("- {label} in {month}:\n");
    if let Some(avg) = avg {
        let _ = writeln!(output, "  - average: {}", format_number(avg));
    }
    if let Some(levels) = levels {
        for (i, value) in levels.iter().enumerate() {
            let _ = writeln!(output, "  - level {}: {}", i + 1, format_number(*value));
        }
    }
    output
}
