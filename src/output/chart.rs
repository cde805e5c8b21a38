use std::fs;
use std::ops::Range;
use std::path::PathBuf;

use log::debug;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::catalog::{ChartStyle, Palette};
use crate::error::{OpenDiggerError, Result};
use crate::series::{MetricSeries, ResponseTimeSeries};

const BAR_HALF_WIDTH: f64 = 0.4;
const GRID: RGBColor = RGBColor(225, 225, 225);
const AVERAGE: RGBColor = RGBColor(31, 119, 180);
const LEVEL_COLORS: [RGBColor; 4] = [
    RGBColor(44, 160, 44),
    RGBColor(23, 190, 207),
    RGBColor(255, 187, 30),
    RGBColor(214, 39, 40),
];

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

fn chart_err(e: impl std::fmt::Display) -> OpenDiggerError {
    OpenDiggerError::Chart(e.to_string())
}

fn rgb(palette: Palette) -> RGBColor {
    let (r, g, b) = palette.rgb();
    RGBColor(r, g, b)
}

/// Bottom of each stacked segment: level 1 sits on zero, level `k` on the sum of
/// levels `1..k`.
pub fn stack_baselines(levels: &[f64; 4]) -> [f64; 4] {
    let mut baselines = [0.0; 4];
    for k in 1..levels.len() {
        baselines[k] = baselines[k - 1] + levels[k - 1];
    }
    baselines
}

/// Y range covering zero and every value, with a little headroom.
fn value_range(values: impl IntoIterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = if hi > lo { hi - lo } else { 1.0 };
    let floor = if lo < 0.0 { lo - span * 0.05 } else { 0.0 };
    floor..hi + span * 0.05
}

/// Average and levels on one shared month axis. A month present in only one
/// half leaves a gap in the other panel.
pub fn aligned_panels(series: &ResponseTimeSeries) -> (Vec<Option<f64>>, Vec<Option<[f64; 4]>>) {
    series
        .rows()
        .into_iter()
        .map(|(_, avg, levels)| (avg, levels))
        .unzip()
}

#[allow(clippy::cast_precision_loss)]
fn x_range(len: usize) -> Range<f64> {
    -0.5..(len.max(1) as f64 - 0.5)
}

/// Writes PNG charts into one repository's output directory.
///
/// Charts carry no text so no system fonts are needed; the Markdown report
/// supplies titles and the value tables.
pub struct ChartRenderer {
    dir: PathBuf,
    size: (u32, u32),
}

impl ChartRenderer {
    pub fn new(dir: PathBuf, size: (u32, u32)) -> Self {
        Self { dir, size }
    }

    pub fn path_for(&self, resource: &str) -> PathBuf {
        self.dir.join(format!("{resource}.png"))
    }

    /// Line or bar chart of `values` in calendar order, saved as
    /// `<metric_name>.png`.
    pub fn render_series(
        &self,
        series: &MetricSeries,
        values: &[f64],
        style: ChartStyle,
    ) -> Result<PathBuf> {
        let path = self.prepare(&series.metric_name)?;
        {
            let root = BitMapBackend::new(&path, self.size).into_drawing_area();
            root.fill(&WHITE).map_err(chart_err)?;
            match style {
                ChartStyle::Line(palette) => {
                    let points: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
                    draw_line(&root, &points, rgb(palette))?;
                }
                ChartStyle::Bar(palette) => draw_bars(&root, values, rgb(palette))?,
            }
            root.present().map_err(chart_err)?;
        }
        debug!("Wrote chart {}", path.display());
        Ok(path)
    }

    /// Two panels: the average as a line on top, stacked level buckets below.
    pub fn render_response_time(&self, series: &ResponseTimeSeries) -> Result<PathBuf> {
        let (avg, levels) = aligned_panels(series);
        let path = self.prepare(&series.metric_name)?;
        {
            let root = BitMapBackend::new(&path, self.size).into_drawing_area();
            root.fill(&WHITE).map_err(chart_err)?;
            let panels = root.split_evenly((2, 1));
            draw_line(&panels[0], &avg, AVERAGE)?;
            draw_stacked_levels(&panels[1], &levels)?;
            root.present().map_err(chart_err)?;
        }
        debug!("Wrote chart {}", path.display());
        Ok(path)
    }

    fn prepare(&self, resource: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        Ok(self.path_for(resource))
    }
}

fn frame(x: &Range<f64>, y: &Range<f64>) -> Vec<PathElement<(f64, f64)>> {
    let mut lines: Vec<PathElement<(f64, f64)>> = (1..=4)
        .map(|i| {
            let level = y.start + (y.end - y.start) * f64::from(i) / 4.0;
            PathElement::new(vec![(x.start, level), (x.end, level)], &GRID)
        })
        .collect();
    let zero = y.start.max(0.0);
    lines.push(PathElement::new(vec![(x.start, zero), (x.end, zero)], &BLACK));
    lines.push(PathElement::new(vec![(x.start, y.start), (x.start, y.end)], &BLACK));
    lines
}

#[allow(clippy::cast_precision_loss)]
fn draw_line(area: &Area<'_>, values: &[Option<f64>], color: RGBColor) -> Result<()> {
    let (x, y) = (x_range(values.len()), value_range(values.iter().flatten().copied()));
    let mut chart = ChartBuilder::on(area)
        .margin(20)
        .build_cartesian_2d(x.clone(), y.clone())
        .map_err(chart_err)?;

    chart.draw_series(frame(&x, &y)).map_err(chart_err)?;

    // one line per run of consecutive months
    let points: Vec<Option<(f64, f64)>> = values
        .iter()
        .enumerate()
        .map(|(i, v)| v.map(|v| (i as f64, v)))
        .collect();
    for run in points.split(Option::is_none).filter(|run| !run.is_empty()) {
        chart
            .draw_series(LineSeries::new(
                run.iter().flatten().copied(),
                color.stroke_width(2),
            ))
            .map_err(chart_err)?;
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn draw_bars(area: &Area<'_>, values: &[f64], color: RGBColor) -> Result<()> {
    let (x, y) = (x_range(values.len()), value_range(values.iter().copied()));
    let mut chart = ChartBuilder::on(area)
        .margin(20)
        .build_cartesian_2d(x.clone(), y.clone())
        .map_err(chart_err)?;

    chart.draw_series(frame(&x, &y)).map_err(chart_err)?;
    chart
        .draw_series(values.iter().enumerate().map(|(i, v)| {
            let center = i as f64;
            Rectangle::new(
                [(center - BAR_HALF_WIDTH, 0.0), (center + BAR_HALF_WIDTH, *v)],
                color.filled(),
            )
        }))
        .map_err(chart_err)?;
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn draw_stacked_levels(area: &Area<'_>, levels: &[Option<[f64; 4]>]) -> Result<()> {
    let totals = levels.iter().flatten().map(|l| l.iter().sum::<f64>());
    let (x, y) = (x_range(levels.len()), value_range(totals));
    let mut chart = ChartBuilder::on(area)
        .margin(20)
        .build_cartesian_2d(x.clone(), y.clone())
        .map_err(chart_err)?;

    chart.draw_series(frame(&x, &y)).map_err(chart_err)?;

    // level 1 first so level 4 ends up on top
    for (k, color) in LEVEL_COLORS.iter().enumerate() {
        chart
            .draw_series(levels.iter().enumerate().filter_map(|(i, period)| {
                let period = period.as_ref()?;
                let center = i as f64;
                let base = stack_baselines(period)[k];
                Some(Rectangle::new(
                    [
                        (center - BAR_HALF_WIDTH, base),
                        (center + BAR_HALF_WIDTH, base + period[k]),
                    ],
                    color.filled(),
                ))
            }))
            .map_err(chart_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{Point, YearMonth};
    use serde_json::json;

    fn month(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    fn series(metric_name: &str, values: &[f64]) -> MetricSeries {
        MetricSeries {
            repo_name: "owner/repo".to_string(),
            metric_name: metric_name.to_string(),
            points: values
                .iter()
                .enumerate()
                .map(|(i, v)| Point {
                    period: month(&format!("2023-{:02}", i + 1)),
                    value: json!(v),
                })
                .collect(),
        }
    }

    fn response_time(avg: &[(&str, f64)], levels: &[(&str, [f64; 4])]) -> ResponseTimeSeries {
        ResponseTimeSeries {
            repo_name: "owner/repo".to_string(),
            metric_name: "issue_response_time".to_string(),
            avg: avg
                .iter()
                .map(|(m, v)| Point { period: month(m), value: *v })
                .collect(),
            levels: levels
                .iter()
                .map(|(m, v)| Point { period: month(m), value: *v })
                .collect(),
        }
    }

    #[test]
    fn baselines_accumulate_lower_levels() {
        assert_eq!(stack_baselines(&[2.0, 3.0, 1.0, 4.0]), [0.0, 2.0, 5.0, 6.0]);
    }

    #[test]
    fn baselines_of_empty_period_are_zero() {
        assert_eq!(stack_baselines(&[0.0; 4]), [0.0; 4]);
    }

    #[test]
    fn value_range_includes_zero_and_headroom() {
        let range = value_range([3.0, 10.0]);
        assert_eq!(range.start, 0.0);
        assert!(range.end > 10.0);

        let negative = value_range([-4.0, 2.0]);
        assert!(negative.start < -4.0);
    }

    #[test]
    fn flat_zero_series_still_has_a_range() {
        let range = value_range([0.0, 0.0]);
        assert!(range.end > range.start);
    }

    #[test]
    fn writes_line_and_bar_pngs() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ChartRenderer::new(dir.path().join("owner/repo"), (320, 200));

        let openrank = series("openrank", &[1.0, 4.0, 2.5]);
        let stars = series("stars", &[5.0, 0.0, 7.0]);

        let line = renderer
            .render_series(&openrank, &[1.0, 4.0, 2.5], ChartStyle::Line(Palette::Red))
            .unwrap();
        let bars = renderer
            .render_series(&stars, &[5.0, 0.0, 7.0], ChartStyle::Bar(Palette::Orange))
            .unwrap();

        assert_eq!(line, dir.path().join("owner/repo/openrank.png"));
        assert!(line.exists());
        assert!(bars.exists());
    }

    #[test]
    fn writes_two_panel_response_time_png() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ChartRenderer::new(dir.path().to_path_buf(), (320, 400));

        let series = response_time(
            &[("2023-01", 3.0), ("2023-02", 4.5)],
            &[("2023-01", [2.0, 3.0, 1.0, 4.0]), ("2023-02", [1.0, 1.0, 1.0, 1.0])],
        );

        let path = renderer.render_response_time(&series).unwrap();

        assert_eq!(path, dir.path().join("issue_response_time.png"));
        assert_eq!(&fs::read(&path).unwrap()[1..4], b"PNG");
    }

    #[test]
    fn panels_share_month_positions() {
        let series = response_time(
            &[("2023-02", 4.5), ("2023-03", 1.0)],
            &[("2023-01", [1.0, 0.0, 0.0, 0.0]), ("2023-02", [2.0, 3.0, 1.0, 4.0])],
        );

        let (avg, levels) = aligned_panels(&series);

        assert_eq!(avg, vec![None, Some(4.5), Some(1.0)]);
        assert_eq!(
            levels,
            vec![Some([1.0, 0.0, 0.0, 0.0]), Some([2.0, 3.0, 1.0, 4.0]), None]
        );
    }

    #[test]
    fn writes_response_time_png_with_gaps() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ChartRenderer::new(dir.path().to_path_buf(), (320, 400));
        let series = response_time(
            &[("2023-01", 2.0), ("2023-03", 5.0)],
            &[("2023-02", [2.0, 3.0, 1.0, 4.0])],
        );

        let path = renderer.render_response_time(&series).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn unwritable_directory_is_an_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        // a regular file cannot be used as the output directory
        let renderer = ChartRenderer::new(file.path().to_path_buf(), (100, 100));

        let result = renderer.render_series(
            &series("openrank", &[1.0]),
            &[1.0],
            ChartStyle::Line(Palette::Red),
        );
        assert!(matches!(result, Err(OpenDiggerError::Io(_))));
    }
}
