use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use indexmap::IndexMap;
use log::{error, info, warn};
use serde_json::Value;

use crate::catalog::{ChartStyle, Index, IndexSelector, Metric, MetricSelector, Resource, Shape};
use crate::client::OpenDiggerClient;
use crate::error::{OpenDiggerError, Result};
use crate::output::chart::ChartRenderer;
use crate::output::markdown::{self, MarkdownReport};
use crate::output::{bright, bright_green, bright_red, bright_yellow, terminal, FetchSpinner};
use crate::series::{
    normalize, normalize_response_time, MetricSeries, RawResponseTime, ResponseTimeSeries,
    YearMonth,
};

const USAGE: &str =
    "Please provide a repository name (--repo <owner>/<name>) and a valid --index or --metric.";

/// Raw selectors as typed on the command line.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub repo: Option<String>,
    pub index: Option<String>,
    pub metric: Option<String>,
    pub month: Option<String>,
    pub download: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadFormat {
    Markdown,
}

impl FromStr for DownloadFormat {
    type Err = OpenDiggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "md" => Ok(Self::Markdown),
            other => Err(OpenDiggerError::Usage(format!(
                "Unsupported download format '{other}'. Expected: md"
            ))),
        }
    }
}

/// A validated request: which kinds to run, in which order, and for which month.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub repo: String,
    pub indexes: Vec<Index>,
    pub metrics: Vec<Metric>,
    pub month: Option<YearMonth>,
    pub download: Option<DownloadFormat>,
}

impl Plan {
    pub fn from_request(request: &Request) -> Result<Self> {
        let repo = request
            .repo
            .as_deref()
            .map(str::trim)
            .filter(|repo| !repo.is_empty())
            .ok_or_else(|| OpenDiggerError::Usage("Missing repository name".to_string()))?;
        validate_repo(repo)?;

        let indexes = request
            .index
            .as_deref()
            .map(IndexSelector::from_str)
            .transpose()?
            .map(IndexSelector::expand)
            .unwrap_or_default();
        let metrics = request
            .metric
            .as_deref()
            .map(MetricSelector::from_str)
            .transpose()?
            .map(MetricSelector::expand)
            .unwrap_or_default();
        if indexes.is_empty() && metrics.is_empty() {
            return Err(OpenDiggerError::Usage(
                "No index or metric requested".to_string(),
            ));
        }

        let month = request
            .month
            .as_deref()
            .map(|month| {
                month.parse::<YearMonth>().map_err(|_| {
                    OpenDiggerError::Usage(format!("Invalid month '{month}', expected YYYY-MM"))
                })
            })
            .transpose()?;
        let download = request
            .download
            .as_deref()
            .map(DownloadFormat::from_str)
            .transpose()?;

        Ok(Self {
            repo: repo.to_string(),
            indexes,
            metrics,
            month,
            download,
        })
    }
}

/// GitHub owners are alphanumeric with hyphens; repository names may also
/// contain `_` and `.`, but never consist only of dots.
fn validate_repo(repo: &str) -> Result<()> {
    let invalid = || {
        OpenDiggerError::Usage(format!(
            "Repository must be in format 'owner/repo', got '{repo}'"
        ))
    };

    let (owner, name) = repo.split_once('/').ok_or_else(invalid)?;
    let owner_ok =
        !owner.is_empty() && owner.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    let name_ok = !name.is_empty()
        && name.chars().any(|c| c != '.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if owner_ok && name_ok {
        Ok(())
    } else {
        Err(invalid())
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every requested kind was attempted. Individual resources may have had no data.
    Completed,
    /// The request was rejected before any network call.
    Usage,
    /// The report file could not be opened or flushed.
    OutputFailed,
}

impl RunStatus {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::Completed => ExitCode::SUCCESS,
            Self::OutputFailed => ExitCode::from(1),
            Self::Usage => ExitCode::from(2),
        }
    }
}

/// Runs the fetch → normalize → render pipelines for one request.
pub struct Dispatcher {
    client: OpenDiggerClient,
    output_dir: PathBuf,
    chart_size: (u32, u32),
}

impl Dispatcher {
    pub fn new(client: OpenDiggerClient, output_dir: PathBuf, chart_size: (u32, u32)) -> Self {
        Self {
            client,
            output_dir,
            chart_size,
        }
    }

    pub async fn dispatch(&self, request: &Request) -> RunStatus {
        let plan = match Plan::from_request(request) {
            Ok(plan) => plan,
            Err(e) => {
                warn!("Rejected request: {e}");
                eprintln!("{}", bright_red(&e));
                eprintln!("{USAGE}");
                return RunStatus::Usage;
            }
        };

        info!(
            "Running {} indexes and {} metrics for {}",
            plan.indexes.len(),
            plan.metrics.len(),
            plan.repo
        );
        println!("repo.name: {}", plan.repo);
        println!("repo.url: https://github.com/{}", plan.repo);

        let repo_dir = self.output_dir.join(&plan.repo);
        let report = match plan.download {
            None => None,
            Some(DownloadFormat::Markdown) => match open_report(&repo_dir, &plan) {
                Ok(report) => Some(report),
                Err(e) => {
                    error!("Cannot open report in {}: {e}", repo_dir.display());
                    eprintln!(
                        "{}",
                        bright_red(format!(
                            "The download file failed to open in {}: {e}",
                            repo_dir.display()
                        ))
                    );
                    return RunStatus::OutputFailed;
                }
            },
        };
        let charts = report
            .as_ref()
            .map(|_| ChartRenderer::new(repo_dir.clone(), self.chart_size));

        let mut session = Session {
            client: &self.client,
            repo: &plan.repo,
            month: plan.month,
            report,
            charts,
            failures: 0,
        };
        session.run(&plan).await;
        session.finish()
    }
}

fn open_report(dir: &Path, plan: &Plan) -> std::io::Result<MarkdownReport> {
    let mut report = MarkdownReport::create(dir)?;
    report.write(&markdown::header(&plan.repo, plan.month))?;
    Ok(report)
}

/// State of one run: the shared client, the optional report sink and chart writer.
struct Session<'a> {
    client: &'a OpenDiggerClient,
    repo: &'a str,
    month: Option<YearMonth>,
    report: Option<MarkdownReport>,
    charts: Option<ChartRenderer>,
    failures: usize,
}

impl Session<'_> {
    async fn run(&mut self, plan: &Plan) {
        if !plan.indexes.is_empty() {
            self.group("Repo Indexes");
            for index in &plan.indexes {
                self.run_kind(index.title(), index.resources()).await;
            }
        }

        if !plan.metrics.is_empty() {
            self.group("Repo Metrics");
            for metric in &plan.metrics {
                self.run_kind(metric.title(), metric.resources()).await;
            }
        }
    }

    fn group(&mut self, title: &str) {
        println!("\n{}", bright(title).underlined());
        if let Err(e) = self.write_report(&markdown::group_heading(title)) {
            warn!("Failed to write {title} heading: {e}");
        }
    }

    /// Errors stop this kind only; the next kind in the plan still runs.
    async fn run_kind(&mut self, title: &str, resources: &[Resource]) {
        if let Err(e) = self.try_run_kind(title, resources).await {
            self.failures += 1;
            error!("{title} for {} failed: {e}", self.repo);
            eprintln!("{}", bright_red(format!("{title}: {e}")));
        }
    }

    async fn try_run_kind(&mut self, title: &str, resources: &[Resource]) -> Result<()> {
        println!("\n{}", bright(title).underlined());
        self.write_report(&markdown::kind_heading(title))?;

        for resource in resources {
            self.run_resource(resource).await?;
        }
        Ok(())
    }

    async fn run_resource(&mut self, resource: &Resource) -> Result<()> {
        match (resource.shape, self.month) {
            (Shape::Series(style), None) => self.show_series(resource, style).await,
            (Shape::ResponseTime, None) => self.show_response_time(resource).await,
            (Shape::Snapshot, None) => self.month_required(resource),
            (Shape::ResponseTime, Some(month)) => {
                self.show_response_time_month(resource, month).await
            }
            (Shape::Series(_) | Shape::Snapshot, Some(month)) => {
                self.show_month_value(resource, month).await
            }
        }
    }

    /// Awaits a request, turning fetch failures into a "no data" notice.
    async fn fetched<T>(
        &mut self,
        resource: &Resource,
        request: impl Future<Output = Result<T>>,
    ) -> Result<Option<T>> {
        let spinner = FetchSpinner::start(resource.label);
        let result = request.await;
        spinner.finish();

        match result {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.is_fetch_failure() => {
                warn!("{} unavailable for {}: {e}", resource.name, self.repo);
                println!(
                    "{}\n\t{}",
                    bright(format!("{}:", resource.label)),
                    bright_yellow(format!("no data ({e})"))
                );
                self.write_report(&format!(
                    "#### {}\n{}",
                    resource.label,
                    markdown::notice(&format!("No {} data available", resource.label))
                ))?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn show_series(&mut self, resource: &Resource, style: ChartStyle) -> Result<()> {
        let (client, repo) = (self.client, self.repo);
        let request = client.fetch::<IndexMap<String, Value>>(repo, resource.name);
        let Some(raw) = self.fetched(resource, request).await? else {
            return Ok(());
        };

        let series = MetricSeries {
            repo_name: repo.to_string(),
            metric_name: resource.name.to_string(),
            points: normalize(raw)?,
        };
        println!("{}", terminal::render_series(resource.label, &series));

        if self.report.is_none() {
            return Ok(());
        }

        let chart = match series.numeric_values() {
            Some(values) if !values.is_empty() => self.chart(resource, |charts| {
                charts.render_series(&series, &values, style)
            }),
            _ => None,
        };
        self.write_report(&markdown::series_section(
            resource.label,
            &series,
            chart.as_deref(),
        ))
    }

    async fn show_response_time(&mut self, resource: &Resource) -> Result<()> {
        let (client, repo) = (self.client, self.repo);
        let request = client.fetch::<RawResponseTime>(repo, resource.name);
        let Some(raw) = self.fetched(resource, request).await? else {
            return Ok(());
        };

        let (avg, levels) = normalize_response_time(raw)?;
        let series = ResponseTimeSeries {
            repo_name: repo.to_string(),
            metric_name: resource.name.to_string(),
            avg,
            levels,
        };
        println!("{}", terminal::render_response_time(resource.label, &series));

        if self.report.is_none() {
            return Ok(());
        }

        let chart = if series.is_empty() {
            None
        } else {
            self.chart(resource, |charts| charts.render_response_time(&series))
        };
        self.write_report(&markdown::response_time_section(
            resource.label,
            &series,
            chart.as_deref(),
        ))
    }

    async fn show_month_value(&mut self, resource: &Resource, month: YearMonth) -> Result<()> {
        let (client, repo) = (self.client, self.repo);
        let request = client.fetch_month(repo, resource.name, month);
        let Some(value) = self.fetched(resource, request).await? else {
            return Ok(());
        };

        print!(
            "{}",
            terminal::render_month_value(resource.label, month, value.as_ref())
        );
        self.write_report(&markdown::month_value(resource.label, month, value.as_ref()))
    }

    async fn show_response_time_month(
        &mut self,
        resource: &Resource,
        month: YearMonth,
    ) -> Result<()> {
        let (client, repo) = (self.client, self.repo);
        let request = client.fetch_response_time_month(repo, resource.name, month);
        let Some((avg, levels)) = self.fetched(resource, request).await? else {
            return Ok(());
        };

        print!(
            "{}",
            terminal::render_response_time_month(resource.label, month, avg, levels)
        );
        self.write_report(&markdown::response_time_month(
            resource.label,
            month,
            avg,
            levels,
        ))
    }

    fn month_required(&mut self, resource: &Resource) -> Result<()> {
        println!(
            "\t{}",
            bright_yellow(format!("{} requires --month YYYY-MM", resource.label))
        );
        self.write_report(&markdown::notice(&format!(
            "{} is only available for a specific month",
            resource.label
        )))
    }

    /// Renders a chart and returns its file name for the Markdown image link.
    /// A failed chart is reported and skipped.
    fn chart(
        &self,
        resource: &Resource,
        render: impl FnOnce(&ChartRenderer) -> Result<PathBuf>,
    ) -> Option<String> {
        let charts = self.charts.as_ref()?;
        match render(charts) {
            Ok(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            Err(e) => {
                warn!("Chart for {} failed: {e}", resource.name);
                eprintln!(
                    "{}",
                    bright_red(format!("Could not save {} chart: {e}", resource.label))
                );
                None
            }
        }
    }

    fn write_report(&mut self, text: &str) -> Result<()> {
        if let Some(report) = self.report.as_mut() {
            report.write(text)?;
        }
        Ok(())
    }

    fn finish(self) -> RunStatus {
        if self.failures > 0 {
            warn!("{} requested kinds failed for {}", self.failures, self.repo);
        }

        let Some(report) = self.report else {
            return RunStatus::Completed;
        };

        let path = report.path().to_path_buf();
        match report.finish() {
            Ok(path) => {
                println!(
                    "\n{}",
                    bright_green(format!(
                        "The download file was written successfully to {}.",
                        path.display()
                    ))
                );
                RunStatus::Completed
            }
            Err(e) => {
                error!("Failed to flush {}: {e}", path.display());
                eprintln!(
                    "{}",
                    bright_red(format!("The download file failed to write: {e}"))
                );
                RunStatus::OutputFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use std::fs;

    const SEVEN_MONTHS: &str = r#"{"2023-01": 1, "2023-02": 2, "2023-03": 3, "2023-04": 4, "2023-05": 5, "2023-06": 6, "2023-07": 7}"#;

    fn dispatcher(server: &Server, output_dir: &Path) -> Dispatcher {
        let client = OpenDiggerClient::new(&server.url()).unwrap();
        Dispatcher::new(client, output_dir.to_path_buf(), (200, 120))
    }

    fn request(index: Option<&str>, metric: Option<&str>) -> Request {
        Request {
            repo: Some("owner/repo".to_string()),
            index: index.map(str::to_string),
            metric: metric.map(str::to_string),
            ..Request::default()
        }
    }

    fn download(mut request: Request) -> Request {
        request.download = Some("md".to_string());
        request
    }

    async fn mock_resource(server: &mut Server, resource: &str, body: &str) -> mockito::Mock {
        server
            .mock("GET", format!("/owner/repo/{resource}.json").as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    async fn no_requests(server: &mut Server) -> mockito::Mock {
        server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await
    }

    fn report_text(output_dir: &Path) -> String {
        fs::read_to_string(output_dir.join("owner/repo").join(markdown::REPORT_FILE)).unwrap()
    }

    #[test]
    fn plan_expands_selectors_in_order() {
        let plan = Plan::from_request(&request(Some("all"), Some("stars"))).unwrap();

        assert_eq!(plan.repo, "owner/repo");
        assert_eq!(
            plan.indexes,
            vec![Index::OpenRank, Index::Activity, Index::Attention]
        );
        assert_eq!(plan.metrics, vec![Metric::Stars]);
        assert_eq!(plan.month, None);
        assert_eq!(plan.download, None);
    }

    #[test]
    fn plan_parses_month_and_download() {
        let mut req = download(request(None, Some("bus_factor")));
        req.month = Some("2023-02".to_string());

        let plan = Plan::from_request(&req).unwrap();

        assert_eq!(plan.month, Some("2023-02".parse().unwrap()));
        assert_eq!(plan.download, Some(DownloadFormat::Markdown));
        assert!(plan.indexes.is_empty());
    }

    #[test]
    fn plan_rejects_invalid_requests() {
        let mut cases = vec![
            Request::default(),
            request(None, None),
            request(Some("stars"), None),
            request(None, Some("forks")),
        ];

        let mut bad_repo = request(Some("openrank"), None);
        bad_repo.repo = Some("just-a-name".to_string());
        cases.push(bad_repo);

        for repo in [
            "owner/repo/extra",
            "../..",
            "owner/..",
            "owner/.",
            "./x",
            "../repo",
            "owner/re po",
            "owner/repo?x=1",
            "own.er/repo",
            "owner\\repo",
        ] {
            let mut unsafe_repo = request(Some("openrank"), None);
            unsafe_repo.repo = Some(repo.to_string());
            cases.push(unsafe_repo);
        }

        let mut bad_month = request(Some("openrank"), None);
        bad_month.month = Some("2023-2".to_string());
        cases.push(bad_month);

        let mut bad_format = request(Some("openrank"), None);
        bad_format.download = Some("pdf".to_string());
        cases.push(bad_format);

        for case in cases {
            assert!(
                matches!(Plan::from_request(&case), Err(OpenDiggerError::Usage(_))),
                "{case:?} should be a usage error"
            );
        }
    }

    #[test]
    fn plan_accepts_github_style_names() {
        for repo in ["X-lab2017/open-digger", "rust-lang/rust.vim", "a/b_c", "owner/.github"] {
            let mut req = request(Some("openrank"), None);
            req.repo = Some(repo.to_string());
            assert_eq!(Plan::from_request(&req).unwrap().repo, repo);
        }
    }

    #[test]
    fn exit_codes_distinguish_outcomes() {
        assert_eq!(RunStatus::Completed.exit_code(), ExitCode::SUCCESS);
        assert_eq!(RunStatus::Usage.exit_code(), ExitCode::from(2));
        assert_eq!(RunStatus::OutputFailed.exit_code(), ExitCode::from(1));
    }

    #[tokio::test]
    async fn unknown_metric_makes_no_network_call() {
        let mut server = Server::new_async().await;
        let mock = no_requests(&mut server).await;
        let dir = tempfile::tempdir().unwrap();

        let status = dispatcher(&server, dir.path())
            .dispatch(&download(request(None, Some("forks"))))
            .await;

        assert_eq!(status, RunStatus::Usage);
        assert!(!dir.path().join("owner").exists());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_repo_makes_no_network_call() {
        let mut server = Server::new_async().await;
        let mock = no_requests(&mut server).await;
        let dir = tempfile::tempdir().unwrap();

        let mut req = request(Some("openrank"), None);
        req.repo = None;
        let status = dispatcher(&server, dir.path()).dispatch(&req).await;

        assert_eq!(status, RunStatus::Usage);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn download_creates_directory_and_overwrites_report() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/owner/repo/openrank.json")
            .with_status(200)
            .with_body(SEVEN_MONTHS)
            .expect(2)
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("fresh").join("reports");
        let dispatcher = dispatcher(&server, &output_dir);
        let req = download(request(Some("openrank"), None));

        assert_eq!(dispatcher.dispatch(&req).await, RunStatus::Completed);
        assert!(output_dir.join("owner/repo/openrank.png").exists());

        assert_eq!(dispatcher.dispatch(&req).await, RunStatus::Completed);
        let text = report_text(&output_dir);

        assert_eq!(text.matches("# OpenDigger Data Analysis - owner/repo").count(), 1);
        assert!(text.contains("## Repo Indexes"));
        assert!(text.contains("![OpenRank](./openrank.png)"));
        assert!(text.contains("| 01/2023: 1 | 02/2023: 2 | 03/2023: 3 | 04/2023: 4 |"));
        assert!(text.contains("| 05/2023: 5 | 06/2023: 6 |  |  |"));
        // trailing month is never reported
        assert!(!text.contains("07/2023"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn failed_chart_keeps_text_and_table() {
        let mut server = Server::new_async().await;
        mock_resource(&mut server, "openrank", SEVEN_MONTHS).await;
        let dir = tempfile::tempdir().unwrap();
        // a directory where the PNG should go makes the chart write fail
        fs::create_dir_all(dir.path().join("owner/repo/openrank.png")).unwrap();

        let status = dispatcher(&server, dir.path())
            .dispatch(&download(request(Some("openrank"), None)))
            .await;

        assert_eq!(status, RunStatus::Completed);
        let text = report_text(dir.path());
        assert!(text.contains("owner/repo **OpenRank** trend from 01/2023 to 06/2023"));
        assert!(text.contains("| 05/2023: 5 | 06/2023: 6 |  |  |"));
        assert!(!text.contains("!["));
    }

    #[tokio::test]
    async fn failing_metrics_do_not_abort_siblings() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/owner/repo/openrank.json")
            .with_status(500)
            .create_async()
            .await;
        mock_resource(&mut server, "activity", SEVEN_MONTHS).await;
        mock_resource(&mut server, "attention", r#"{"2023-01": 1, "last year": 2}"#).await;
        mock_resource(&mut server, "stars", SEVEN_MONTHS).await;
        let dir = tempfile::tempdir().unwrap();

        let status = dispatcher(&server, dir.path())
            .dispatch(&download(request(Some("all"), Some("stars"))))
            .await;

        assert_eq!(status, RunStatus::Completed);
        let text = report_text(dir.path());
        assert!(text.contains("No OpenRank data available"));
        assert!(text.contains("| Dates and Activity |"));
        assert!(text.contains("### Attention"));
        assert!(!text.contains("| Dates and Attention |"));
        assert!(text.contains("| Dates and Stars |"));
        assert!(text.find("### Attention") < text.find("## Repo Metrics"));
    }

    #[tokio::test]
    async fn month_request_reports_single_value_without_chart() {
        let mut server = Server::new_async().await;
        mock_resource(&mut server, "stars", r#"{"2023-01": 1, "2023-02": 2, "2023-03": 3}"#).await;
        let dir = tempfile::tempdir().unwrap();

        let mut req = download(request(None, Some("stars")));
        req.month = Some("2023-02".to_string());
        let status = dispatcher(&server, dir.path()).dispatch(&req).await;

        assert_eq!(status, RunStatus::Completed);
        let text = report_text(dir.path());
        assert!(text.contains("- month: 2023-02"));
        assert!(text.contains("- Stars in 2023-02: 2\n"));
        assert!(!text.contains("| ---"));
        assert!(!dir.path().join("owner/repo/stars.png").exists());
    }

    #[tokio::test]
    async fn month_only_metric_without_month_fetches_nothing() {
        let mut server = Server::new_async().await;
        let mock = no_requests(&mut server).await;
        let dir = tempfile::tempdir().unwrap();

        let status = dispatcher(&server, dir.path())
            .dispatch(&download(request(None, Some("active-dates-times"))))
            .await;

        assert_eq!(status, RunStatus::Completed);
        assert!(report_text(dir.path()).contains("only available for a specific month"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn report_open_failure_aborts_before_any_fetch() {
        let mut server = Server::new_async().await;
        let mock = no_requests(&mut server).await;
        let file = tempfile::NamedTempFile::new().unwrap();

        // the output "directory" is a regular file, so the repo folder cannot be created
        let status = dispatcher(&server, file.path())
            .dispatch(&download(request(Some("all"), None)))
            .await;

        assert_eq!(status, RunStatus::OutputFailed);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn issues_render_response_time_as_two_panel_chart() {
        let mut server = Server::new_async().await;
        mock_resource(&mut server, "issue_new", SEVEN_MONTHS).await;
        mock_resource(
            &mut server,
            "issue_response_time",
            r#"{"avg": {"2023-01": 2.5, "2023-02": 4.0, "2023-03": 1.0},
                "levels": {"2023-01": [2, 3, 1, 4], "2023-02": [1, 1, 1, 1], "2023-03": [0, 0, 0, 0]}}"#,
        )
        .await;
        let dir = tempfile::tempdir().unwrap();

        let status = dispatcher(&server, dir.path())
            .dispatch(&download(request(None, Some("issues"))))
            .await;

        assert_eq!(status, RunStatus::Completed);
        let text = report_text(dir.path());
        assert!(text.contains("### Issues"));
        assert!(text.contains("| Dates and Issues new |"));
        assert!(text.contains("| 01/2023 | 2.50 | 2 | 3 | 1 | 4 |"));
        assert!(!text.contains("| 03/2023 |"));
        // unmocked resources answer 501 and degrade to a notice
        assert!(text.contains("No Issue age data available"));
        assert!(dir.path().join("owner/repo/issue_response_time.png").exists());
    }
}
