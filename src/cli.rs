use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

use crate::client::OpenDiggerClient;
use crate::config::Config;
use crate::dispatch::{Dispatcher, Request, RunStatus};

#[derive(Parser)]
#[command(name = "opendigger")]
#[command(author, version, about = "Repository health metrics from OpenDigger", long_about = None)]
pub struct Cli {
    /// Repository as owner/name
    #[arg(short, long)]
    repo: Option<String>,

    /// Index to show: openrank, activity, attention or all
    #[arg(short, long)]
    index: Option<String>,

    /// Metric to show, e.g. stars, issues, pr or all
    #[arg(short, long)]
    metric: Option<String>,

    /// Only show the value for this month (YYYY-MM)
    #[arg(long)]
    month: Option<String>,

    /// Write a report in this format (md)
    #[arg(short, long)]
    download: Option<String>,

    /// Directory the report and charts are written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// OpenDigger API base URL
    #[arg(long, env = "OPENDIGGER_BASE_URL")]
    base_url: Option<String>,

    /// Path to a configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn request(&self) -> Request {
        Request {
            repo: self.repo.clone(),
            index: self.index.clone(),
            metric: self.metric.clone(),
            month: self.month.clone(),
            download: self.download.clone(),
        }
    }

    /// Config file values, overridden by whatever was given on the command line.
    fn settings(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;

        if let Some(base_url) = &self.base_url {
            config.api.base_url.clone_from(base_url);
        }
        if let Some(dir) = &self.output_dir {
            config.output.dir.clone_from(dir);
        }

        Ok(config)
    }

    pub async fn execute(&self) -> Result<RunStatus> {
        let config = self.settings()?;
        info!("Using OpenDigger API at {}", config.api.base_url);

        let client = OpenDiggerClient::new(&config.api.base_url)
            .with_context(|| format!("Invalid base URL: {}", config.api.base_url))?;
        let dispatcher = Dispatcher::new(
            client,
            config.output.dir,
            (config.output.chart_width, config.output.chart_height),
        );

        Ok(dispatcher.dispatch(&self.request()).await)
    }
}
