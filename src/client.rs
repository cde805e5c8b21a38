use indexmap::IndexMap;
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::error::{OpenDiggerError, Result};
use crate::series::{RawResponseTime, YearMonth};

pub const DEFAULT_BASE_URL: &str = "https://oss.x-lab.info/open_digger/github/";

/// Client for the OpenDigger static JSON API.
///
/// Every resource lives at `<base>/<owner>/<repo>/<resource>.json`. Requests are
/// issued one at a time and never retried.
pub struct OpenDiggerClient {
    client: Client,
    base_url: Url,
}

impl OpenDiggerClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("opendigger/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OpenDiggerError::Config(format!("Failed to create HTTP client: {e}")))?;

        // Url::join drops the last path segment unless the base ends with '/'
        let base = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&base)
            .map_err(|e| OpenDiggerError::Config(format!("Invalid base URL: {e}")))?;

        Ok(Self { client, base_url })
    }

    pub fn resource_url(&self, repo: &str, resource: &str) -> Result<Url> {
        self.base_url
            .join(&format!("{repo}/{resource}.json"))
            .map_err(|e| OpenDiggerError::Config(format!("Invalid resource URL: {e}")))
    }

    /// Downloads and decodes one resource.
    pub async fn fetch<T>(&self, repo: &str, resource: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.resource_url(repo, resource)?;
        debug!("GET {url}");

        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OpenDiggerError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| OpenDiggerError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// Downloads a flat resource and returns only the value for `month`.
    ///
    /// A month the API has no entry for is `Ok(None)`.
    pub async fn fetch_month(
        &self,
        repo: &str,
        resource: &str,
        month: YearMonth,
    ) -> Result<Option<Value>> {
        let mut data: IndexMap<String, Value> = self.fetch(repo, resource).await?;
        Ok(data.shift_remove(&month.key()))
    }

    /// Month lookup for the structured response-time resources.
    pub async fn fetch_response_time_month(
        &self,
        repo: &str,
        resource: &str,
        month: YearMonth,
    ) -> Result<(Option<f64>, Option<[f64; 4]>)> {
        let mut data: RawResponseTime = self.fetch(repo, resource).await?;
        let key = month.key();
        Ok((data.avg.shift_remove(&key), data.levels.shift_remove(&key)))
    }
}
