use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpenDiggerError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {url}")]
    Status { status: u16, url: String },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid period key '{0}', expected YYYY-MM")]
    Format(String),

    #[error("{0}")]
    Usage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Chart rendering failed: {0}")]
    Chart(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl OpenDiggerError {
    /// Failures that only mean "no data for this resource".
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Status { .. } | Self::Decode { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, OpenDiggerError>;
