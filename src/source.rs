use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

use crate::error::{LoadError, LoadResult};

/// Default location of the screening results
pub const DEFAULT_SOURCE: &str = "results_kospi_200.csv";

/// Where the screening CSV comes from
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    File(PathBuf),
    Http(String),
}

impl DataSource {
    /// Interpret a location: `http://` and `https://` are URLs, anything else a path
    pub fn parse(location: &str) -> Self {
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DataSource::Http(location.to_string())
        } else {
            DataSource::File(PathBuf::from(location))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::File(path) => write!(f, "{}", path.display()),
            DataSource::Http(url) => write!(f, "{}", url),
        }
    }
}

/// Something that can produce the raw CSV text. Runs on the loader thread.
pub trait Fetch: Send + Sync {
    fn fetch(&self) -> LoadResult<String>;

    /// Short description for logs and the status line
    fn describe(&self) -> String;
}

/// Reads a [`DataSource`] from disk or over HTTP
pub struct SourceFetcher {
    source: DataSource,
    timeout: Duration,
}

impl SourceFetcher {
    pub fn new(source: DataSource, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    fn read_file(path: &PathBuf) -> LoadResult<String> {
        let bytes = std::fs::read(path)?;
        Ok(String::from_utf8(bytes)?)
    }

    fn get(&self, url: &str) -> LoadResult<String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("rsiview/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let response = client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Http {
                status: status.as_u16(),
            });
        }

        Ok(response.text()?)
    }
}

impl Fetch for SourceFetcher {
    fn fetch(&self) -> LoadResult<String> {
        info!(source = %self.source, "fetching screening results");
        match &self.source {
            DataSource::File(path) => Self::read_file(path),
            DataSource::Http(url) => self.get(url),
        }
    }

    fn describe(&self) -> String {
        self.source.to_string()
    }
}
