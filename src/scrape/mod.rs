//! Network-facing status source.
//!
//! `StatusSource` is the seam between the pipeline and the outside
//! world: the collector and orchestrator only ever see this trait, so
//! tests can substitute a scripted source.

pub mod parse;

use std::collections::BTreeMap;

use async_trait::async_trait;
use url::Url;

use crate::config::Settings;
use crate::error::{DirectoryUnavailable, LotError};
use crate::status::RawStatus;

pub const USER_AGENT: &str = concat!("lotwatch/", env!("CARGO_PKG_VERSION"));

/// Resolves the current lot directory and individual lot statuses.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetch and parse the directory page into a name -> URL map.
    async fn directory(&self) -> Result<BTreeMap<String, String>, DirectoryUnavailable>;

    /// Fetch and parse one lot's detail page into its raw status.
    async fn lot_status(&self, url: &str) -> Result<RawStatus, LotError>;
}

/// Live HTTP source scraping the parking site.
pub struct HttpSource {
    client: reqwest::Client,
    directory_url: Url,
}

impl HttpSource {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.fetch_timeout)
            .gzip(true)
            .brotli(true)
            .build()?;
        let directory_url = Url::parse(&settings.directory_url)?;
        Ok(Self {
            client,
            directory_url,
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, reqwest::Error> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        response.text().await
    }
}

#[async_trait]
impl StatusSource for HttpSource {
    async fn directory(&self) -> Result<BTreeMap<String, String>, DirectoryUnavailable> {
        let html = self
            .get_text(self.directory_url.as_str())
            .await
            .map_err(|e| DirectoryUnavailable(e.to_string()))?;
        Ok(parse::parse_directory(&html, &self.directory_url))
    }

    async fn lot_status(&self, url: &str) -> Result<RawStatus, LotError> {
        let html = self
            .get_text(url)
            .await
            .map_err(|e| LotError::Unreachable(e.to_string()))?;
        parse::parse_status(&html)
    }
}
