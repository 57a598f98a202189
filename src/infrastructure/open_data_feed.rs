// Open-data feed adapters - HTTP and local file sources of call records
use crate::application::call_feed::CallFeed;
use crate::infrastructure::config::FeedSettings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct HttpCallFeed {
    url: String,
    limit: Option<u32>,
    client: reqwest::Client,
}

impl HttpCallFeed {
    pub fn new(url: String, limit: Option<u32>) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            limit,
            client: reqwest::Client::new(),
        }
    }

    fn build_url(&self) -> String {
        match self.limit {
            Some(limit) => {
                let separator = if self.url.contains('?') { '&' } else { '?' };
                format!(
                    "{}{}{}={}",
                    self.url,
                    separator,
                    urlencoding::encode("$limit"),
                    limit
                )
            }
            None => self.url.clone(),
        }
    }
}

#[async_trait]
impl CallFeed for HttpCallFeed {
    async fn fetch_records(&self) -> Result<Vec<Value>> {
        let url = self.build_url();

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Feed request failed with status {}: {}", status, body);
        }

        response
            .json::<Vec<Value>>()
            .await
            .context("Failed to parse feed response as a JSON array")
    }

    fn describe(&self) -> String {
        self.build_url()
    }
}

#[derive(Debug, Clone)]
pub struct FileCallFeed {
    path: PathBuf,
}

impl FileCallFeed {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl CallFeed for FileCallFeed {
    async fn fetch_records(&self) -> Result<Vec<Value>> {
        let raw = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read feed file {}", self.path.display()))?;
        serde_json::from_slice(&raw)
            .with_context(|| format!("Feed file {} is not a JSON array", self.path.display()))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Local file when configured, the HTTP feed otherwise
pub fn feed_from_settings(settings: &FeedSettings) -> Arc<dyn CallFeed> {
    match &settings.path {
        Some(path) => Arc::new(FileCallFeed::new(path.clone())),
        None => Arc::new(HttpCallFeed::new(settings.url.clone(), settings.limit)),
    }
}
