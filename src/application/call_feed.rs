// Feed trait for the open-data call records
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait CallFeed: Send + Sync {
    /// Fetch every raw record of the feed, in feed order
    async fn fetch_records(&self) -> anyhow::Result<Vec<Value>>;

    /// Human readable source, for logs
    fn describe(&self) -> String;
}
