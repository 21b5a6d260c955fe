use crate::core::{ScrapeSource, ScrapedProduct};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// 從本機 JSON 檔讀取爬取結果（單一物件或陣列）
#[derive(Debug, Clone)]
pub struct LocalScrapeSource {
    path: PathBuf,
}

impl LocalScrapeSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ScrapeSource for LocalScrapeSource {
    async fn scraped_products(&self) -> Result<Vec<ScrapedProduct>> {
        let data = tokio::fs::read(&self.path).await?;
        let value: serde_json::Value = serde_json::from_slice(&data)?;

        let products = match value {
            serde_json::Value::Array(_) => serde_json::from_value(value)?,
            other => vec![serde_json::from_value(other)?],
        };
        tracing::debug!(
            "Loaded {} scraped products from {}",
            products.len(),
            self.path.display()
        );
        Ok(products)
    }
}
