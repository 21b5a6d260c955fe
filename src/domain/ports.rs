use crate::domain::model::{Credentials, ScrapedProduct};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 提供商家憑證，實際來源可以是設定檔或外部資料庫
pub trait CredentialStore: Send + Sync {
    fn credentials(&self) -> impl std::future::Future<Output = Result<Credentials>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
    fn upload_images(&self) -> bool;
    fn upload_concurrency(&self) -> usize;
}

#[async_trait]
pub trait ScrapeSource: Send + Sync {
    async fn scraped_products(&self) -> Result<Vec<ScrapedProduct>>;
}
