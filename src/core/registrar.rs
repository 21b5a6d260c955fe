use crate::core::http::{read_failure, PlatformClient, ORIGIN_PRODUCTS_PATH, PRODUCTS_PATH};
use crate::core::image_upload::ImageUploader;
use crate::core::signer::Signer;
use crate::core::token_cache::TokenCache;
use crate::core::transformer::Transformer;
use crate::domain::model::{Credentials, RegistrationResult, ScrapedProduct, Token};
use crate::domain::payload::ProductPayload;
use crate::domain::ports::{ConfigProvider, CredentialStore, ScrapeSource};
use crate::utils::error::{Result, SmartstoreError};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductResponse {
    origin_product_no: Option<u64>,
    smartstore_channel_product_no: Option<u64>,
}

/// 單筆爬取結果的處理結果
#[derive(Debug)]
pub struct BatchOutcome {
    pub title: String,
    pub result: Result<RegistrationResult>,
}

/// 組合權杖、轉換、圖片上傳與商品建立。
///
/// 權杖快取由這裡持有；多個 `Registrar` 可以透過 `with_cache` 共用同一個快取。
pub struct Registrar {
    http: PlatformClient,
    signer: Signer,
    uploader: ImageUploader,
    transformer: Transformer,
    cache: Arc<TokenCache>,
    upload_images: bool,
}

impl Registrar {
    pub fn new(http: PlatformClient, transformer: Transformer) -> Self {
        Self {
            signer: Signer::new(http.clone()),
            uploader: ImageUploader::new(http.clone(), 4),
            http,
            transformer,
            cache: Arc::new(TokenCache::new()),
            upload_images: true,
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C, transformer: Transformer) -> Result<Self> {
        let http = PlatformClient::from_config(config)?;
        Ok(Self::new(http, transformer)
            .with_image_upload(config.upload_images(), config.upload_concurrency()))
    }

    pub fn with_image_upload(mut self, enabled: bool, concurrency: usize) -> Self {
        self.upload_images = enabled;
        self.uploader = ImageUploader::new(self.http.clone(), concurrency);
        self
    }

    pub fn with_cache(mut self, cache: Arc<TokenCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &Arc<TokenCache> {
        &self.cache
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    pub fn transformer(&self) -> &Transformer {
        &self.transformer
    }

    /// 建立新商品。每次呼叫都會在平台上產生一個新商品，不具冪等性。
    pub async fn register(
        &self,
        scraped: &ScrapedProduct,
        credentials: &Credentials,
    ) -> Result<RegistrationResult> {
        let (token, payload) = self.prepare(scraped, credentials).await?;

        tracing::info!("📦 Creating product '{}'", payload.origin_product.name);
        let url = self.http.endpoint(PRODUCTS_PATH);
        let body = self
            .send_product(Method::POST, &url, &token, &payload, credentials)
            .await?;
        let product_id = body.origin_product_no.ok_or_else(|| SmartstoreError::UpstreamError {
            status: StatusCode::OK.as_u16(),
            message: "Response has no originProductNo".to_string(),
        })?;

        tracing::info!("✅ Product registered: originProductNo={}", product_id);
        Ok(RegistrationResult {
            product_id,
            channel_product_no: body.smartstore_channel_product_no,
        })
    }

    /// 以最新爬取結果覆寫既有商品
    pub async fn update(
        &self,
        origin_product_no: u64,
        scraped: &ScrapedProduct,
        credentials: &Credentials,
    ) -> Result<RegistrationResult> {
        let (token, payload) = self.prepare(scraped, credentials).await?;
        let url = format!(
            "{}/{}",
            self.http.endpoint(ORIGIN_PRODUCTS_PATH),
            origin_product_no
        );

        tracing::info!("📝 Updating product {}", origin_product_no);
        let body = self
            .send_product(Method::PUT, &url, &token, &payload, credentials)
            .await?;

        Ok(RegistrationResult {
            product_id: origin_product_no,
            channel_product_no: body.smartstore_channel_product_no,
        })
    }

    /// 依序處理爬取來源中的每一筆；單筆失敗不影響其他筆
    pub async fn register_from_source<S, K>(&self, source: &S, store: &K) -> Result<Vec<BatchOutcome>>
    where
        S: ScrapeSource + ?Sized,
        K: CredentialStore,
    {
        let credentials = store.credentials().await?;
        let products = source.scraped_products().await?;
        tracing::info!("📂 {} scraped products to register", products.len());

        let mut outcomes = Vec::with_capacity(products.len());
        for product in &products {
            let result = self.register(product, &credentials).await;
            if let Err(e) = &result {
                tracing::error!("❌ '{}' failed: {} ({:?})", product.title, e, e.category());
            }
            outcomes.push(BatchOutcome {
                title: product.title.clone(),
                result,
            });
        }
        Ok(outcomes)
    }

    /// 驗證輸入、取得權杖並（視設定）上傳圖片，回傳可直接送出的本體
    async fn prepare(
        &self,
        scraped: &ScrapedProduct,
        credentials: &Credentials,
    ) -> Result<(Token, ProductPayload)> {
        let mut payload = self.transformer.format(scraped)?;
        let token = self.signer.get_valid_token(&self.cache, credentials).await?;

        if self.upload_images {
            let originals = payload.image_urls();
            let hosted = match self.uploader.upload_all(&token, &originals).await {
                Ok(hosted) => hosted,
                Err(e @ SmartstoreError::AuthError { .. }) => {
                    // 平台已拒絕此權杖，下次需重新交換
                    self.cache.invalidate(&credentials.client_id).await;
                    return Err(e);
                }
                Err(e) => return Err(e),
            };
            payload.replace_images(&hosted)?;
        }

        Ok((token, payload))
    }

    async fn send_product(
        &self,
        method: Method,
        url: &str,
        token: &Token,
        payload: &ProductPayload,
        credentials: &Credentials,
    ) -> Result<ProductResponse> {
        let response = self
            .http
            .http()
            .request(method, url)
            .bearer_auth(&token.value)
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, message) = read_failure(response).await;
            if status == StatusCode::UNAUTHORIZED {
                self.cache.invalidate(&credentials.client_id).await;
                return Err(SmartstoreError::auth(message));
            }
            return Err(SmartstoreError::UpstreamError {
                status: status.as_u16(),
                message,
            });
        }

        // 修改 API 可能回傳空本體
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(ProductResponse::default());
        }
        Ok(serde_json::from_str(&text)?)
    }
}
