use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, SmartstoreError};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

pub const TOKEN_PATH: &str = "/v1/oauth2/token";
pub const PRODUCTS_PATH: &str = "/v2/products";
pub const ORIGIN_PRODUCTS_PATH: &str = "/v2/products/origin-products";
pub const IMAGE_UPLOAD_PATH: &str = "/v1/product-images/upload";

/// 指向平台 API 的 HTTP 用戶端，每個請求都有逾時上限
#[derive(Debug, Clone)]
pub struct PlatformClient {
    client: Client,
    base_url: String,
}

impl PlatformClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SmartstoreError::ConfigValidationError {
                field: "platform".to_string(),
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(
            config.base_url(),
            Duration::from_secs(config.timeout_seconds()),
        )
    }

    pub fn http(&self) -> &Client {
        &self.client
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// 平台錯誤回應，例如 `{"code": "...", "message": "...", "invalidInputs": [...]}`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub invalid_inputs: Vec<InvalidInput>,
}

#[derive(Debug, Deserialize)]
pub struct InvalidInput {
    pub name: Option<String>,
    pub r#type: Option<String>,
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// 組合成一行訊息，保留平台回報的欄位錯誤
    pub fn describe(&self, status: StatusCode) -> String {
        let mut message = self
            .message
            .clone()
            .or_else(|| self.code.clone())
            .unwrap_or_else(|| status.to_string());

        let fields: Vec<String> = self
            .invalid_inputs
            .iter()
            .map(|input| {
                format!(
                    "{}: {}",
                    input.name.as_deref().unwrap_or("?"),
                    input
                        .message
                        .as_deref()
                        .or(input.r#type.as_deref())
                        .unwrap_or("invalid")
                )
            })
            .collect();

        if !fields.is_empty() {
            message = format!("{} [{}]", message, fields.join("; "));
        }
        message
    }
}

/// 讀出失敗回應的狀態碼與訊息；本體不是 JSON 時退回原始文字
pub async fn read_failure(response: Response) -> (StatusCode, String) {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    let message = match serde_json::from_str::<ApiErrorBody>(&text) {
        Ok(body) => body.describe(status),
        Err(_) if text.trim().is_empty() => status.to_string(),
        Err(_) => text,
    };

    tracing::warn!("⚠️ Platform responded {}: {}", status, message);
    (status, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let client = PlatformClient::new("https://api.example.com/external/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.endpoint(TOKEN_PATH),
            "https://api.example.com/external/v1/oauth2/token"
        );
    }

    #[test]
    fn test_error_body_lists_invalid_inputs() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{
                "code": "BadRequest",
                "message": "요청 값이 올바르지 않습니다",
                "invalidInputs": [
                    {"name": "originProduct.salePrice", "type": "Min", "message": "must be >= 10"},
                    {"name": "originProduct.name", "type": "NotBlank"}
                ]
            }"#,
        )
        .unwrap();

        let described = body.describe(StatusCode::BAD_REQUEST);
        assert!(described.starts_with("요청 값이 올바르지 않습니다"));
        assert!(described.contains("originProduct.salePrice: must be >= 10"));
        assert!(described.contains("originProduct.name: NotBlank"));
    }

    #[test]
    fn test_error_body_falls_back_to_status() {
        let body = ApiErrorBody::default();
        assert_eq!(body.describe(StatusCode::BAD_GATEWAY), "502 Bad Gateway");
    }
}
