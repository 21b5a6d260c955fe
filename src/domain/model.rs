use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 平台發給商家的應用程式憑證。
///
/// 擴充功能端以 `apiKey` / `secretKey` 儲存，伺服器端以 `clientId` /
/// `clientSecret` 儲存，兩種命名都可以反序列化。
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(alias = "apiKey", alias = "client_id")]
    pub client_id: String,
    #[serde(alias = "secretKey", alias = "client_secret")]
    pub client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl Token {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("value", &"***")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// 商品頁面爬取結果，由外部爬蟲產生，這裡只讀不寫
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedProduct {
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "price")]
    pub price_text: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub options: Vec<ScrapedOption>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedOption {
    pub name: String,
    #[serde(default, alias = "stock")]
    pub stock_hint: Option<u32>,
}

impl ScrapedOption {
    /// 解析爬到的選項文字，例如 `"Red(3)"` -> name `Red`、stock_hint `3`。
    /// 停售（`판매종료`）的選項回傳 `None`。
    pub fn from_label(raw: &str) -> Option<Self> {
        if raw.contains(crate::core::transformer::SOLD_OUT_MARKER) {
            return None;
        }

        let name = crate::core::transformer::extract_option_label(raw);
        let stock_hint = raw
            .rsplit_once('(')
            .and_then(|(_, rest)| rest.split(')').next())
            .map(|inside| inside.chars().filter(char::is_ascii_digit).collect::<String>())
            .and_then(|digits| digits.parse().ok());

        Some(Self { name, stock_hint })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResult {
    pub product_id: u64,
    pub channel_product_no: Option<u64>,
}
