//! 權杖交換：以 bcrypt 簽署 `client_id` 與時間戳，換取 client credentials 存取權杖。
//!
//! 平台發給商家的 client secret 本身就是一個 bcrypt salt（`$2a$04$` 加上 22 個字元），
//! 簽章是 `bcrypt("{client_id}_{timestamp}", salt = client_secret)` 的完整輸出再做 base64。

use crate::core::http::{read_failure, PlatformClient, TOKEN_PATH};
use crate::core::token_cache::TokenCache;
use crate::domain::model::{Credentials, Token};
use crate::utils::error::{Result, SmartstoreError};
use base64::alphabet;
use base64::engine::general_purpose::STANDARD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use bcrypt::Version;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;

const SALT_CHARS: usize = 22;

const BCRYPT_SALT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::BCRYPT,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// 拆解 `$2a$04$<22 chars>` 形式的 client secret
fn parse_secret_salt(client_secret: &str) -> Result<(Version, u32, [u8; 16])> {
    let invalid = |reason: &str| {
        SmartstoreError::auth(format!("Client secret is not a bcrypt salt: {}", reason))
    };

    let mut parts = client_secret.splitn(4, '$');
    if parts.next() != Some("") {
        return Err(invalid("missing '$' prefix"));
    }

    let version = match parts.next() {
        Some("2a") => Version::TwoA,
        Some("2b") => Version::TwoB,
        Some("2x") => Version::TwoX,
        Some("2y") => Version::TwoY,
        _ => return Err(invalid("unknown version")),
    };

    let cost: u32 = parts
        .next()
        .and_then(|cost| cost.parse().ok())
        .ok_or_else(|| invalid("cost is not a number"))?;

    let encoded = parts.next().unwrap_or_default();
    let encoded = encoded
        .get(..SALT_CHARS)
        .ok_or_else(|| invalid("salt is shorter than 22 characters"))?;

    let salt: [u8; 16] = BCRYPT_SALT
        .decode(encoded)
        .map_err(|e| invalid(&e.to_string()))?
        .try_into()
        .map_err(|_| invalid("salt does not decode to 16 bytes"))?;

    Ok((version, cost, salt))
}

/// 產生 `client_secret_sign`
pub fn sign(client_id: &str, client_secret: &str, timestamp_millis: i64) -> Result<String> {
    let (version, cost, salt) = parse_secret_salt(client_secret)?;
    let message = format!("{}_{}", client_id, timestamp_millis);

    let hashed = bcrypt::hash_with_salt(message.as_bytes(), cost, salt)
        .map_err(|e| SmartstoreError::auth(format!("Failed to sign request: {}", e)))?
        .format_for_version(version);

    Ok(STANDARD.encode(hashed))
}

#[derive(Debug, Clone)]
pub struct Signer {
    http: PlatformClient,
}

impl Signer {
    pub fn new(http: PlatformClient) -> Self {
        Self { http }
    }

    /// 向權杖端點交換一次新的存取權杖，不經過快取
    pub async fn exchange(&self, credentials: &Credentials) -> Result<Token> {
        let issued_at = Utc::now();
        let timestamp = issued_at.timestamp_millis().to_string();
        let signature = sign(
            &credentials.client_id,
            &credentials.client_secret,
            issued_at.timestamp_millis(),
        )?;

        let form = [
            ("client_id", credentials.client_id.as_str()),
            ("timestamp", timestamp.as_str()),
            ("client_secret_sign", signature.as_str()),
            ("grant_type", "client_credentials"),
            ("type", "SELF"),
        ];

        tracing::info!("🔐 Requesting access token for client {}", credentials.client_id);
        let response = self
            .http
            .http()
            .post(self.http.endpoint(TOKEN_PATH))
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, message) = read_failure(response).await;
            return Err(SmartstoreError::auth(format!("{} ({})", message, status)));
        }

        let text = response.text().await?;
        let body: TokenResponse = serde_json::from_str(&text)
            .map_err(|e| SmartstoreError::auth(format!("Malformed token response: {}", e)))?;

        let token = Token {
            value: body.access_token,
            expires_at: expiry(issued_at, body.expires_in),
        };
        tracing::info!("✅ Access token issued, valid until {}", token.expires_at);
        Ok(token)
    }

    /// 快取中的權杖仍有效就直接使用，否則交換一次並更新快取
    pub async fn get_valid_token(
        &self,
        cache: &TokenCache,
        credentials: &Credentials,
    ) -> Result<Token> {
        cache
            .get_or_refresh(&credentials.client_id, || self.exchange(credentials))
            .await
    }

    /// 憑證是否能換到權杖。平台拒絕回傳 `Ok(false)`，網路問題仍回傳錯誤。
    pub async fn validate_credentials(&self, credentials: &Credentials) -> Result<bool> {
        match self.exchange(credentials).await {
            Ok(_) => Ok(true),
            Err(SmartstoreError::AuthError { message }) => {
                tracing::warn!("❌ Credential validation failed: {}", message);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

fn expiry(issued_at: DateTime<Utc>, expires_in_seconds: i64) -> DateTime<Utc> {
    TimeDelta::try_seconds(expires_in_seconds.max(0))
        .and_then(|ttl| issued_at.checked_add_signed(ttl))
        .unwrap_or(issued_at)
}
