use crate::core::transformer::ProductDefaults;
use crate::core::{ConfigProvider, CredentialStore, Credentials};
use crate::utils::error::{Result, SmartstoreError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "https://api.commerce.naver.com/external";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub platform: PlatformConfig,
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub images: ImagesConfig,
    #[serde(default)]
    pub defaults: ProductDefaults,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    #[serde(alias = "api_key")]
    pub client_id: String,
    #[serde(alias = "secret_key")]
    pub client_secret: String,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    #[serde(default = "default_true")]
    pub upload: bool,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            upload: true,
            concurrency: default_concurrency(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub json: Option<bool>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    4
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SmartstoreError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SmartstoreError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${NAVER_CLIENT_SECRET})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| {
            SmartstoreError::ConfigValidationError {
                field: "env_substitution".to_string(),
                message: e.to_string(),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("platform.base_url", &self.platform.base_url)?;
        validation::validate_range("platform.timeout_seconds", self.platform.timeout_seconds, 1, 300)?;
        validation::validate_non_empty_string("credentials.client_id", &self.credentials.client_id)?;
        validation::validate_non_empty_string(
            "credentials.client_secret",
            &self.credentials.client_secret,
        )?;
        validation::validate_positive_number("images.concurrency", self.images.concurrency, 1)?;
        validation::validate_non_empty_string("defaults.category_id", &self.defaults.category_id)?;
        Ok(())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            self.credentials.client_id.clone(),
            self.credentials.client_secret.clone(),
        )
    }

    pub fn json_logs(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|logging| logging.json)
            .unwrap_or(false)
    }
}

impl ConfigProvider for AppConfig {
    fn base_url(&self) -> &str {
        &self.platform.base_url
    }

    fn timeout_seconds(&self) -> u64 {
        self.platform.timeout_seconds
    }

    fn upload_images(&self) -> bool {
        self.images.upload
    }

    fn upload_concurrency(&self) -> usize {
        self.images.concurrency
    }
}

impl CredentialStore for AppConfig {
    async fn credentials(&self) -> Result<Credentials> {
        Ok(AppConfig::credentials(self))
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
