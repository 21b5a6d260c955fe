use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmartstoreError {
    #[error("Authentication failed: {message}")]
    AuthError { message: String },

    #[error("Validation error on '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error("Image upload failed (#{index} {url}): {message}")]
    UploadError {
        index: usize,
        url: String,
        message: String,
    },

    #[error("Network error: {message}")]
    NetworkError { message: String, timed_out: bool },

    #[error("Platform rejected request (HTTP {status}): {message}")]
    UpstreamError { status: u16, message: String },

    #[error("Configuration error on '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// 傳輸層錯誤一律視為可重試的網路錯誤
impl From<reqwest::Error> for SmartstoreError {
    fn from(err: reqwest::Error) -> Self {
        SmartstoreError::NetworkError {
            timed_out: err.is_timeout(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    Input,
    Upload,
    Transport,
    Platform,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SmartstoreError {
    pub fn auth(message: impl Into<String>) -> Self {
        SmartstoreError::AuthError {
            message: message.into(),
        }
    }

    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        SmartstoreError::ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// 只有網路錯誤可以安全地由呼叫端重試
    pub fn is_retryable(&self) -> bool {
        matches!(self, SmartstoreError::NetworkError { .. })
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SmartstoreError::AuthError { .. } => ErrorCategory::Authentication,
            SmartstoreError::ValidationError { .. } => ErrorCategory::Input,
            SmartstoreError::UploadError { .. } => ErrorCategory::Upload,
            SmartstoreError::NetworkError { .. } => ErrorCategory::Transport,
            SmartstoreError::UpstreamError { .. } => ErrorCategory::Platform,
            SmartstoreError::ConfigValidationError { .. }
            | SmartstoreError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            SmartstoreError::IoError(_) | SmartstoreError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Transport => ErrorSeverity::Medium,
            ErrorCategory::Authentication
            | ErrorCategory::Input
            | ErrorCategory::Upload
            | ErrorCategory::Platform
            | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SmartstoreError::AuthError { message } => {
                format!("Could not authenticate with the commerce platform: {}", message)
            }
            SmartstoreError::ValidationError { field, message } => {
                format!("Scraped product is incomplete ({}): {}", field, message)
            }
            SmartstoreError::UploadError { index, url, .. } => {
                format!("Image #{} could not be uploaded: {}", index + 1, url)
            }
            SmartstoreError::NetworkError { timed_out: true, .. } => {
                "The platform did not answer in time".to_string()
            }
            SmartstoreError::NetworkError { .. } => "Could not reach the platform".to_string(),
            SmartstoreError::UpstreamError { status, message } => {
                format!("The platform refused the product ({}): {}", status, message)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Authentication => {
                "Check the client id and client secret issued by the commerce platform"
            }
            ErrorCategory::Input => "Re-scrape the product page and make sure title, price and images are present",
            ErrorCategory::Upload => "Verify the image URLs are reachable and retry the registration",
            ErrorCategory::Transport => "Retry later; the request is safe to repeat",
            ErrorCategory::Platform => "Review the rejected fields in the message and adjust the defaults",
            ErrorCategory::Configuration => "Fix the configuration file and run again",
            ErrorCategory::System => "Check file permissions and input file format",
        }
    }
}

pub type Result<T> = std::result::Result<T, SmartstoreError>;
