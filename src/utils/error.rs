use crate::domain::model::ProviderKind;
use thiserror::Error;

/// 單一供應商查詢失敗的原因
#[derive(Error, Debug)]
pub enum LookupErrorKind {
    #[error("invalid request URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),

    #[error("failed to read response body: {0}")]
    BodyRead(#[source] reqwest::Error),

    #[error("malformed response body (HTTP {status}): {source}")]
    Decode {
        status: reqwest::StatusCode,
        #[source]
        source: serde_json::Error,
    },
}

/// 供應商查詢錯誤，附帶是哪一個供應商產生的
#[derive(Error, Debug)]
#[error("{provider}: {kind}")]
pub struct LookupError {
    pub provider: ProviderKind,
    #[source]
    pub kind: LookupErrorKind,
}

impl LookupError {
    pub fn new(provider: ProviderKind, kind: LookupErrorKind) -> Self {
        Self { provider, kind }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, LookupErrorKind::Timeout)
    }
}

#[derive(Error, Debug)]
pub enum CepError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("Configuration parse error: {message}")]
    ConfigParseError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl CepError {
    pub fn user_friendly_message(&self) -> String {
        match self {
            CepError::IoError(e) => format!("無法讀取設定檔: {}", e),
            CepError::HttpClientError(e) => format!("無法建立 HTTP 客戶端: {}", e),
            CepError::ConfigParseError { message } => format!("設定檔格式錯誤: {}", message),
            CepError::InvalidConfigValueError { field, reason, .. } => {
                format!("設定值 '{}' 無效: {}", field, reason)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, CepError>;
