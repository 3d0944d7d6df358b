use crate::config::toml_config::RaceSettings;
use crate::domain::model::{Deadline, ProviderKind};
use crate::utils::error::{LookupError, LookupErrorKind, Result};
use crate::utils::validation::CEP_PLACEHOLDER;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

/// 兩個供應商共用的 JSON GET 請求
#[derive(Debug, Clone)]
pub struct JsonLookup {
    client: Client,
    provider: ProviderKind,
    url_template: String,
    reject_non_success_status: bool,
}

impl JsonLookup {
    pub fn new(
        provider: ProviderKind,
        url_template: &str,
        settings: &RaceSettings,
    ) -> Result<Self> {
        let client = Client::builder().user_agent(&settings.user_agent).build()?;

        Ok(Self {
            client,
            provider,
            url_template: url_template.to_string(),
            reject_non_success_status: settings.reject_non_success_status,
        })
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub fn request_url(&self, postal_code: &str) -> std::result::Result<Url, LookupError> {
        let url = self.url_template.replace(CEP_PLACEHOLDER, postal_code);
        Url::parse(&url).map_err(|source| self.error(LookupErrorKind::InvalidUrl { url, source }))
    }

    /// 發出一次 GET，連線與讀取都受截止時間限制；不檢查狀態碼時一律嘗試解析
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        deadline: Deadline,
        postal_code: &str,
    ) -> std::result::Result<T, LookupError> {
        let url = self.request_url(postal_code)?;

        if deadline.has_expired() {
            return Err(self.error(LookupErrorKind::Timeout));
        }

        tracing::debug!("📡 {}: GET {}", self.provider, url);
        let response = self
            .client
            .get(url)
            .timeout(deadline.remaining())
            .send()
            .await
            .map_err(|e| self.transport_error(e, LookupErrorKind::Transport))?;

        let status = response.status();
        tracing::debug!("📡 {}: response status {}", self.provider, status);

        if !status.is_success() {
            if self.reject_non_success_status {
                return Err(self.error(LookupErrorKind::Status(status)));
            }
            tracing::warn!(
                "⚠️ {}: non-success status {}, decoding anyway",
                self.provider,
                status
            );
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e, LookupErrorKind::BodyRead))?;

        serde_json::from_slice(&body)
            .map_err(|source| self.error(LookupErrorKind::Decode { status, source }))
    }

    fn error(&self, kind: LookupErrorKind) -> LookupError {
        LookupError::new(self.provider, kind)
    }

    fn transport_error(
        &self,
        error: reqwest::Error,
        otherwise: fn(reqwest::Error) -> LookupErrorKind,
    ) -> LookupError {
        if error.is_timeout() {
            self.error(LookupErrorKind::Timeout)
        } else {
            self.error(otherwise(error))
        }
    }
}
