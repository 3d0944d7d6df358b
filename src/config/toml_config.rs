use crate::utils::error::{CepError, Result};
use crate::utils::validation::{validate_range, validate_url_template, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BRASIL_API_URL: &str = "https://brasilapi.com.br/api/cep/v1/{cep}";
pub const DEFAULT_VIA_CEP_URL: &str = "http://viacep.com.br/ws/{cep}/json/";
pub const DEFAULT_TIMEOUT_MS: u64 = 1_000;
pub const DEFAULT_CANCEL_GRACE_MS: u64 = 250;
pub const DEFAULT_USER_AGENT: &str = concat!("cep-race/", env!("CARGO_PKG_VERSION"));

/// 查詢設定：預設值 < TOML 檔 < CLI 參數
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub lookup: RaceSettings,
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceSettings {
    pub timeout_ms: u64,
    pub cancel_grace_ms: u64,
    pub reject_non_success_status: bool,
    pub user_agent: String,
}

impl Default for RaceSettings {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            cancel_grace_ms: DEFAULT_CANCEL_GRACE_MS,
            reject_non_success_status: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub brasil_api: EndpointConfig,
    pub via_cep: EndpointConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            brasil_api: EndpointConfig::new(DEFAULT_BRASIL_API_URL),
            via_cep: EndpointConfig::new(DEFAULT_VIA_CEP_URL),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub url_template: String,
}

impl EndpointConfig {
    pub fn new(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
        }
    }
}

impl LookupConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CepError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CepError::ConfigParseError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${VIA_CEP_URL})，未設定的變數保留原字串
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CepError::ConfigParseError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.lookup.timeout_ms)
    }

    pub fn cancel_grace(&self) -> Duration {
        Duration::from_millis(self.lookup.cancel_grace_ms)
    }
}

impl Validate for LookupConfig {
    fn validate(&self) -> Result<()> {
        validate_range("lookup.timeout_ms", self.lookup.timeout_ms, 1, 60_000)?;
        validate_range("lookup.cancel_grace_ms", self.lookup.cancel_grace_ms, 0, 10_000)?;
        validate_url_template(
            "providers.brasil_api.url_template",
            &self.providers.brasil_api.url_template,
        )?;
        validate_url_template(
            "providers.via_cep.url_template",
            &self.providers.via_cep.url_template,
        )?;
        Ok(())
    }
}
