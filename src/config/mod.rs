pub mod toml_config;

pub use toml_config::LookupConfig;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_non_empty_string, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "cep-race")]
#[command(about = "Query BrasilAPI and ViaCEP concurrently and print the first answer")]
pub struct CliConfig {
    /// Postal code (CEP) to look up
    #[arg(default_value = "03373100")]
    pub cep: String,

    #[arg(long, help = "Path to a TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "Overall deadline in milliseconds")]
    pub timeout_ms: Option<u64>,

    #[arg(long, help = "Treat non-2xx responses as errors")]
    pub strict_status: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 合併設定檔與 CLI 參數
    pub fn resolve(&self) -> Result<LookupConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path);
                LookupConfig::from_file(path)?
            }
            None => LookupConfig::default(),
        };

        if let Some(timeout_ms) = self.timeout_ms {
            config.lookup.timeout_ms = timeout_ms;
        }
        if self.strict_status {
            config.lookup.reject_non_success_status = true;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("cep", &self.cep)
    }
}
