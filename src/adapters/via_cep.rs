use crate::adapters::http::JsonLookup;
use crate::config::toml_config::{EndpointConfig, RaceSettings};
use crate::domain::model::{Deadline, LookupResult, ProviderKind, ViaCepAddress};
use crate::domain::ports::AddressProvider;
use crate::utils::error::{LookupError, Result};
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct ViaCepClient {
    http: JsonLookup,
}

impl ViaCepClient {
    pub fn new(endpoint: &EndpointConfig, settings: &RaceSettings) -> Result<Self> {
        Ok(Self {
            http: JsonLookup::new(ProviderKind::ViaCep, &endpoint.url_template, settings)?,
        })
    }
}

#[async_trait]
impl AddressProvider for ViaCepClient {
    fn kind(&self) -> ProviderKind {
        self.http.provider()
    }

    async fn lookup(
        &self,
        deadline: Deadline,
        postal_code: &str,
    ) -> std::result::Result<LookupResult, LookupError> {
        let address: ViaCepAddress = self.http.fetch(deadline, postal_code).await?;
        Ok(address.into())
    }
}
