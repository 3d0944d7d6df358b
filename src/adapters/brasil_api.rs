use crate::adapters::http::JsonLookup;
use crate::config::toml_config::{EndpointConfig, RaceSettings};
use crate::domain::model::{BrasilApiAddress, Deadline, LookupResult, ProviderKind};
use crate::domain::ports::AddressProvider;
use crate::utils::error::{LookupError, Result};
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct BrasilApiClient {
    http: JsonLookup,
}

impl BrasilApiClient {
    pub fn new(endpoint: &EndpointConfig, settings: &RaceSettings) -> Result<Self> {
        Ok(Self {
            http: JsonLookup::new(ProviderKind::BrasilApi, &endpoint.url_template, settings)?,
        })
    }
}

#[async_trait]
impl AddressProvider for BrasilApiClient {
    fn kind(&self) -> ProviderKind {
        self.http.provider()
    }

    async fn lookup(
        &self,
        deadline: Deadline,
        postal_code: &str,
    ) -> std::result::Result<LookupResult, LookupError> {
        let address: BrasilApiAddress = self.http.fetch(deadline, postal_code).await?;
        Ok(address.into())
    }
}
