use crate::domain::model::{Deadline, LookupResult, ProviderKind};
use crate::utils::error::LookupError;
use async_trait::async_trait;

/// 地址查詢供應商；每次呼叫只發出一次網路請求，不重試
#[async_trait]
pub trait AddressProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    async fn lookup(
        &self,
        deadline: Deadline,
        postal_code: &str,
    ) -> std::result::Result<LookupResult, LookupError>;
}
