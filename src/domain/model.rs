use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    BrasilApi,
    ViaCep,
}

impl ProviderKind {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::BrasilApi => "BrasilAPI",
            ProviderKind::ViaCep => "ViaCEP",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// BrasilAPI `/api/cep/v1/{cep}` 的回應
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrasilApiAddress {
    pub cep: String,
    pub state: String,
    pub city: String,
    pub neighborhood: String,
    pub street: String,
    pub service: String,
}

/// ViaCEP `/ws/{cep}/json/` 的回應
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViaCepAddress {
    pub cep: String,
    pub logradouro: String,
    pub complemento: String,
    pub unidade: String,
    pub bairro: String,
    pub localidade: String,
    pub uf: String,
    pub ibge: String,
    pub gia: String,
    pub ddd: String,
    pub siafi: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupResult {
    BrasilApi(BrasilApiAddress),
    ViaCep(ViaCepAddress),
}

impl LookupResult {
    pub fn provider(&self) -> ProviderKind {
        match self {
            LookupResult::BrasilApi(_) => ProviderKind::BrasilApi,
            LookupResult::ViaCep(_) => ProviderKind::ViaCep,
        }
    }

    pub fn cep(&self) -> &str {
        match self {
            LookupResult::BrasilApi(address) => &address.cep,
            LookupResult::ViaCep(address) => &address.cep,
        }
    }
}

impl From<BrasilApiAddress> for LookupResult {
    fn from(address: BrasilApiAddress) -> Self {
        LookupResult::BrasilApi(address)
    }
}

impl From<ViaCepAddress> for LookupResult {
    fn from(address: ViaCepAddress) -> Self {
        LookupResult::ViaCep(address)
    }
}

impl fmt::Display for LookupResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupResult::BrasilApi(a) => write!(
                f,
                "-=- BRASIL API -=- \nCEP: {}\nEstado: {}\nCidade: {}\nBairro: {}\nRua: {}\nServiço: {}\n",
                a.cep, a.state, a.city, a.neighborhood, a.street, a.service
            ),
            LookupResult::ViaCep(a) => write!(
                f,
                "-=- VIA CEP -=- \nCEP: {}\nLogradouro: {}\nComplemento: {}\nUnidade: {}\nBairro: {}\nLocalidade: {}\nUF: {}\nIBGE: {}\nGIA: {}\nDDD: {}\nSIAFI: {}\n",
                a.cep,
                a.logradouro,
                a.complemento,
                a.unidade,
                a.bairro,
                a.localidade,
                a.uf,
                a.ibge,
                a.gia,
                a.ddd,
                a.siafi
            ),
        }
    }
}

/// `Instant` 加法溢位時的上限，約 30 年
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// 一次查詢共用的截止時間，兩個供應商唯讀共享
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    pub fn after(duration: Duration) -> Self {
        let now = Instant::now();
        let at = now
            .checked_add(duration)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now);
        Self { at }
    }

    pub fn instant(&self) -> Instant {
        self.at
    }

    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn has_expired(&self) -> bool {
        Instant::now() >= self.at
    }
}
