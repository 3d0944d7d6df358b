// Adapters layer: HTTP clients for the two address-lookup services.

pub mod brasil_api;
pub mod http;
pub mod via_cep;

pub use brasil_api::BrasilApiClient;
pub use via_cep::ViaCepClient;
