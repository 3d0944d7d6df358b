pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{BrasilApiClient, ViaCepClient};
pub use config::LookupConfig;
pub use crate::core::race::{RaceOrchestrator, RaceOutcome};
pub use domain::model::{Deadline, LookupResult, ProviderKind};
pub use domain::ports::AddressProvider;
pub use utils::error::{CepError, LookupError, LookupErrorKind, Result};
