pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::cli::LocalScrapeSource;
pub use config::toml_config::AppConfig;
pub use core::{
    http::PlatformClient,
    registrar::Registrar,
    signer::{sign, Signer},
    token_cache::TokenCache,
    transformer::{format_product, parse_price, ProductDefaults, Transformer},
};
pub use domain::model::{Credentials, RegistrationResult, ScrapedOption, ScrapedProduct, Token};
pub use domain::payload::ProductPayload;
pub use utils::error::{Result, SmartstoreError};
