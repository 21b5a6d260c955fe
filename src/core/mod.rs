pub mod http;
pub mod image_upload;
pub mod registrar;
pub mod signer;
pub mod token_cache;
pub mod transformer;

pub use crate::domain::model::{Credentials, RegistrationResult, ScrapedOption, ScrapedProduct, Token};
pub use crate::domain::payload::ProductPayload;
pub use crate::domain::ports::{ConfigProvider, CredentialStore, ScrapeSource};
pub use crate::utils::error::Result;
