pub mod embedded;
pub mod factory;
pub mod json_path;
pub mod platform_extractor;
pub mod platforms;
pub mod redirect;
pub mod retry;
mod default;

pub use default::{
    DEFAULT_UA, HttpClients, MOBILE_SAFARI_UA, ParserConfig, default_factory,
    install_crypto_provider,
};
pub use factory::{Platform, ResolverFactory};
