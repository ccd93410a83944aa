use std::sync::Once;
use std::time::Duration;

use reqwest::{Client, ClientBuilder};

use super::factory::ResolverFactory;
use super::retry::RetryPolicy;
use crate::error::ParseError;

pub const DEFAULT_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 16_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Mobile/15E148 Safari/604.1 Edg/122.0.0.0";

/// Identity presented to media CDNs by the relay.
pub const MOBILE_SAFARI_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 13_2_3 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/13.0.3 Mobile/15E148 Safari/604.1";

/// Settings shared by every platform resolver.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Overall timeout of one outbound request.
    pub timeout: Duration,
    pub user_agent: String,
    /// Policy of the Douyin CDN host check.
    pub retry: RetryPolicy,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_UA.to_owned(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Installs the process-wide rustls crypto provider exactly once.
///
/// reqwest is built without a bundled provider, so this must run before the
/// first client is constructed.
pub fn install_crypto_provider() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        // Err means another component already installed one; that is fine.
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    });
}

fn create_client_builder(config: &ParserConfig) -> ClientBuilder {
    install_crypto_provider();

    Client::builder()
        .user_agent(&config.user_agent)
        .timeout(config.timeout)
        .pool_max_idle_per_host(5)
}

/// The pair of clients every resolver works with: one that follows
/// redirects for page and API fetches, one that never does so a 3xx
/// response can be inspected.
#[derive(Debug, Clone)]
pub struct HttpClients {
    pub client: Client,
    pub no_redirect: Client,
    /// Identity resolvers present unless a platform needs its own.
    pub user_agent: String,
}

impl HttpClients {
    pub fn new(config: &ParserConfig) -> Result<Self, ParseError> {
        let client = create_client_builder(config).build()?;
        let no_redirect = create_client_builder(config)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            no_redirect,
            user_agent: config.user_agent.clone(),
        })
    }
}

/// Returns a new `ResolverFactory` populated with all the supported platforms.
pub fn default_factory() -> Result<ResolverFactory, ParseError> {
    ResolverFactory::new(ParserConfig::default())
}
