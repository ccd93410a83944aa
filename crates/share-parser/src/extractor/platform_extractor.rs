use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::debug;

use super::default::{DEFAULT_UA, HttpClients};
use super::redirect::follow_one_redirect;
use crate::error::ParseError;
use crate::media::VideoInfo;

/// Per-platform HTTP identity: the shared clients plus the headers a
/// platform expects on every request.
#[derive(Debug, Clone)]
pub struct Extractor {
    // name of the platform, e.g., "Douyin", "Bilibili"...
    pub platform_name: &'static str,
    pub client: Client,
    // redirect-disabled twin of `client`, used to read `Location` headers
    pub no_redirect_client: Client,
    platform_headers: HeaderMap,
}

impl Extractor {
    pub fn new(platform_name: &'static str, clients: &HttpClients) -> Self {
        let user_agent = HeaderValue::from_str(&clients.user_agent).unwrap_or_else(|e| {
            debug!(error = %e, platform = platform_name, "Invalid user agent; using default");
            HeaderValue::from_static(DEFAULT_UA)
        });

        let mut default_headers = HeaderMap::new();
        default_headers.insert(reqwest::header::USER_AGENT, user_agent);

        Self {
            platform_name,
            client: clients.client.clone(),
            no_redirect_client: clients.no_redirect.clone(),
            platform_headers: default_headers,
        }
    }

    #[inline]
    pub fn set_referer_static(&mut self, referer: &'static str) {
        self.platform_headers
            .insert(reqwest::header::REFERER, HeaderValue::from_static(referer));
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url).headers(self.platform_headers.clone())
    }

    /// Fetches a page body as raw bytes.
    pub async fn get_bytes(&self, url: &str) -> Result<bytes::Bytes, ParseError> {
        let response = self.get(url).send().await?;
        debug!(platform = self.platform_name, url, status = %response.status(), "Fetched page");
        Ok(response.bytes().await?)
    }

    /// Fetches a JSON API. `referer` overrides the platform default when set.
    pub async fn get_json(&self, url: &str, referer: Option<&str>) -> Result<Value, ParseError> {
        let mut headers = self.platform_headers.clone();
        if let Some(referer) = referer {
            match HeaderValue::from_str(referer) {
                Ok(value) => {
                    headers.insert(reqwest::header::REFERER, value);
                }
                Err(e) => debug!(error = %e, referer, "Invalid referer; keeping default"),
            }
        }

        let body = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await?
            .bytes()
            .await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// One redirect hop with this platform's headers.
    pub async fn follow_one_redirect(&self, url: &str) -> Result<String, ParseError> {
        follow_one_redirect(&self.no_redirect_client, url, &self.platform_headers).await
    }
}

/// A platform that can turn share links or its own ids into a [`VideoInfo`].
#[async_trait]
pub trait PlatformResolver: Send + Sync {
    /// Resolves a share link whose host already routed to this platform.
    async fn resolve_share_url(&self, url: &str) -> Result<VideoInfo, ParseError>;

    /// Resolves a platform-native id.
    async fn resolve_id(&self, id: &str) -> Result<VideoInfo, ParseError>;
}

/// Last non-empty segment of a URL path, e.g. `/share/video/123/` → `123`.
pub(crate) fn last_path_segment(path: &str) -> Option<&str> {
    path.split('/').rev().find(|s| !s.is_empty())
}
