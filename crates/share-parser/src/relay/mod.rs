//! Streaming relay for resolved media URLs.
//!
//! Some clients cannot fetch platform CDNs directly (hotlink checks, missing
//! CORS headers, in-app browser restrictions). [`StreamRelay::relay`] fetches
//! the media on their behalf and returns status, headers and a byte stream
//! ready to be written back to the client.

mod body;
mod headers;

pub use body::RelayBody;
pub use headers::{ClientEnvironment, relay_response_headers, upstream_request_headers};

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::ParseError;
use crate::extractor::{MOBILE_SAFARI_UA, install_crypto_provider};

#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Bounds connecting and every read of the upstream body. The body as a
    /// whole is not capped so long videos are not cut off.
    pub timeout: Duration,
    /// Media CDNs often rotate certificates faster than trust stores update.
    pub accept_invalid_certs: bool,
    /// Upstream identity when the client's own is not forwarded.
    pub user_agent: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            accept_invalid_certs: true,
            user_agent: MOBILE_SAFARI_UA.to_owned(),
        }
    }
}

/// A successful upstream response, headers already filtered for the client.
#[derive(Debug)]
pub struct RelayResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub environment: ClientEnvironment,
    pub body: RelayBody,
}

#[derive(Debug, Clone)]
pub struct StreamRelay {
    client: Client,
    config: RelayConfig,
}

impl StreamRelay {
    pub fn new(config: RelayConfig) -> Result<Self, ParseError> {
        install_crypto_provider();

        // no decompression: bytes and Content-Encoding pass through untouched
        let client = Client::builder()
            .connect_timeout(config.timeout)
            .read_timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .no_gzip()
            .no_deflate()
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .tcp_nodelay(true)
            .build()?;

        Ok(Self { client, config })
    }

    /// Fetches `media_url` for a client whose request carried `inbound`.
    ///
    /// Upstream statuses >= 400 fail with [`ParseError::UpstreamStatus`] and
    /// the upstream body is discarded unread.
    pub async fn relay(
        &self,
        media_url: &str,
        inbound: &HeaderMap,
    ) -> Result<RelayResponse, ParseError> {
        let target = Url::parse(media_url).map_err(|_| ParseError::InvalidUrl(media_url.to_owned()))?;
        if !matches!(target.scheme(), "http" | "https") {
            return Err(ParseError::InvalidUrl(media_url.to_owned()));
        }

        let environment = ClientEnvironment::from_headers(inbound);
        let request_headers =
            headers::upstream_request_headers(environment, inbound, &self.config.user_agent);
        debug!(url = media_url, ?environment, "Relaying media");

        let upstream = self
            .client
            .get(target)
            .headers(request_headers)
            .send()
            .await
            .inspect_err(|e| warn!(url = media_url, error = %e, "Relay upstream request failed"))?;

        let status = upstream.status();
        if status.as_u16() >= 400 {
            warn!(url = media_url, status = status.as_u16(), "Relay upstream rejected request");
            return Err(ParseError::UpstreamStatus(status));
        }

        let headers = headers::relay_response_headers(environment, upstream.headers());
        info!(
            url = media_url,
            status = status.as_u16(),
            content_length = ?upstream.content_length(),
            constrained = environment.is_constrained(),
            "Relay started"
        );

        Ok(RelayResponse {
            status,
            headers,
            environment,
            body: RelayBody::new(upstream.bytes_stream(), media_url),
        })
    }
}
