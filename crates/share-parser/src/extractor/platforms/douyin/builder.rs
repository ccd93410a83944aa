use async_trait::async_trait;
use tracing::debug;
use url::Url;

use super::cdn::is_allowed_cdn_url;
use super::page;
use crate::error::ParseError;
use crate::extractor::default::HttpClients;
use crate::extractor::platform_extractor::{Extractor, PlatformResolver, last_path_segment};
use crate::extractor::platforms::xigua::Xigua;
use crate::extractor::retry::RetryGuard;
use crate::media::VideoInfo;

/// Where a Douyin share link ends up once unwrapped.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ShareTarget {
    Douyin(String),
    Xigua(String),
}

pub struct Douyin {
    pub extractor: Extractor,
    xigua: Xigua,
    guard: RetryGuard,
    page_base: String,
    short_link_host: String,
}

impl Douyin {
    const BASE_URL: &str = "https://www.iesdouyin.com";
    const SHORT_LINK_HOST: &str = "v.douyin.com";

    pub fn new(clients: &HttpClients, guard: RetryGuard) -> Self {
        let extractor = Extractor::new("Douyin", clients);

        Self {
            extractor,
            xigua: Xigua::new(clients),
            guard,
            page_base: Self::BASE_URL.to_owned(),
            short_link_host: Self::SHORT_LINK_HOST.to_owned(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_page_base(mut self, base: impl Into<String>) -> Self {
        self.page_base = base.into();
        self
    }

    #[cfg(test)]
    pub(crate) fn with_short_link_host(mut self, host: impl Into<String>) -> Self {
        self.short_link_host = host.into();
        self
    }

    #[cfg(test)]
    pub(crate) fn with_xigua(mut self, xigua: Xigua) -> Self {
        self.xigua = xigua;
        self
    }

    fn share_page_url(&self, id: &str) -> String {
        format!("{}/share/video/{id}", self.page_base)
    }

    /// Maps a short-link redirect target to the post it names. Short links
    /// for Xigua posts land on `ixigua.com`.
    fn target_from_location(location: &str) -> Result<ShareTarget, ParseError> {
        let url = Url::parse(location).map_err(|_| ParseError::InvalidUrl(location.to_owned()))?;
        let id = last_path_segment(url.path())
            .map(str::to_owned)
            .ok_or_else(|| ParseError::InvalidUrl(location.to_owned()))?;

        if url.host_str().is_some_and(|host| host.contains("ixigua.com")) {
            Ok(ShareTarget::Xigua(id))
        } else {
            Ok(ShareTarget::Douyin(id))
        }
    }

    /// Web links carry the id in their path; `douyin.com` feed links carry
    /// it in `modal_id` instead.
    fn id_from_web_url(url: &Url) -> Result<String, ParseError> {
        if let Some((_, modal_id)) = url.query_pairs().find(|(k, _)| k == "modal_id") {
            return Ok(modal_id.into_owned());
        }

        last_path_segment(url.path())
            .map(str::to_owned)
            .ok_or_else(|| ParseError::InvalidUrl(url.to_string()))
    }

    async fn share_target(&self, url: &Url) -> Result<ShareTarget, ParseError> {
        let host = url.host_str().unwrap_or_default();
        if host == self.short_link_host {
            let location = self.extractor.follow_one_redirect(url.as_str()).await?;
            debug!(from = %url, to = %location, "Unwrapped douyin short link");
            return Self::target_from_location(&location);
        }

        match host {
            "www.douyin.com" | "douyin.com" | "www.iesdouyin.com" | "iesdouyin.com" => {
                Self::id_from_web_url(url).map(ShareTarget::Douyin)
            }
            host => Err(ParseError::UnsupportedProvider(host.to_owned())),
        }
    }

    /// One pass over the share page plus the play-address redirect hop.
    async fn resolve_once(&self, id: &str, attempt: u32) -> Result<VideoInfo, ParseError> {
        let html = self.extractor.get_bytes(&self.share_page_url(id)).await?;
        let data = page::router_data(&html)?;
        let item = page::locate_item(&data, id)?;

        let mut info = page::video_info_from_item(item, true);

        if !info.video_url.is_empty() {
            match self.extractor.follow_one_redirect(&info.video_url).await {
                Ok(location) => info.video_url = location,
                Err(e) => {
                    // keep the play address; the host check decides what happens next
                    debug!(id, attempt, error = %e, "Play address did not redirect");
                }
            }
        }

        Ok(info)
    }
}

#[async_trait]
impl PlatformResolver for Douyin {
    async fn resolve_share_url(&self, url: &str) -> Result<VideoInfo, ParseError> {
        let url = Url::parse(url).map_err(|_| ParseError::InvalidUrl(url.to_owned()))?;

        match self.share_target(&url).await? {
            ShareTarget::Douyin(id) => self.resolve_id(&id).await,
            ShareTarget::Xigua(id) => {
                debug!(id, "Douyin short link points at xigua");
                self.xigua.resolve_id(&id).await
            }
        }
    }

    async fn resolve_id(&self, id: &str) -> Result<VideoInfo, ParseError> {
        if !page::is_valid_item_id(id) {
            return Err(ParseError::InvalidId(id.to_owned()));
        }

        let info = self
            .guard
            .run(|attempt| self.resolve_once(id, attempt), is_allowed_cdn_url)
            .await?;

        debug!(id, gallery = info.is_gallery(), "Resolved douyin post");
        Ok(info)
    }
}
