use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::ParseError;
use crate::extractor::default::HttpClients;
use crate::extractor::json_path::JsonPath;
use crate::extractor::platform_extractor::{Extractor, PlatformResolver};
use crate::media::VideoInfo;

/// Finds the BV id in a video page path: the first segment starting with
/// `BV`, or the segment following `video`.
pub fn extract_bvid(path: &str) -> Option<&str> {
    let parts: Vec<&str> = path.trim_matches('/').split('/').collect();

    for (i, part) in parts.iter().enumerate() {
        if part.starts_with("BV") {
            return Some(*part);
        }
        if *part == "video" {
            return parts.get(i + 1).copied().filter(|next| !next.is_empty());
        }
    }
    None
}

pub struct Bilibili {
    pub extractor: Extractor,
    api_base: String,
    short_link_host: String,
}

impl Bilibili {
    const BASE_URL: &str = "https://www.bilibili.com";
    const API_BASE_URL: &str = "https://api.bilibili.com";
    const SHORT_LINK_HOST: &str = "b23.tv";

    // 80 = 1080P; fnval 4048 asks for every DASH variant
    const QUALITY: u32 = 80;
    const FNVAL: u32 = 4048;

    pub fn new(clients: &HttpClients) -> Self {
        let mut extractor = Extractor::new("Bilibili", clients);
        extractor.set_referer_static(Self::BASE_URL);

        Self {
            extractor,
            api_base: Self::API_BASE_URL.to_owned(),
            short_link_host: Self::SHORT_LINK_HOST.to_owned(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    #[cfg(test)]
    pub(crate) fn with_short_link_host(mut self, host: impl Into<String>) -> Self {
        self.short_link_host = host.into();
        self
    }

    /// Fails with the provider's own message when `code` is non-zero.
    fn check_code(response: &Value) -> Result<(), ParseError> {
        let code = response.path_i64("code");
        if code != 0 {
            return Err(ParseError::provider_api(
                "bilibili",
                format!("code {code}: {}", response.path_str("message")),
            ));
        }
        Ok(())
    }

    async fn get_view(&self, bvid: &str) -> Result<Value, ParseError> {
        let url = format!("{}/x/web-interface/view?bvid={bvid}", self.api_base);
        let response = self.extractor.get_json(&url, None).await?;
        Self::check_code(&response)?;
        Ok(response)
    }

    async fn get_play_url(&self, bvid: &str, cid: &str) -> Result<Value, ParseError> {
        let url = format!(
            "{}/x/player/wbi/playurl?bvid={bvid}&cid={cid}&qn={}&fnval={}&fourk=1",
            self.api_base,
            Self::QUALITY,
            Self::FNVAL
        );
        let referer = format!("{}/video/{bvid}", Self::BASE_URL);
        let response = self.extractor.get_json(&url, Some(&referer)).await?;
        Self::check_code(&response)?;
        Ok(response)
    }

    fn video_info(view: &Value, play: &Value) -> VideoInfo {
        let data = view.path("data");

        VideoInfo::builder(data.path_str("title"))
            .video_url(play.path_str("data.dash.video.0.baseUrl"))
            .music_url(play.path_str("data.dash.audio.0.baseUrl"))
            .cover_url(data.path_str("pic"))
            .author_name(data.path_str("owner.name"))
            .author_uid(data.path_str("owner.mid"))
            .author_avatar(data.path_str("owner.face"))
            .build()
    }
}

#[async_trait]
impl PlatformResolver for Bilibili {
    async fn resolve_share_url(&self, url: &str) -> Result<VideoInfo, ParseError> {
        let mut url = Url::parse(url).map_err(|_| ParseError::InvalidUrl(url.to_owned()))?;

        if url.host_str() == Some(self.short_link_host.as_str()) {
            let location = self.extractor.follow_one_redirect(url.as_str()).await?;
            debug!(from = %url, to = %location, "Unwrapped b23.tv short link");
            url = Url::parse(&location).map_err(|_| ParseError::InvalidUrl(location.clone()))?;
        }

        let bvid = extract_bvid(url.path()).ok_or_else(|| ParseError::InvalidUrl(url.to_string()))?;
        self.resolve_id(bvid).await
    }

    async fn resolve_id(&self, bvid: &str) -> Result<VideoInfo, ParseError> {
        if bvid.is_empty() || !bvid.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(ParseError::InvalidId(bvid.to_owned()));
        }

        let view = self.get_view(bvid).await?;
        let cid = view.path_str("data.cid");
        if cid.is_empty() {
            return Err(ParseError::provider_api("bilibili", "view response has no cid"));
        }
        debug!(bvid, cid, "Fetched bilibili view");

        let play = self.get_play_url(bvid, &cid).await?;
        Ok(Self::video_info(&view, &play))
    }
}
