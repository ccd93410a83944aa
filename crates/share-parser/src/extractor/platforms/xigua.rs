use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::error::ParseError;
use crate::extractor::default::HttpClients;
use crate::extractor::platform_extractor::{Extractor, PlatformResolver, last_path_segment};
use crate::extractor::platforms::douyin::page;
use crate::media::VideoInfo;

/// Xigua posts, reached either directly or through a Douyin short link that
/// redirects to `ixigua.com`.
#[derive(Debug, Clone)]
pub struct Xigua {
    pub extractor: Extractor,
    page_base: String,
}

impl Xigua {
    const BASE_URL: &str = "https://m.ixigua.com";
    const SHARE_QUERY: &str = "aweme_type=107&schema_type=1&utm_source=copy&utm_campaign=client_share&utm_medium=android&app=aweme";

    pub fn new(clients: &HttpClients) -> Self {
        let mut extractor = Extractor::new("Xigua", clients);
        extractor.set_referer_static("https://m.ixigua.com/");

        Self {
            extractor,
            page_base: Self::BASE_URL.to_owned(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_page_base(mut self, base: impl Into<String>) -> Self {
        self.page_base = base.into();
        self
    }

    fn share_page_url(&self, id: &str) -> String {
        format!(
            "{}/douyin/share/video/{id}?{}",
            self.page_base,
            Self::SHARE_QUERY
        )
    }

    async fn id_from_share_url(&self, url: &Url) -> Result<String, ParseError> {
        let path = if url.host_str() == Some("v.ixigua.com") {
            let location = self.extractor.follow_one_redirect(url.as_str()).await?;
            Url::parse(&location)
                .map_err(|_| ParseError::InvalidUrl(location.clone()))?
                .path()
                .to_owned()
        } else {
            url.path().to_owned()
        };

        last_path_segment(&path)
            .map(str::to_owned)
            .ok_or_else(|| ParseError::InvalidUrl(url.to_string()))
    }
}

#[async_trait]
impl PlatformResolver for Xigua {
    async fn resolve_share_url(&self, url: &str) -> Result<VideoInfo, ParseError> {
        let url = Url::parse(url).map_err(|_| ParseError::InvalidUrl(url.to_owned()))?;
        let id = self.id_from_share_url(&url).await?;
        self.resolve_id(&id).await
    }

    async fn resolve_id(&self, id: &str) -> Result<VideoInfo, ParseError> {
        if !page::is_valid_item_id(id) {
            return Err(ParseError::InvalidId(id.to_owned()));
        }

        let html = self.extractor.get_bytes(&self.share_page_url(id)).await?;
        let data = page::router_data(&html)?;
        let item = page::locate_item(&data, id)?;

        let info = page::video_info_from_item(item, false);
        debug!(id, video_url = %info.video_url, "Resolved xigua post");
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::ParserConfig;
    use crate::extractor::platforms::douyin::page::tests::{share_page, state_with_items, video_item};
    use axum::Router;
    use axum::extract::{Path, RawQuery};
    use axum::routing::get;
    use serde_json::json;
    use tokio::net::TcpListener;

    async fn spawn_xigua_page() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let app = Router::new().route(
            "/douyin/share/video/{id}",
            get(|Path(id): Path<String>, RawQuery(query): RawQuery| async move {
                assert!(query.unwrap_or_default().contains("app=aweme"));
                let mut item = video_item(&id, "https://v3-xg.ixigua.test/playwm/x.mp4");
                item["images"] = json!([{"url_list": ["https://p3/1.webp"]}]);
                share_page(&state_with_items(json!([item]), json!([])))
            }),
        );

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{addr}")
    }

    fn xigua() -> Xigua {
        Xigua::new(&HttpClients::new(&ParserConfig::default()).unwrap())
    }

    #[tokio::test]
    async fn resolves_page_without_gallery() {
        let base = spawn_xigua_page().await;
        let xigua = xigua().with_page_base(base);

        let info = xigua.resolve_id("7162745094484771341").await.unwrap();
        assert_eq!(info.video_url, "https://v3-xg.ixigua.test/play/x.mp4");
        assert!(info.images.is_empty());
        assert_eq!(info.author.name, "someone");
    }

    #[tokio::test]
    async fn direct_links_use_last_segment() {
        let base = spawn_xigua_page().await;
        let xigua = xigua().with_page_base(base);

        let info = xigua
            .resolve_share_url("https://www.ixigua.com/7162745094484771341?logTag=abc")
            .await
            .unwrap();
        assert_eq!(info.title, "a caption");
    }

    #[tokio::test]
    async fn malformed_ids_are_rejected_locally() {
        let err = xigua().resolve_id("../x").await.unwrap_err();
        assert!(matches!(err, ParseError::InvalidId(_)));
    }
}
