use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::default::{HttpClients, ParserConfig};
use super::platform_extractor::PlatformResolver;
use super::platforms::{bilibili::Bilibili, douyin::Douyin, xigua::Xigua};
use super::retry::RetryGuard;
use crate::error::ParseError;
use crate::media::VideoInfo;

/// Platforms with a registered resolver. Doubles as the `source` tag of
/// id-based requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Douyin,
    Bilibili,
    Xigua,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Douyin, Platform::Bilibili, Platform::Xigua];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Douyin => "douyin",
            Platform::Bilibili => "bilibili",
            Platform::Xigua => "xigua",
        }
    }

    /// Platform owning `host`, if any.
    pub fn from_host(host: &str) -> Option<Platform> {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        PLATFORMS
            .iter()
            .find(|entry| entry.hosts.contains(&host.as_str()))
            .map(|entry| entry.platform)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ParseError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let source = source.trim();
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(source))
            .ok_or_else(|| ParseError::UnsupportedProvider(source.to_string()))
    }
}

struct PlatformEntry {
    platform: Platform,
    hosts: &'static [&'static str],
}

macro_rules! platform_registry {
    ( $( $platform:path => [ $( $host:literal ),+ $(,)? ] ),+ $(,)? ) => {
        &[
            $(
                PlatformEntry {
                    platform: $platform,
                    hosts: &[ $( $host ),+ ],
                },
            )+
        ]
    };
}

// Static host registry.
static PLATFORMS: &[PlatformEntry] = platform_registry![
    Platform::Douyin => [
        "v.douyin.com",
        "www.douyin.com",
        "douyin.com",
        "www.iesdouyin.com",
        "iesdouyin.com",
    ],
    Platform::Bilibili => [
        "www.bilibili.com",
        "bilibili.com",
        "m.bilibili.com",
        "b23.tv",
    ],
    Platform::Xigua => [
        "www.ixigua.com",
        "ixigua.com",
        "m.ixigua.com",
        "v.ixigua.com",
    ],
];

static SHARE_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u)https?://[\w.-]+[\w/-]*[\w.-]*\??[\w=&:\-+%]*/*").unwrap()
});

/// Pulls the first http(s) URL out of pasted share text such as
/// `"7.99 copy this link https://v.douyin.com/iRNBho6u/ and open the app"`.
pub fn extract_share_url(text: &str) -> Result<Url, ParseError> {
    let raw = SHARE_URL_REGEX
        .find(text)
        .map(|m| m.as_str())
        .ok_or_else(|| ParseError::InvalidUrl(text.to_string()))?;

    Url::parse(raw).map_err(|_| ParseError::InvalidUrl(raw.to_string()))
}

/// Picks the platform for a share link without touching the network.
pub fn route_share_url(text: &str) -> Result<(Platform, Url), ParseError> {
    let url = extract_share_url(text)?;
    let host = url
        .host_str()
        .ok_or_else(|| ParseError::InvalidUrl(url.to_string()))?;

    let platform =
        Platform::from_host(host).ok_or_else(|| ParseError::UnsupportedProvider(host.to_string()))?;

    Ok((platform, url))
}

/// Dispatches share links and `(source, id)` pairs to platform resolvers.
pub struct ResolverFactory {
    douyin: Douyin,
    bilibili: Bilibili,
    xigua: Xigua,
}

impl ResolverFactory {
    pub fn new(config: ParserConfig) -> Result<Self, ParseError> {
        let clients = HttpClients::new(&config)?;
        Ok(Self::with_clients(&clients, RetryGuard::new(config.retry)))
    }

    pub fn with_clients(clients: &HttpClients, guard: RetryGuard) -> Self {
        Self {
            douyin: Douyin::new(clients, guard),
            bilibili: Bilibili::new(clients),
            xigua: Xigua::new(clients),
        }
    }

    pub fn resolver(&self, platform: Platform) -> &dyn PlatformResolver {
        match platform {
            Platform::Douyin => &self.douyin,
            Platform::Bilibili => &self.bilibili,
            Platform::Xigua => &self.xigua,
        }
    }

    pub async fn resolve_share_url(&self, text: &str) -> Result<VideoInfo, ParseError> {
        let (platform, url) = route_share_url(text)?;
        debug!(%platform, url = %url, "Dispatching share url");
        self.resolver(platform).resolve_share_url(url.as_str()).await
    }

    pub async fn resolve_by_id(&self, source: &str, id: &str) -> Result<VideoInfo, ParseError> {
        let platform: Platform = source.parse()?;
        let id = id.trim();
        if id.is_empty() {
            return Err(ParseError::InvalidId(id.to_string()));
        }
        debug!(%platform, id, "Dispatching video id");
        self.resolver(platform).resolve_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_every_registered_host() {
        let cases = [
            ("https://v.douyin.com/iRNBho6u/", Platform::Douyin),
            ("https://www.douyin.com/video/7298145681699622182", Platform::Douyin),
            ("https://www.iesdouyin.com/share/video/7298145681699622182/", Platform::Douyin),
            ("https://b23.tv/BV1xx411c7mD", Platform::Bilibili),
            ("https://www.bilibili.com/video/BV1GJ411x7h7", Platform::Bilibili),
            ("https://m.bilibili.com/video/BV1GJ411x7h7", Platform::Bilibili),
            ("https://www.ixigua.com/7162745094484771341", Platform::Xigua),
        ];

        for (url, expected) in cases {
            let (platform, _) = route_share_url(url).unwrap();
            assert_eq!(platform, expected, "{url}");
        }
    }

    #[test]
    fn extracts_url_from_share_text() {
        let text = "7.43 pdB:/ 复制打开抖音，看看【某人的作品】 https://v.douyin.com/iRNBho6u/ 09/12 fgO:/";
        let (platform, url) = route_share_url(text).unwrap();

        assert_eq!(platform, Platform::Douyin);
        assert_eq!(url.as_str(), "https://v.douyin.com/iRNBho6u/");

        let (_, url) = route_share_url("【标题】https://b23.tv/BV1xx411c7mD复制链接").unwrap();
        assert_eq!(url.as_str(), "https://b23.tv/BV1xx411c7mD");
    }

    #[test]
    fn unknown_host_names_the_host() {
        for url in [
            "https://www.youtube.com/watch?v=abc",
            "https://douyin.com.evil.test/video/1",
            "http://127.0.0.1/video/1",
        ] {
            let err = route_share_url(url).unwrap_err();
            let host = Url::parse(url).unwrap().host_str().unwrap().to_string();
            match err {
                ParseError::UnsupportedProvider(name) => assert_eq!(name, host),
                other => panic!("unexpected error for {url}: {other:?}"),
            }
        }
    }

    #[test]
    fn text_without_url_is_invalid() {
        assert!(matches!(
            route_share_url("no link in here"),
            Err(ParseError::InvalidUrl(_))
        ));
    }

    #[test]
    fn source_tags_are_case_insensitive() {
        assert_eq!("Douyin".parse::<Platform>().unwrap(), Platform::Douyin);
        assert_eq!(" bilibili ".parse::<Platform>().unwrap(), Platform::Bilibili);
        assert_eq!("XIGUA".parse::<Platform>().unwrap(), Platform::Xigua);

        match "kuaishou".parse::<Platform>() {
            Err(ParseError::UnsupportedProvider(tag)) => assert_eq!(tag, "kuaishou"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_source_is_rejected_before_any_request() {
        crate::extractor::install_crypto_provider();
        let factory = ResolverFactory::new(ParserConfig::default()).unwrap();

        let err = factory.resolve_by_id("tiktok", "123").await.unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedProvider(ref t) if t == "tiktok"));

        let err = factory.resolve_by_id("douyin", "  ").await.unwrap_err();
        assert!(matches!(err, ParseError::InvalidId(_)));
    }
}
