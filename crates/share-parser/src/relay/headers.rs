//! Header policies for relayed media requests.
//!
//! Restricted in-app browsers reject media responses that carry headers they
//! do not expect, so those clients get a minimal fixed header set in both
//! directions. Everyone else gets a transparent proxy.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::header::{
    ACCEPT, ACCEPT_ENCODING, ACCEPT_RANGES, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS,
    CONNECTION, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, HOST, HeaderMap, HeaderName,
    HeaderValue, RANGE, TRANSFER_ENCODING, USER_AGENT,
};

static CONSTRAINED_UA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"MicroMessenger|miniProgram").unwrap());

static SEC_FETCH_MODE: HeaderName = HeaderName::from_static("sec-fetch-mode");

const DEFAULT_CONTENT_TYPE: &str = "video/mp4";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientEnvironment {
    /// WeChat browsers and mini-programs.
    Constrained,
    Generic,
}

impl ClientEnvironment {
    pub fn detect(user_agent: &str) -> Self {
        if CONSTRAINED_UA.is_match(user_agent) {
            ClientEnvironment::Constrained
        } else {
            ClientEnvironment::Generic
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        let user_agent = headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        Self::detect(user_agent)
    }

    pub fn is_constrained(&self) -> bool {
        matches!(self, ClientEnvironment::Constrained)
    }
}

/// Headers sent to the media host for a client request carrying `inbound`.
/// A User-Agent is always present; `user_agent` fills in when the policy
/// does not supply one.
pub fn upstream_request_headers(
    environment: ClientEnvironment,
    inbound: &HeaderMap,
    user_agent: &str,
) -> HeaderMap {
    let mut headers = match environment {
        ClientEnvironment::Constrained => {
            let mut headers = HeaderMap::new();
            if let Ok(value) = HeaderValue::from_str(user_agent) {
                headers.insert(USER_AGENT, value);
            }
            if let Some(range) = inbound.get(RANGE) {
                headers.insert(RANGE, range.clone());
            }
            headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
            headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate"));
            headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
            headers
        }
        ClientEnvironment::Generic => {
            let mut headers = inbound.clone();
            headers.remove(CONNECTION);
            headers.remove(&SEC_FETCH_MODE);
            headers.remove(HOST);
            headers
        }
    };

    if !headers.contains_key(USER_AGENT)
        && let Ok(value) = HeaderValue::from_str(user_agent)
    {
        headers.insert(USER_AGENT, value);
    }

    headers
}

/// Headers returned to the client for an upstream response carrying
/// `upstream`.
pub fn relay_response_headers(environment: ClientEnvironment, upstream: &HeaderMap) -> HeaderMap {
    match environment {
        ClientEnvironment::Constrained => {
            let mut headers = HeaderMap::new();
            headers.insert(
                CONTENT_TYPE,
                upstream
                    .get(CONTENT_TYPE)
                    .cloned()
                    .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE)),
            );
            for name in [CONTENT_RANGE, CONTENT_LENGTH] {
                if let Some(value) = upstream.get(&name) {
                    headers.insert(name, value.clone());
                }
            }
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
            headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("GET"));
            headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
            headers
        }
        ClientEnvironment::Generic => {
            let mut headers = upstream.clone();
            headers.remove(CONNECTION);
            headers.remove(TRANSFER_ENCODING);

            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
            headers.insert(
                ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static("GET, OPTIONS"),
            );
            headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
            headers.insert(ACCESS_CONTROL_EXPOSE_HEADERS, HeaderValue::from_static("*"));
            headers
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::MOBILE_SAFARI_UA;

    const WECHAT_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Mobile/15E148 MicroMessenger/8.0.47(0x18002f2c) NetType/WIFI Language/zh_CN";

    fn inbound(user_agent: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(user_agent).unwrap());
        headers.insert(RANGE, HeaderValue::from_static("bytes=0-1023"));
        headers.insert(CONNECTION, HeaderValue::from_static("close"));
        headers.insert(SEC_FETCH_MODE.clone(), HeaderValue::from_static("no-cors"));
        headers.insert(HOST, HeaderValue::from_static("relay.example"));
        headers.insert("x-custom", HeaderValue::from_static("1"));
        headers
    }

    #[test]
    fn detects_restricted_browsers() {
        assert_eq!(ClientEnvironment::detect(WECHAT_UA), ClientEnvironment::Constrained);
        assert!(ClientEnvironment::detect("Mozilla/5.0 miniProgram").is_constrained());
        assert_eq!(
            ClientEnvironment::detect("Mozilla/5.0 (X11; Linux x86_64) Firefox/128.0"),
            ClientEnvironment::Generic
        );
        assert_eq!(
            ClientEnvironment::from_headers(&HeaderMap::new()),
            ClientEnvironment::Generic
        );
    }

    #[test]
    fn constrained_request_uses_fixed_identity() {
        let headers = upstream_request_headers(
            ClientEnvironment::Constrained,
            &inbound(WECHAT_UA),
            MOBILE_SAFARI_UA,
        );

        assert_eq!(headers[USER_AGENT], MOBILE_SAFARI_UA);
        assert_eq!(headers[RANGE], "bytes=0-1023");
        assert_eq!(headers[ACCEPT], "*/*");
        assert_eq!(headers[ACCEPT_ENCODING], "gzip, deflate");
        assert_eq!(headers[CONNECTION], "keep-alive");
        assert_eq!(headers.len(), 5);
    }

    #[test]
    fn generic_request_forwards_all_but_connection_headers() {
        let headers = upstream_request_headers(
            ClientEnvironment::Generic,
            &inbound("curl/8.5.0"),
            MOBILE_SAFARI_UA,
        );

        assert_eq!(headers[USER_AGENT], "curl/8.5.0");
        assert_eq!(headers[RANGE], "bytes=0-1023");
        assert_eq!(headers["x-custom"], "1");
        assert!(!headers.contains_key(CONNECTION));
        assert!(!headers.contains_key(&SEC_FETCH_MODE));
        assert!(!headers.contains_key(HOST));
    }

    #[test]
    fn user_agent_is_filled_in() {
        let headers =
            upstream_request_headers(ClientEnvironment::Generic, &HeaderMap::new(), MOBILE_SAFARI_UA);
        assert_eq!(headers[USER_AGENT], MOBILE_SAFARI_UA);
    }

    fn upstream_response() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_RANGE, HeaderValue::from_static("bytes 0-1023/4096"));
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("1024"));
        headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert("x-cache", HeaderValue::from_static("HIT"));
        headers.insert("set-cookie", HeaderValue::from_static("a=b"));
        headers
    }

    #[test]
    fn constrained_response_keeps_only_the_minimal_set() {
        let headers = relay_response_headers(ClientEnvironment::Constrained, &upstream_response());

        assert_eq!(headers[CONTENT_RANGE], "bytes 0-1023/4096");
        assert_eq!(headers[CONTENT_LENGTH], "1024");
        assert_eq!(headers[ACCEPT_RANGES], "bytes");
        assert_eq!(headers[CONTENT_TYPE], "video/mp4");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "GET");
        assert!(!headers.contains_key("x-cache"));
        assert!(!headers.contains_key("set-cookie"));
        assert!(!headers.contains_key(CONNECTION));
        assert_eq!(headers.len(), 6);
    }

    #[test]
    fn generic_response_forwards_and_adds_cors() {
        let headers = relay_response_headers(ClientEnvironment::Generic, &upstream_response());

        assert_eq!(headers["x-cache"], "HIT");
        assert_eq!(headers[CONTENT_RANGE], "bytes 0-1023/4096");
        assert!(!headers.contains_key(CONNECTION));
        assert!(!headers.contains_key(TRANSFER_ENCODING));
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "GET, OPTIONS");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], "*");
        assert_eq!(headers[ACCESS_CONTROL_EXPOSE_HEADERS], "*");
    }
}
