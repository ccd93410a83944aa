use reqwest::StatusCode;
use thiserror::Error;

use crate::media::VideoInfo;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid video id: {0:?}")]
    InvalidId(String),
    #[error("http error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("expected a redirect from {url}, got status {status}")]
    RedirectExpected { url: String, status: StatusCode },
    #[error("embedded data marker `{0}` not found in page")]
    MarkerNotFound(&'static str),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{platform} api error: {message}")]
    ProviderApi {
        platform: &'static str,
        message: String,
    },
    #[error("content unavailable: {0}")]
    ContentUnavailable(String),
    #[error("video url does not contain any allowed domains after {attempts} attempts")]
    RetryExhausted {
        attempts: u32,
        last: Box<VideoInfo>,
    },
    #[error("upstream returned status {0}")]
    UpstreamStatus(StatusCode),
}

impl ParseError {
    /// The best-effort result that accompanies a failure, if any.
    pub fn partial_result(&self) -> Option<&VideoInfo> {
        match self {
            ParseError::RetryExhausted { last, .. } => Some(last),
            _ => None,
        }
    }

    pub fn into_partial_result(self) -> Option<VideoInfo> {
        match self {
            ParseError::RetryExhausted { last, .. } => Some(*last),
            _ => None,
        }
    }

    pub(crate) fn provider_api(platform: &'static str, message: impl Into<String>) -> Self {
        ParseError::ProviderApi {
            platform,
            message: message.into(),
        }
    }
}
