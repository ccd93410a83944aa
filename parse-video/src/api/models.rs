//! Request and response shapes of the API.

use serde::{Deserialize, Serialize};
use share_parser::{ParseError, VideoInfo};

/// `code` of a successful envelope.
pub const CODE_OK: u16 = 200;
/// `code` of a resolution failure. The HTTP status stays 200.
pub const CODE_PARSE_FAILED: u16 = 201;

/// Uniform `{code, msg, data}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpResponse<T> {
    pub code: u16,
    pub msg: String,
    pub data: Option<T>,
}

impl<T> HttpResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: CODE_OK,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    pub fn error(code: u16, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

impl HttpResponse<VideoInfo> {
    /// Envelope for a resolution outcome. Exhausted host retries still carry
    /// the last result so the caller can decide whether to use it.
    pub fn from_result(result: Result<VideoInfo, ParseError>) -> Self {
        match result {
            Ok(info) => Self::ok(info),
            Err(e) => {
                let msg = e.to_string();
                Self {
                    code: CODE_PARSE_FAILED,
                    msg,
                    data: e.into_partial_result(),
                }
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ShareUrlQuery {
    /// Share link or pasted share text.
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VideoIdQuery {
    pub source: String,
    pub video_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StreamQuery {
    pub url: String,
}
