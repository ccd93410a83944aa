//! Single-hop redirect resolution.
//!
//! Share links and CDN play addresses are redirect stubs. The client passed
//! here must have redirects disabled so the 3xx response itself comes back
//! and its `Location` can be read without touching the target.

use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, LOCATION, USER_AGENT};
use tracing::debug;
use url::Url;

use super::default::DEFAULT_UA;
use crate::error::ParseError;

/// Issues one GET and returns the `Location` of the redirect response.
///
/// Absolute locations are returned verbatim; relative ones are resolved
/// against the request URL. The response body is never read.
pub async fn follow_one_redirect(
    client: &Client,
    url: &str,
    headers: &HeaderMap,
) -> Result<String, ParseError> {
    let mut headers = headers.clone();
    if !headers.contains_key(USER_AGENT) {
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_UA));
    }

    let response = client.get(url).headers(headers).send().await?;
    let status = response.status();

    let redirect_expected = || ParseError::RedirectExpected {
        url: url.to_owned(),
        status,
    };

    if !status.is_redirection() {
        return Err(redirect_expected());
    }

    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(redirect_expected)?;

    let resolved = if Url::parse(location).is_ok() {
        location.to_owned()
    } else {
        response
            .url()
            .join(location)
            .map_err(|_| redirect_expected())?
            .to_string()
    };

    debug!(from = url, to = %resolved, status = status.as_u16(), "Followed one redirect");
    Ok(resolved)
}
