use std::sync::LazyLock;

use regex::bytes::Regex;

use crate::error::ParseError;

/// A `<script>` assignment that a page uses to ship its data, e.g.
/// `window._ROUTER_DATA = {...}</script>`.
#[derive(Debug, Clone)]
pub struct EmbeddedMarker {
    marker: &'static str,
    pattern: Regex,
}

/// Server-rendered state of the Douyin and Xigua share pages.
pub static ROUTER_DATA: LazyLock<EmbeddedMarker> =
    LazyLock::new(|| EmbeddedMarker::new("window._ROUTER_DATA").unwrap());

impl EmbeddedMarker {
    pub fn new(marker: &'static str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r"(?s-u){}\s*=\s*(.*?)</script>",
            regex::escape(marker)
        ))?;
        Ok(Self { marker, pattern })
    }

    /// Returns the raw bytes assigned to the marker, trimmed of surrounding
    /// whitespace. The payload is not checked for JSON well-formedness.
    pub fn extract<'a>(&self, html: &'a [u8]) -> Result<&'a [u8], ParseError> {
        self.pattern
            .captures(html)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_bytes().trim_ascii())
            .filter(|data| !data.is_empty())
            .ok_or(ParseError::MarkerNotFound(self.marker))
    }
}

#[inline]
pub fn extract_json<'a>(html: &'a [u8], marker: &EmbeddedMarker) -> Result<&'a [u8], ParseError> {
    marker.extract(html)
}
