//! Reading posts out of the `_ROUTER_DATA` state of a share page.
//!
//! Douyin share pages and the Xigua pages Douyin links to ship the same
//! router state, so both resolvers go through here.

use serde_json::Value;

use crate::error::ParseError;
use crate::extractor::embedded::{ROUTER_DATA, extract_json};
use crate::extractor::json_path::JsonPath;
use crate::media::VideoInfo;

const VIDEO_INFO_RES: &str = "loaderData.video_(id)/page.videoInfoRes";

/// Post ids on these platforms are plain alphanumeric tokens.
pub(crate) fn is_valid_item_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Parses the router state embedded in a share page.
pub(crate) fn router_data(html: &[u8]) -> Result<Value, ParseError> {
    let json = extract_json(html, &ROUTER_DATA)?;
    Ok(serde_json::from_slice(json)?)
}

/// Finds the item record for `id`.
///
/// Prefers the entry whose `aweme_id` matches and falls back to the first
/// entry. With no items at all, the platform's filter reason for `id` is
/// reported instead.
pub(crate) fn locate_item<'a>(data: &'a Value, id: &str) -> Result<&'a Value, ParseError> {
    let res = data.path(VIDEO_INFO_RES);
    let items = res.path_array("item_list");

    if let Some(item) = items
        .iter()
        .find(|item| item.path_str("aweme_id") == id)
        .or_else(|| items.first())
    {
        return Ok(item);
    }

    let filtered = res
        .path_array("filter_list")
        .iter()
        .find(|entry| entry.path_str("aweme_id") == id);

    let reason = match filtered {
        Some(entry) => format!(
            "{} - {}",
            entry.path_str("filter_reason"),
            entry.path_str("detail_msg")
        ),
        None => format!("no item for {id} in share page"),
    };
    Err(ParseError::ContentUnavailable(reason))
}

/// Builds a [`VideoInfo`] from an item record. The video URL is the raw play
/// address with the watermark variant swapped out; it still has to go
/// through one redirect hop to reach the media host.
pub(crate) fn video_info_from_item(item: &Value, allow_gallery: bool) -> VideoInfo {
    let images = if allow_gallery {
        item.path_array("images")
            .iter()
            .map(|image| image.path_str("url_list.0"))
            .filter(|url| !url.is_empty())
            .collect()
    } else {
        Vec::new()
    };

    let video_url = item
        .path_str("video.play_addr.url_list.0")
        .replace("playwm", "play");

    VideoInfo::builder(item.path_str("desc"))
        .video_url(video_url)
        .cover_url(item.path_str("video.cover.url_list.0"))
        .images(images)
        .author_uid(item.path_str("author.sec_uid"))
        .author_name(item.path_str("author.nickname"))
        .author_avatar(item.path_str("author.avatar_thumb.url_list.0"))
        .build()
}
