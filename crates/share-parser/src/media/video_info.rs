use serde::{Deserialize, Serialize};

/// Uploader of a resolved post. Every field is empty when the platform
/// does not expose it.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Author {
    pub uid: String,
    pub name: String,
    pub avatar: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
/// The result of resolving one share link or platform id.
///
/// A post is either a single video (`video_url` set) or an image gallery
/// (`images` set); [`VideoInfoBuilder::build`] never produces both.
///
/// # Fields
///
/// * `author` - Uploader name, uid and avatar
/// * `title` - Caption of the post, may be empty
/// * `video_url` - Direct playable URL, empty for galleries
/// * `music_url` - Separate audio stream when the platform splits audio and video
/// * `cover_url` - Thumbnail or poster
/// * `images` - Gallery image URLs, in display order
///
/// # Examples
///
/// ```rust
/// use share_parser::media::VideoInfo;
///
/// let info = VideoInfo::builder("A caption")
///     .video_url("https://v26.douyinvod.com/abc/video.mp4")
///     .cover_url("https://p3.douyinpic.com/cover.jpg")
///     .author_name("someone")
///     .build();
/// assert!(!info.is_gallery());
/// ```
pub struct VideoInfo {
    pub author: Author,
    pub title: String,
    pub video_url: String,
    pub music_url: String,
    pub cover_url: String,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct VideoInfoBuilder {
    author: Author,
    title: String,
    video_url: String,
    music_url: String,
    cover_url: String,
    images: Vec<String>,
}

impl VideoInfo {
    pub fn builder(title: impl Into<String>) -> VideoInfoBuilder {
        VideoInfoBuilder::new(title)
    }

    pub fn is_gallery(&self) -> bool {
        !self.images.is_empty()
    }
}

impl VideoInfoBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn video_url(mut self, video_url: impl Into<String>) -> Self {
        self.video_url = video_url.into();
        self
    }

    pub fn music_url(mut self, music_url: impl Into<String>) -> Self {
        self.music_url = music_url.into();
        self
    }

    pub fn cover_url(mut self, cover_url: impl Into<String>) -> Self {
        self.cover_url = cover_url.into();
        self
    }

    pub fn images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }

    pub fn author_name(mut self, name: impl Into<String>) -> Self {
        self.author.name = name.into();
        self
    }

    pub fn author_uid(mut self, uid: impl Into<String>) -> Self {
        self.author.uid = uid.into();
        self
    }

    pub fn author_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.author.avatar = avatar.into();
        self
    }

    pub fn build(mut self) -> VideoInfo {
        // Gallery posts carry a placeholder video address that does not play.
        if !self.images.is_empty() {
            self.video_url.clear();
        }

        VideoInfo {
            author: self.author,
            title: self.title,
            video_url: self.video_url,
            music_url: self.music_url,
            cover_url: self.cover_url,
            images: self.images,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gallery_build_clears_video_url() {
        let info = VideoInfo::builder("gallery")
            .video_url("https://aweme.snssdk.com/aweme/v1/play/?video_id=x")
            .images(vec!["https://p3.douyinpic.com/1.webp".to_string()])
            .build();

        assert!(info.is_gallery());
        assert_eq!(info.video_url, "");
    }

    #[test]
    fn serializes_with_snake_case_keys() {
        let info = VideoInfo::builder("t")
            .video_url("https://example.com/v.mp4")
            .author_uid("42")
            .build();
        let value = serde_json::to_value(&info).unwrap();

        assert_eq!(value["video_url"], "https://example.com/v.mp4");
        assert_eq!(value["music_url"], "");
        assert_eq!(value["author"]["uid"], "42");
        assert!(value["images"].as_array().unwrap().is_empty());
    }
}
