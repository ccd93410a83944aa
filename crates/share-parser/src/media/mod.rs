pub mod video_info;

pub use video_info::{Author, VideoInfo, VideoInfoBuilder};
