mod builder;

pub use builder::{Bilibili, extract_bvid};
