//! Share-link resolution for short-video platforms.
//!
//! [`extractor::factory::ResolverFactory`] dispatches a share link (or a
//! `(source, id)` pair) to the owning platform resolver and returns a
//! [`media::VideoInfo`]. [`relay::StreamRelay`] fetches a resolved media URL
//! and hands the body back as a byte stream for the caller to forward.

pub mod error;
pub mod extractor;
pub mod media;
pub mod relay;

pub use error::ParseError;
pub use extractor::{ParserConfig, default_factory};
pub use media::{Author, VideoInfo};
