//! HTTP surface of the share-link resolver.
//!
//! Wraps [`share_parser`] in three routes: share-link resolution, id
//! resolution and the media stream relay.

pub mod api;
pub mod config;

pub use api::ApiServer;
pub use config::ServerConfig;
