mod builder;
pub(crate) mod cdn;
pub(crate) mod page;

pub use builder::Douyin;
pub use cdn::is_allowed_cdn_url;
