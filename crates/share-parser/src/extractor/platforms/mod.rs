pub mod bilibili;
pub mod douyin;
pub mod xigua;
