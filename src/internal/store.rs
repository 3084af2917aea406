//! 消息仓库领域模块：协作方接口、附件句柄，以及基于 WebDav 的仓库实现。

pub mod structs;
pub mod traits;
pub mod webdav_store;
