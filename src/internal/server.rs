//! HTTP 服务层：配置、路由、错误映射、页面。

pub mod base_url;
pub mod config;
pub mod error;
pub mod headers;
pub mod pages;
pub mod routes;

pub use config::{ConfigError, ServerConfig};
pub use error::LinkError;
pub use routes::{AppState, app};
