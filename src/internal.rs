pub mod auth;
pub mod server;
pub mod states;
pub mod store;
pub mod streaming;
pub mod webdav;
