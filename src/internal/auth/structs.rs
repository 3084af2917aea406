pub mod webdav_auth;
