pub mod file_handle;
pub mod media_kind;
pub mod store_error;

pub use file_handle::{FileHandle, FileProperties};
pub use media_kind::MediaKind;
pub use store_error::StoreError;
