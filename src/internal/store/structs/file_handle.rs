use chrono::{DateTime, Local};

use super::media_kind::{FALLBACK_MIME, MediaKind, guess_mime};

/// 消息仓库中一条消息所携带附件的句柄，由 [`FileStore::resolve_file`] 返回。
///
/// [`FileStore::resolve_file`]: crate::internal::store::traits::file_store::FileStore::resolve_file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub id: u64,
    pub location: String,           // 附件的完整地址，分片拉取用
    pub name: Option<String>,       // 原始文件名，仓库可能不给
    pub size: u64,                  // 附件大小（字节）
    pub mime: Option<String>,       // 仓库声明的 MIME 类型
    pub media_kind: Option<MediaKind>, // 附件媒体类别，未知时为 None
    pub access_code: Option<String>, // 消息正文，即访问码
}

/// 对外展示用的文件属性：名字、大小、MIME 都已补齐
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileProperties {
    pub name: String,
    pub size: u64,
    pub mime: String,
}

impl FileHandle {
    /// 补齐文件属性。
    ///
    /// 没有文件名时按媒体类别生成缺省名；既没有名字又不是可识别媒体时返回 `None`。
    /// 没有 MIME 时按文件名猜，猜不出用 `application/octet-stream`。
    pub fn properties(&self, now: DateTime<Local>) -> Option<FileProperties> {
        let name = match self.name.as_deref().filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => self.media_kind?.default_file_name(now)?,
        };

        let mime = match self.mime.as_deref().filter(|m| !m.is_empty()) {
            Some(mime) => mime.to_string(),
            None => guess_mime(&name).unwrap_or(FALLBACK_MIME).to_string(),
        };

        Some(FileProperties {
            name,
            size: self.size,
            mime,
        })
    }

    /// 访问码校验；消息没有正文时任何访问码都不匹配
    pub fn code_matches(&self, code: &str) -> bool {
        self.access_code.as_deref() == Some(code)
    }
}
