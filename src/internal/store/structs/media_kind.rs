//! 附件媒体类别：由 mime / 扩展名推断，并提供缺省文件名与扩展名。

use chrono::{DateTime, Local};

/// 附件的媒体类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
    Voice,
    Photo,
    VideoNote,
    /// 普通文件，没有缺省扩展名
    Document,
}

/// 扩展名 → mime 对照表，只覆盖播放页面关心的常见类型
const MIME_TABLE: &[(&str, &str)] = &[
    ("mp4", "video/mp4"),
    ("m4v", "video/x-m4v"),
    ("mkv", "video/x-matroska"),
    ("webm", "video/webm"),
    ("mov", "video/quicktime"),
    ("avi", "video/x-msvideo"),
    ("mp3", "audio/mpeg"),
    ("m4a", "audio/mp4"),
    ("ogg", "audio/ogg"),
    ("oga", "audio/ogg"),
    ("flac", "audio/flac"),
    ("wav", "audio/x-wav"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("txt", "text/plain"),
    ("json", "application/json"),
];

pub const FALLBACK_MIME: &str = "application/octet-stream";

impl MediaKind {
    /// 缺省扩展名；Document 没有
    pub fn default_extension(&self) -> Option<&'static str> {
        match self {
            MediaKind::Video => Some("mp4"),
            MediaKind::Audio => Some("mp3"),
            MediaKind::Voice => Some("ogg"),
            MediaKind::Photo => Some("jpg"),
            MediaKind::VideoNote => Some("mp4"),
            MediaKind::Document => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Voice => "voice",
            MediaKind::Photo => "photo",
            MediaKind::VideoNote => "video_note",
            MediaKind::Document => "document",
        }
    }

    /// 根据 mime 推断类别，无法归类的都算 Document
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.trim().to_ascii_lowercase();
        if mime == "audio/ogg" || mime == "audio/opus" {
            MediaKind::Voice
        } else if mime.starts_with("video/") {
            MediaKind::Video
        } else if mime.starts_with("audio/") {
            MediaKind::Audio
        } else if mime.starts_with("image/") {
            MediaKind::Photo
        } else {
            MediaKind::Document
        }
    }

    /// 生成缺省文件名，形如 `video-2024-01-31_12-00-00.mp4`；Document 没有缺省名
    pub fn default_file_name(&self, now: DateTime<Local>) -> Option<String> {
        let ext = self.default_extension()?;
        let date = now.format("%Y-%m-%d_%H-%M-%S");
        Some(format!("{}-{}.{}", self.as_str(), date, ext))
    }
}

/// 按扩展名猜测 mime，猜不出时返回 `None`
pub fn guess_mime(file_name: &str) -> Option<&'static str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    MIME_TABLE
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}
