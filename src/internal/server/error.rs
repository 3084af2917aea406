//! HTTP 层错误与状态码映射。
//!
//! 响应体只会是固定消息表里的文本，内部细节只进日志。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::internal::store::structs::StoreError;
use crate::internal::streaming::StreamError;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("缺少访问码")]
    MissingCode,

    #[error("访问码不匹配")]
    InvalidCode,

    #[error("文件不存在")]
    FileNotFound,

    #[error("元数据解析超时")]
    MetadataTimeout,

    #[error("无效的 Range: {0}")]
    InvalidRange(String),

    #[error("附件既没有文件名也不是可识别的媒体")]
    InvalidMedia,

    #[error("上游失败: {0}")]
    UpstreamFailure(String),

    #[error("服务暂不可用")]
    Unavailable,

    #[error("仓库错误: {0}")]
    Store(#[from] StoreError),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 固定消息表
pub fn error_message(status: StatusCode) -> &'static str {
    match status.as_u16() {
        400 => "Invalid request.",
        401 => "File code is required to download the file.",
        403 => "Invalid file code.",
        404 => "File not found.",
        416 => "Invalid range.",
        503 => "Service temporarily unavailable.",
        _ => "Internal server error.",
    }
}

impl LinkError {
    pub fn status(&self) -> StatusCode {
        match self {
            LinkError::MissingCode => StatusCode::UNAUTHORIZED,
            LinkError::InvalidCode => StatusCode::FORBIDDEN,
            LinkError::FileNotFound => StatusCode::NOT_FOUND,
            LinkError::InvalidRange(_) => StatusCode::RANGE_NOT_SATISFIABLE,
            LinkError::InvalidMedia => StatusCode::BAD_REQUEST,
            LinkError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            LinkError::MetadataTimeout
            | LinkError::UpstreamFailure(_)
            | LinkError::Store(_)
            | LinkError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 对客户端可见的消息；个别错误有比消息表更具体的固定文案
    pub fn message(&self) -> &'static str {
        match self {
            LinkError::MetadataTimeout => "Request timeout",
            LinkError::InvalidMedia => "Invalid media type.",
            other => error_message(other.status()),
        }
    }
}

impl From<StreamError> for LinkError {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::InvalidRange(detail) => LinkError::InvalidRange(detail),
            StreamError::GateClosed => LinkError::Unavailable,
            other => LinkError::UpstreamFailure(other.to_string()),
        }
    }
}

impl IntoResponse for LinkError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "请求失败");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "请求被拒绝");
        }
        (status, self.message()).into_response()
    }
}
