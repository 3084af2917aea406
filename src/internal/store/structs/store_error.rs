//! 消息仓库相关错误类型。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP 请求失败: {0}")]
    Request(#[from] reqwest::Error),

    #[error("创建 http 客户端失败: {0}")]
    Client(String),

    #[error("路径格式错误: {0}")]
    InvalidPath(String),

    #[error("远程状态异常 {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("多状态响应解析失败: {0}")]
    Xml(#[from] quick_xml::DeError),

    /// 服务器忽略了 Range 头，返回了整文件
    #[error("服务器不支持 Range 请求")]
    RangeNotSupported,

    #[error("分片长度异常：期望 {expected} 字节，实际 {actual} 字节 (offset={offset})")]
    ShortChunk {
        offset: u64,
        expected: u64,
        actual: u64,
    },
}
