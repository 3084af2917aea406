//! 流式引擎错误类型。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StreamError {
    /// Range 头无法解析或越界
    #[error("无效的 Range: {0}")]
    InvalidRange(String),

    /// 远端连续多次在限定时间内没有交付分片，或分片拉取失败
    #[error("上游分片拉取失败: {0}")]
    UpstreamFailure(String),

    /// 收到结束哨兵时，分片数还没达到计划数
    #[error("输出被截断：期望 {expected} 个分片，只收到 {received} 个")]
    StreamTruncated { expected: u32, received: u32 },

    #[error("会话闸门已关闭")]
    GateClosed,
}
