//! 消息仓库协作方接口：元数据解析与分片拉取。
//!
//! 流式引擎只依赖这两个 trait，具体仓库（WebDav、测试用内存仓库）各自实现。

use async_trait::async_trait;
use bytes::Bytes;

use crate::internal::store::structs::file_handle::FileHandle;
use crate::internal::store::structs::store_error::StoreError;

/// 分片来源：按偏移拉取一段定长字节。
///
/// 调用方保证 `offset` 按分片大小对齐，`len` 不会越过文件末尾；
/// 返回的字节数必须等于 `len`，不足时应返回 [`StoreError::ShortChunk`]。
#[async_trait]
pub trait ChunkSource: Send + Sync {
    async fn fetch_chunk(
        &self,
        handle: &FileHandle,
        offset: u64,
        len: u64,
    ) -> Result<Bytes, StoreError>;
}

/// 消息仓库：把消息 id 解析成附件句柄。
#[async_trait]
pub trait FileStore: ChunkSource {
    /// 消息不存在或没有附件时返回 `Ok(None)`
    async fn resolve_file(
        &self,
        id: u64,
    ) -> Result<Option<FileHandle>, StoreError>;
}
