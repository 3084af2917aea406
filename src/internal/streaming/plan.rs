//! 分片计划：把字节区间映射到定长分片上。

use super::range::ByteRange;

/// 覆盖一个字节区间所需的分片拉取计划，计算后不可变。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    /// 第一个分片的起始偏移，按分片大小对齐且不大于区间起点
    pub offset: u64,
    /// 第一个分片需要丢弃的前缀字节数
    pub first_trim: u64,
    /// 最后一个分片需要保留的字节数（切片上界）
    pub last_trim: u64,
    /// 需要拉取的分片数
    pub part_count: u32,
    /// 响应体总字节数
    pub total_bytes: u64,
    pub chunk_size: u64,
    pub file_size: u64,
}

impl ChunkPlan {
    /// 根据区间、文件大小与分片大小计算计划。
    ///
    /// 区间终点先收到 `file_size - 1`。分片数按 `[offset, end]` 实际跨越的分片计算，
    /// 终点恰好落在分片边界上时也能覆盖到最后一个字节。
    pub fn new(range: ByteRange, file_size: u64, chunk_size: u64) -> Self {
        debug_assert!(chunk_size > 0);
        let start = range.start;
        let end = range.end.min(file_size.saturating_sub(1));

        let offset = start - start % chunk_size;
        let first_trim = start - offset;
        let last_trim = end % chunk_size + 1;
        let part_count = (end / chunk_size - offset / chunk_size + 1) as u32;

        Self {
            offset,
            first_trim,
            last_trim,
            part_count,
            total_bytes: end - start + 1,
            chunk_size,
            file_size,
        }
    }

    /// 第 `index` 个分片（从 0 开始）的起始偏移
    pub fn chunk_offset(&self, index: u32) -> u64 {
        self.offset + index as u64 * self.chunk_size
    }

    /// 第 `index` 个分片的拉取长度；最后一个分片可能被文件末尾截短
    pub fn chunk_len(&self, index: u32) -> u64 {
        let start = self.chunk_offset(index);
        self.chunk_size.min(self.file_size.saturating_sub(start))
    }

    /// 第 `part`（从 1 开始）个分片需要输出的切片 `[from, to)`
    pub fn slice_bounds(&self, part: u32, chunk_len: u64) -> (u64, u64) {
        let from = if part == 1 { self.first_trim } else { 0 };
        let to = if part == self.part_count {
            self.last_trim
        } else {
            chunk_len
        };
        (from, to)
    }
}
