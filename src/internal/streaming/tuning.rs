use std::time::Duration;

/// 分片大小：4MB
pub const CHUNK_SIZE: u64 = 4 * 1024 * 1024;
/// 预取缓冲区容量（分片数）
pub const PREFETCH_BUFFER_CAPACITY: usize = 50;
/// 同时在途的分片拉取数上限
pub const MAX_PARALLEL_CHUNKS: usize = 10;
/// 单次从缓冲区取分片的等待上限
pub const PULL_TIMEOUT: Duration = Duration::from_secs(15);
/// 连续取分片超时的次数上限，超过即判定上游失败
pub const MAX_PULL_TIMEOUTS: u32 = 4;
/// 元数据解析超时
pub const METADATA_TIMEOUT: Duration = Duration::from_secs(10);
/// 全局同时活跃的会话数上限
pub const MAX_CONCURRENT_SESSIONS: usize = 100;

/// 流式引擎参数，启动时确定，之后只读
#[derive(Debug, Clone)]
pub struct StreamTuning {
    pub chunk_size: u64,
    pub buffer_capacity: usize,
    pub max_parallel_chunks: usize,
    pub pull_timeout: Duration,
    pub max_pull_timeouts: u32,
    pub metadata_timeout: Duration,
    pub max_sessions: usize,
}

impl Default for StreamTuning {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            buffer_capacity: PREFETCH_BUFFER_CAPACITY,
            max_parallel_chunks: MAX_PARALLEL_CHUNKS,
            pull_timeout: PULL_TIMEOUT,
            max_pull_timeouts: MAX_PULL_TIMEOUTS,
            metadata_timeout: METADATA_TIMEOUT,
            max_sessions: MAX_CONCURRENT_SESSIONS,
        }
    }
}
