//! 流式引擎：Range 解析 → 分片计划 → 预取流水线 → 流组装，外加全局会话闸门。

pub mod assembler;
pub mod error;
pub mod gate;
pub mod plan;
pub mod prefetch;
pub mod range;
pub mod session;
pub mod tuning;

pub use assembler::StreamAssembler;
pub use error::StreamError;
pub use gate::{AdmissionToken, ConcurrencyGate, GateStats};
pub use plan::ChunkPlan;
pub use prefetch::{PrefetchPipeline, Prefetched};
pub use range::{ByteRange, resolve_range};
pub use session::StreamSession;
pub use tuning::StreamTuning;
