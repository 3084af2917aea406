//! 单个响应的流式会话：持有计划、预取缓冲区接收端、生产者任务与闸门名额。
//!
//! 任何退出路径都必须拆除会话：
//! - 正常结束或出错时由组装器调用 [`StreamSession::shutdown`]，abort 生产者并等它真正退出后再归还名额；
//! - 客户端提前断开时响应体被直接 drop，走 `Drop`：abort 生产者，交给回收任务等它退出后归还名额。

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::internal::store::structs::FileHandle;
use crate::internal::store::traits::file_store::ChunkSource;

use super::gate::AdmissionToken;
use super::plan::ChunkPlan;
use super::prefetch::{PrefetchPipeline, Prefetched};
use super::range::ByteRange;
use super::tuning::StreamTuning;

pub struct StreamSession {
    pub file: FileHandle,
    pub range: ByteRange,
    pub plan: ChunkPlan,
    pub(crate) buffer: mpsc::Receiver<Prefetched>,
    producer: Option<JoinHandle<()>>,
    admission: Option<AdmissionToken>,
}

impl StreamSession {
    /// 计算计划并启动预取生产者
    pub fn open<S>(
        source: Arc<S>,
        file: FileHandle,
        range: ByteRange,
        tuning: &StreamTuning,
        admission: Option<AdmissionToken>,
    ) -> Self
    where
        S: ChunkSource + ?Sized + 'static,
    {
        let plan = ChunkPlan::new(range, file.size, tuning.chunk_size);
        let (buffer, producer) = PrefetchPipeline::spawn(source, file.clone(), plan, tuning);

        Self {
            file,
            range,
            plan,
            buffer,
            producer: Some(producer),
            admission,
        }
    }

    /// 生产者是否还没被拆除
    pub fn is_open(&self) -> bool {
        self.producer.is_some()
    }

    /// 拆除会话：abort 生产者、等它退出、归还名额。可重复调用。
    pub async fn shutdown(&mut self) {
        if let Some(producer) = self.producer.take() {
            producer.abort();
            // 被 abort 的任务返回 JoinError::Cancelled，正常退出的返回 Ok，都无需处理
            let _ = producer.await;
        }
        self.buffer.close();
        self.admission.take();
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        let Some(producer) = self.producer.take() else {
            return;
        };
        producer.abort();
        let admission = self.admission.take();

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    let _ = producer.await;
                    drop(admission);
                });
            }
            Err(_) => drop(admission),
        }
        tracing::debug!(file_id = self.file.id, "会话提前拆除");
    }
}
