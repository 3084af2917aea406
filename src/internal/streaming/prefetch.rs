//! 预取流水线：在消费者之前拉取分片，掩盖单个分片的网络往返延迟。
//!
//! - 每个会话一个生产者任务，从 `plan.offset` 开始按分片大小步进，正好拉取 `part_count` 个分片；
//! - 滚动窗口：最多 `max_parallel_chunks` 个分片拉取同时在途，窗口满时先等最早的那个完成，
//!   按提交顺序交付到缓冲区，保证分片升序；
//! - 缓冲区是容量为 `buffer_capacity` 的有界通道，满了生产者就挂起（背压）；
//! - 正常结束推送 [`Prefetched::End`]，拉取失败推送 [`Prefetched::Failed`] 后退出；
//! - 生产者被 abort 时，窗口里尚未完成的拉取任务随之 abort。

use std::collections::VecDeque;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::internal::store::structs::{FileHandle, StoreError};
use crate::internal::store::traits::file_store::ChunkSource;

use super::plan::ChunkPlan;
use super::tuning::StreamTuning;

/// 缓冲区元素：分片数据，或终止哨兵
#[derive(Debug)]
pub enum Prefetched {
    Chunk(Bytes),
    /// 全部分片已交付
    End,
    /// 生产者拉取失败后退出
    Failed(String),
}

type FetchTask = JoinHandle<Result<Bytes, StoreError>>;

/// 在途拉取窗口；drop 时 abort 所有未完成的拉取
#[derive(Default)]
struct FetchWindow {
    tasks: VecDeque<FetchTask>,
}

impl FetchWindow {
    fn len(&self) -> usize {
        self.tasks.len()
    }

    fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn push(&mut self, task: FetchTask) {
        self.tasks.push_back(task);
    }

    /// 等待最早提交的那个拉取完成。
    ///
    /// 完成之后才从窗口移除：等待期间生产者被 abort，句柄仍在窗口里，由 drop 一并 abort。
    async fn pop_oldest(&mut self) -> Option<Result<Bytes, String>> {
        let result = self.tasks.front_mut()?.await;
        self.tasks.pop_front();
        Some(match result {
            Ok(Ok(chunk)) => Ok(chunk),
            Ok(Err(err)) => Err(err.to_string()),
            Err(join_err) => Err(format!("分片任务失败: {join_err}")),
        })
    }
}

impl Drop for FetchWindow {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// 预取流水线：只负责启动生产者任务，缓冲区接收端与任务句柄交给会话持有
pub struct PrefetchPipeline;

impl PrefetchPipeline {
    /// 启动生产者任务，返回缓冲区接收端与任务句柄
    pub fn spawn<S>(
        source: Arc<S>,
        handle: FileHandle,
        plan: ChunkPlan,
        tuning: &StreamTuning,
    ) -> (mpsc::Receiver<Prefetched>, JoinHandle<()>)
    where
        S: ChunkSource + ?Sized + 'static,
    {
        let (tx, rx) = mpsc::channel(tuning.buffer_capacity.max(1));
        let window = tuning.max_parallel_chunks.max(1);
        let span = tracing::debug_span!("prefetch", file_id = handle.id, parts = plan.part_count);

        let task = tokio::spawn(
            run_producer(source, Arc::new(handle), plan, window, tx).instrument(span),
        );

        (rx, task)
    }
}

async fn run_producer<S>(
    source: Arc<S>,
    handle: Arc<FileHandle>,
    plan: ChunkPlan,
    max_parallel: usize,
    tx: mpsc::Sender<Prefetched>,
) where
    S: ChunkSource + ?Sized + 'static,
{
    let mut window = FetchWindow::default();

    for index in 0..plan.part_count {
        while window.len() >= max_parallel {
            if !deliver(&mut window, &tx).await {
                return;
            }
        }

        let source = Arc::clone(&source);
        let handle = Arc::clone(&handle);
        let offset = plan.chunk_offset(index);
        let len = plan.chunk_len(index);
        window.push(tokio::spawn(async move {
            source.fetch_chunk(&handle, offset, len).await
        }));
    }

    while !window.is_empty() {
        if !deliver(&mut window, &tx).await {
            return;
        }
    }

    let _ = tx.send(Prefetched::End).await;
    tracing::debug!("预取完成");
}

/// 把最早的拉取结果送进缓冲区；返回 false 表示生产者应当退出
async fn deliver(window: &mut FetchWindow, tx: &mpsc::Sender<Prefetched>) -> bool {
    match window.pop_oldest().await {
        Some(Ok(chunk)) => tx.send(Prefetched::Chunk(chunk)).await.is_ok(),
        Some(Err(message)) => {
            tracing::warn!(error = %message, "分片拉取失败，预取中止");
            let _ = tx.send(Prefetched::Failed(message)).await;
            false
        }
        None => false,
    }
}
