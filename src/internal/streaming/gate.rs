//! 全局会话闸门：限制同时访问远程仓库的会话数。

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::internal::states::unlock_reactive::UnlockReactiveProperty;

use super::error::StreamError;

/// 闸门占用情况
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateStats {
    /// 持有名额的会话数
    pub active: usize,
    /// 排队等待名额的请求数
    pub waiting: usize,
}

/// 定额计数闸门。名额用完时后来者按 FIFO 排队等待，不会被拒绝。
#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    stats: UnlockReactiveProperty<GateStats>,
}

/// 闸门名额。从元数据解析开始一直持有到响应体发送完毕，drop 即归还。
#[derive(Debug)]
pub struct AdmissionToken {
    _permit: OwnedSemaphorePermit,
    stats: UnlockReactiveProperty<GateStats>,
}

impl Drop for AdmissionToken {
    fn drop(&mut self) {
        self.stats.update_field(|s| s.active -= 1);
    }
}

/// 排队期间被取消（客户端提前断开）也要把 waiting 减回去
struct WaitingGuard<'a>(&'a UnlockReactiveProperty<GateStats>);

impl Drop for WaitingGuard<'_> {
    fn drop(&mut self) {
        self.0.update_field(|s| s.waiting -= 1);
    }
}

impl ConcurrencyGate {
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            stats: UnlockReactiveProperty::new(GateStats::default()),
        }
    }

    /// 申请一个名额，名额不足时排队等待
    pub async fn acquire(&self) -> Result<AdmissionToken, StreamError> {
        self.stats.update_field(|s| s.waiting += 1);
        let waiting = WaitingGuard(&self.stats);

        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| StreamError::GateClosed)?;

        drop(waiting);
        self.stats.update_field(|s| s.active += 1);

        Ok(AdmissionToken {
            _permit: permit,
            stats: self.stats.clone(),
        })
    }

    /// 关闭闸门：排队中的与之后的申请都返回 [`StreamError::GateClosed`]，已发出的名额不受影响
    pub fn close(&self) {
        self.semaphore.close();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 当前空闲名额数
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// 占用情况的响应式句柄，`.watch()` 后可监听变化
    pub fn stats(&self) -> UnlockReactiveProperty<GateStats> {
        self.stats.clone()
    }
}
