//! # ReactiveProperty — 响应式属性内核
//!
//! 基于 [`tokio::sync::watch`]：写入不阻塞，所有监听者都能拿到最新值。
//! 引擎用它对外发布会话闸门的占用情况。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::sync::watch;
use tokio::sync::watch::error::RecvError;

// ──────────────────────────── Error ────────────────────────────

#[derive(Debug, Error)]
pub enum ReactivePropertyError {
    #[error("监听器已被销毁")]
    WatcherClosed,

    #[error("接收失败: {0}")]
    RecvError(#[from] RecvError),
}

// ──────────────────────────── Inner ────────────────────────────

#[derive(Debug)]
pub(crate) struct Inner<T> {
    pub(crate) sender: watch::Sender<Option<T>>,
    pub(crate) is_dropped: AtomicBool,
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        self.is_dropped.store(true, Ordering::Relaxed);
        let _ = self.sender.send(None);
    }
}

// ──────────────────────────── ReactiveProperty ────────────────────────────

/// 响应式属性内核：new / update / update_field / get_current / watch。
#[derive(Clone, Debug)]
pub struct ReactiveProperty<T: Clone + Send + Sync> {
    pub(crate) inner: Arc<Inner<T>>,
}

impl<T> ReactiveProperty<T>
where
    T: Clone + Send + Sync,
{
    pub fn new(value: T) -> Self {
        let (sender, _) = watch::channel(Some(value));
        Self {
            inner: Arc::new(Inner {
                sender,
                is_dropped: AtomicBool::new(false),
            }),
        }
    }

    /// 覆盖写入，所有监听者都会收到通知。
    pub fn update(&self, new_value: T) {
        if self.inner.is_dropped.load(Ordering::Relaxed) {
            return;
        }
        self.inner.sender.send_replace(Some(new_value));
    }

    /// 原地修改；读改写在 watch 内部锁里完成，多个写者并发时不会丢更新。
    pub fn update_field<F>(&self, updater: F)
    where
        F: FnOnce(&mut T),
    {
        if self.inner.is_dropped.load(Ordering::Relaxed) {
            return;
        }
        self.inner.sender.send_modify(|current| {
            if let Some(value) = current.as_mut() {
                updater(value);
            }
        });
    }

    /// 当前值的快照（会 clone）。
    pub fn get_current(&self) -> Option<T> {
        self.inner.sender.borrow().as_ref().cloned()
    }

    /// 创建一个监听器，用于异步监听属性值的变化。
    pub fn watch(&self) -> PropertyWatcher<T> {
        PropertyWatcher {
            receiver: self.inner.sender.subscribe(),
            inner: Arc::clone(&self.inner),
        }
    }
}

// ──────────────────────────── PropertyWatcher ────────────────────────────

/// 属性监听器，用于异步接收属性值的变化。
pub struct PropertyWatcher<T> {
    receiver: watch::Receiver<Option<T>>,
    #[allow(dead_code)]
    inner: Arc<Inner<T>>,
}

impl<T> PropertyWatcher<T>
where
    T: Clone + Send + Sync,
{
    /// 异步等待属性值的变化，返回新值。
    pub async fn changed(&mut self) -> Result<T, ReactivePropertyError> {
        self.receiver.changed().await?;
        match self.receiver.borrow().as_ref() {
            None => Err(ReactivePropertyError::WatcherClosed),
            Some(value) => Ok(value.clone()),
        }
    }

    /// 等到值满足条件为止，返回满足条件的那个值。
    pub async fn wait_until<F>(&mut self, mut condition: F) -> Result<T, ReactivePropertyError>
    where
        F: FnMut(&T) -> bool,
    {
        let value = self
            .receiver
            .wait_for(|v| v.as_ref().map(&mut condition).unwrap_or(true))
            .await?;
        let value: Option<T> = (*value).clone();
        value.ok_or(ReactivePropertyError::WatcherClosed)
    }

    /// 同步获取当前值的克隆。
    pub fn borrow(&self) -> Option<T> {
        self.receiver.borrow().clone()
    }
}
