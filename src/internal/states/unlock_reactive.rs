//! # UnlockReactiveProperty
//!
//! 轻量级响应式属性容器，读写不阻塞，适合高频更新的计数类状态（如闸门占用数）。
//! 内部直接复用 [`super::reactive_core::ReactiveProperty`]。

pub use super::reactive_core::{PropertyWatcher, ReactivePropertyError as UnlockReactivePropertyError};

pub type UnlockReactiveProperty<T> = super::reactive_core::ReactiveProperty<T>;
