//! 流式引擎：预取 + 组装 + 会话拆除。
//!
//! 测试项：
//! - 整个文件 / 中间区间 / 单字节的输出与原内容逐字节一致
//! - 预取窗口与在途拉取数上限
//! - 拉取失败、分片截短、连续超时都以错误结束流
//! - 正常结束与客户端断开后闸门名额都会归还，在途拉取被取消

use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;

use crate::internal::streaming::{
    ByteRange, ConcurrencyGate, StreamAssembler, StreamError, StreamSession, StreamTuning,
};
use crate::tests::{FetchBehavior, MemoryStore, pattern_bytes, small_tuning, video_handle};

/// 跑完整条流，返回输出字节与最后的错误（如果有）
async fn drain(
    store: Arc<MemoryStore>,
    size: u64,
    range: ByteRange,
    tuning: &StreamTuning,
    gate: Option<&ConcurrencyGate>,
) -> (Vec<u8>, Option<StreamError>) {
    let token = match gate {
        Some(gate) => Some(gate.acquire().await.unwrap()),
        None => None,
    };
    let session = StreamSession::open(store, video_handle(1, size, "c"), range, tuning, token);
    let mut stream = pin!(StreamAssembler::new(session, tuning).into_stream());

    let mut out = Vec::new();
    while let Some(item) = stream.next().await {
        match item {
            Ok(part) => out.extend_from_slice(&part),
            Err(err) => return (out, Some(err)),
        }
    }
    (out, None)
}

fn store_with(content: &Bytes) -> MemoryStore {
    MemoryStore::new().with_file(video_handle(1, content.len() as u64, "c"), content.clone())
}

#[tokio::test]
async fn whole_file_is_reproduced() {
    let content = pattern_bytes(10_000);
    let store = store_with(&content).shared();
    let tuning = small_tuning(64);

    let (out, err) = drain(store, 10_000, ByteRange { start: 0, end: 9_999 }, &tuning, None).await;
    assert!(err.is_none(), "{err:?}");
    assert_eq!(out, &content[..]);
}

#[tokio::test]
async fn middle_range_is_reproduced() {
    let content = pattern_bytes(10_000);
    let store = store_with(&content).shared();
    let tuning = small_tuning(64);

    let (out, err) = drain(store.clone(), 10_000, ByteRange { start: 100, end: 5_000 }, &tuning, None).await;
    assert!(err.is_none(), "{err:?}");
    assert_eq!(out, &content[100..=5_000]);
    // 64 对齐：从 64 开始，到 5000 所在分片结束
    assert_eq!(store.fetches.load(Ordering::SeqCst), (5_000 / 64 - 1 + 1) as usize);
}

#[tokio::test]
async fn single_byte_range() {
    let content = pattern_bytes(300);
    let store = store_with(&content).shared();
    let tuning = small_tuning(64);

    let (out, err) = drain(store, 300, ByteRange { start: 128, end: 128 }, &tuning, None).await;
    assert!(err.is_none());
    assert_eq!(out, vec![content[128]]);
}

#[tokio::test(start_paused = true)]
async fn in_flight_fetches_stay_within_window() {
    let content = pattern_bytes(64 * 40);
    let store = store_with(&content)
        .with_fetch_delay(Duration::from_millis(5))
        .shared();
    let tuning = StreamTuning {
        max_parallel_chunks: 3,
        buffer_capacity: 2,
        ..small_tuning(64)
    };

    let (out, err) = drain(
        store.clone(),
        content.len() as u64,
        ByteRange { start: 0, end: content.len() as u64 - 1 },
        &tuning,
        None,
    )
    .await;
    assert!(err.is_none());
    assert_eq!(out, &content[..]);

    let peak = store.max_in_flight.load(Ordering::SeqCst);
    assert!(peak <= 3, "在途拉取峰值 {peak} 超过窗口");
    assert!(peak >= 2, "窗口没有并行起来: {peak}");
}

#[tokio::test]
async fn failed_fetch_ends_stream_with_error() {
    let content = pattern_bytes(64 * 6);
    let store = store_with(&content)
        .with_behavior(FetchBehavior::FailAt(64 * 3))
        .shared();
    let tuning = small_tuning(64);

    let (out, err) = drain(store, 64 * 6, ByteRange { start: 0, end: 64 * 6 - 1 }, &tuning, None).await;
    assert!(matches!(err, Some(StreamError::UpstreamFailure(_))), "{err:?}");
    // 失败分片之前的都已按序输出
    assert_eq!(out, &content[..64 * 3]);
}

#[tokio::test]
async fn short_chunk_truncates_stream() {
    let content = pattern_bytes(64 * 4);
    let store = store_with(&content)
        .with_behavior(FetchBehavior::ShortAt(64))
        .shared();
    let tuning = small_tuning(64);

    let (out, err) = drain(store, 64 * 4, ByteRange { start: 0, end: 64 * 4 - 1 }, &tuning, None).await;
    match err {
        Some(StreamError::StreamTruncated { expected, received }) => {
            assert_eq!(expected, 4);
            assert_eq!(received, 1);
        }
        other => panic!("应当截断，实际 {other:?}"),
    }
    assert_eq!(out.len(), 64);
}

#[tokio::test]
async fn declared_size_larger_than_content_truncates() {
    let content = pattern_bytes(100);
    // 仓库声明 200 字节，实际只有 100
    let store = MemoryStore::new()
        .with_file(video_handle(1, 200, "c"), content.clone())
        .shared();
    let tuning = small_tuning(64);

    let (out, err) = drain(store, 200, ByteRange { start: 0, end: 199 }, &tuning, None).await;
    assert!(matches!(err, Some(StreamError::StreamTruncated { .. })), "{err:?}");
    assert_eq!(out, &content[..64]);
}

#[tokio::test(start_paused = true)]
async fn repeated_pull_timeouts_fail_the_stream() {
    let content = pattern_bytes(64 * 4);
    let store = store_with(&content)
        .with_behavior(FetchBehavior::StallAt(64))
        .shared();
    let tuning = StreamTuning {
        pull_timeout: Duration::from_secs(1),
        max_pull_timeouts: 3,
        ..small_tuning(64)
    };
    let gate = ConcurrencyGate::new(1);

    let started = tokio::time::Instant::now();
    let (out, err) = drain(
        store.clone(),
        64 * 4,
        ByteRange { start: 0, end: 64 * 4 - 1 },
        &tuning,
        Some(&gate),
    )
    .await;

    assert!(matches!(err, Some(StreamError::UpstreamFailure(_))), "{err:?}");
    assert_eq!(out, &content[..64]);
    assert!(started.elapsed() >= Duration::from_secs(3));

    // 会话已拆除：名额归还，卡住的拉取被取消
    assert_eq!(gate.available(), 1);
    for _ in 0..100 {
        if store.in_flight() == 0 {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(store.in_flight(), 0);
}

#[tokio::test]
async fn completed_stream_returns_admission() {
    let content = pattern_bytes(1_000);
    let store = store_with(&content).shared();
    let tuning = small_tuning(64);
    let gate = ConcurrencyGate::new(2);

    let (out, err) = drain(store, 1_000, ByteRange { start: 0, end: 999 }, &tuning, Some(&gate)).await;
    assert!(err.is_none());
    assert_eq!(out.len(), 1_000);
    assert_eq!(gate.available(), 2);
    assert_eq!(gate.stats().get_current().unwrap().active, 0);
}

#[tokio::test]
async fn dropping_stream_cancels_producer_and_returns_admission() {
    let content = pattern_bytes(64 * 50);
    let store = store_with(&content)
        .with_fetch_delay(Duration::from_millis(20))
        .shared();
    let tuning = small_tuning(64);
    let gate = ConcurrencyGate::new(1);

    let token = gate.acquire().await.unwrap();
    let session = StreamSession::open(
        store.clone(),
        video_handle(1, content.len() as u64, "c"),
        ByteRange { start: 0, end: content.len() as u64 - 1 },
        &tuning,
        Some(token),
    );
    assert!(session.is_open());

    let mut stream = Box::pin(StreamAssembler::new(session, &tuning).into_stream());
    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first, content.slice(0..64));
    assert_eq!(gate.available(), 0);

    // 客户端断开
    drop(stream);

    let mut watcher = gate.stats().watch();
    tokio::time::timeout(Duration::from_secs(5), watcher.wait_until(|s| s.active == 0))
        .await
        .expect("名额没有归还")
        .unwrap();
    assert_eq!(gate.available(), 1);

    tokio::time::timeout(Duration::from_secs(5), async {
        while store.in_flight() > 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("在途拉取没有被取消");
    assert!(store.fetches.load(Ordering::SeqCst) < 50);
}

#[tokio::test(start_paused = true)]
async fn disconnect_cancels_stalled_fetch() {
    let content = pattern_bytes(64 * 4);
    let store = store_with(&content)
        .with_behavior(FetchBehavior::StallAt(64))
        .shared();
    let tuning = small_tuning(64);
    let gate = ConcurrencyGate::new(1);

    let token = gate.acquire().await.unwrap();
    let session = StreamSession::open(
        store.clone(),
        video_handle(1, content.len() as u64, "c"),
        ByteRange { start: 0, end: content.len() as u64 - 1 },
        &tuning,
        Some(token),
    );
    let mut stream = Box::pin(StreamAssembler::new(session, &tuning).into_stream());
    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first, content.slice(0..64));

    // 其余分片都已完成，只剩卡住的那个在途，生产者正等着它
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(store.in_flight(), 1);

    drop(stream);
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(gate.available(), 1);
    assert_eq!(store.in_flight(), 0);
}

#[tokio::test(start_paused = true)]
async fn stalled_consumer_bounds_buffer_and_fetches() {
    let content = pattern_bytes(64 * 40);
    let store = store_with(&content).shared();
    let tuning = StreamTuning {
        max_parallel_chunks: 3,
        buffer_capacity: 2,
        ..small_tuning(64)
    };

    let mut session = StreamSession::open(
        store.clone(),
        video_handle(1, content.len() as u64, "c"),
        ByteRange { start: 0, end: content.len() as u64 - 1 },
        &tuning,
        None,
    );

    // 不消费，让生产者跑到背压为止
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(session.buffer.len() <= 2);
    // 缓冲区 + 手上待送的一个 + 窗口
    let fetched = store.fetches.load(Ordering::SeqCst);
    assert!(fetched <= 2 + 1 + 3, "背压失效，已拉取 {fetched} 个分片");

    session.shutdown().await;
    assert!(!session.is_open());
}
