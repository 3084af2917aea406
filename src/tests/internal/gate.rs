use std::time::Duration;

use crate::internal::streaming::{ConcurrencyGate, GateStats, StreamError};

#[tokio::test]
async fn acquire_and_release_update_stats() {
    let gate = ConcurrencyGate::new(2);
    assert_eq!(gate.capacity(), 2);

    let a = gate.acquire().await.unwrap();
    let b = gate.acquire().await.unwrap();
    assert_eq!(gate.available(), 0);
    assert_eq!(
        gate.stats().get_current().unwrap(),
        GateStats { active: 2, waiting: 0 }
    );

    drop(a);
    assert_eq!(gate.available(), 1);
    drop(b);
    assert_eq!(gate.stats().get_current().unwrap(), GateStats::default());
}

#[tokio::test]
async fn waiters_are_admitted_in_arrival_order() {
    let gate = ConcurrencyGate::new(1);
    let held = gate.acquire().await.unwrap();

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let mut waiters = Vec::new();
    for i in 0..3 {
        let waiter_gate = gate.clone();
        let tx = tx.clone();
        waiters.push(tokio::spawn(async move {
            let token = waiter_gate.acquire().await.unwrap();
            tx.send(i).unwrap();
            tokio::time::sleep(Duration::from_millis(5)).await;
            drop(token);
        }));
        // 保证排队顺序
        let mut watcher = gate.stats().watch();
        watcher.wait_until(|s| s.waiting == i + 1).await.unwrap();
    }
    drop(tx);

    drop(held);
    for w in waiters {
        w.await.unwrap();
    }

    let mut order = Vec::new();
    while let Some(i) = rx.recv().await {
        order.push(i);
    }
    assert_eq!(order, vec![0, 1, 2]);
    assert_eq!(gate.available(), 1);
}

#[tokio::test]
async fn cancelled_wait_is_not_counted() {
    let gate = ConcurrencyGate::new(1);
    let _held = gate.acquire().await.unwrap();

    let result = tokio::time::timeout(Duration::from_millis(10), gate.acquire()).await;
    assert!(result.is_err());
    assert_eq!(
        gate.stats().get_current().unwrap(),
        GateStats { active: 1, waiting: 0 }
    );
}

#[tokio::test]
async fn closed_gate_rejects_waiters_but_keeps_issued_tokens() {
    let gate = ConcurrencyGate::new(1);
    let held = gate.acquire().await.unwrap();

    let waiter = {
        let gate = gate.clone();
        tokio::spawn(async move { gate.acquire().await.map(|_| ()) })
    };
    let mut watcher = gate.stats().watch();
    watcher.wait_until(|s| s.waiting == 1).await.unwrap();

    gate.close();
    assert!(matches!(waiter.await.unwrap(), Err(StreamError::GateClosed)));
    assert!(matches!(gate.acquire().await, Err(StreamError::GateClosed)));

    assert_eq!(gate.stats().get_current().unwrap().active, 1);
    drop(held);
    assert_eq!(gate.stats().get_current().unwrap().active, 0);
}
