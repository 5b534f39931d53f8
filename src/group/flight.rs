//! Single Flight Module
//!
//! Coalesces concurrent calls for the same key into one execution.
//!
//! The first caller for a key becomes the leader and runs the work. Callers
//! arriving while it runs wait on a watch channel and receive a clone of the
//! leader's result. If the leader is dropped before finishing, its slot is
//! released and the waiters race to become the next leader.

use std::collections::HashMap;
use std::future::Future;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::debug;

enum Role<T> {
    Leader(watch::Sender<Option<T>>),
    Follower(watch::Receiver<Option<T>>),
}

// == Flight ==
/// Table of calls currently in progress, keyed by string.
pub struct Flight<T> {
    calls: Mutex<HashMap<String, watch::Receiver<Option<T>>>>,
}

impl<T: Clone> Flight<T> {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    // == Run ==
    /// Runs `work` for `key` unless a call for `key` is already in flight,
    /// in which case the in-flight call's result is returned instead.
    pub async fn run<F, Fut>(&self, key: &str, work: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        loop {
            match self.join(key) {
                Role::Leader(tx) => {
                    let _slot = Slot { flight: self, key };
                    let value = work().await;
                    tx.send_replace(Some(value.clone()));
                    return value;
                }
                Role::Follower(mut rx) => {
                    debug!("Joining in-flight call for {}", key);
                    if let Ok(done) = rx.wait_for(Option::is_some).await {
                        if let Some(value) = &*done {
                            return value.clone();
                        }
                    }
                    debug!("In-flight call for {} abandoned, retrying", key);
                }
            }
        }
    }

    /// Number of keys with a call in progress.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }

    fn join(&self, key: &str) -> Role<T> {
        let mut calls = self.calls.lock();
        if let Some(rx) = calls.get(key) {
            return Role::Follower(rx.clone());
        }
        let (tx, rx) = watch::channel(None);
        calls.insert(key.to_string(), rx);
        Role::Leader(tx)
    }
}

impl<T: Clone> Default for Flight<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Releases the leader's table entry when the call ends or is cancelled.
struct Slot<'a, T> {
    flight: &'a Flight<T>,
    key: &'a str,
}

impl<T> Drop for Slot<'_, T> {
    fn drop(&mut self) {
        self.flight.calls.lock().remove(self.key);
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_flight_single_call() {
        let flight = Flight::new();
        let value = flight.run("k", || async { 42 }).await;
        assert_eq!(value, 42);
        assert_eq!(flight.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_flight_coalesces_concurrent_calls() {
        let flight = Arc::new(Flight::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let flight = Arc::clone(&flight);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                flight
                    .run("k", move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        "v".to_string()
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), "v");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(flight.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_flight_distinct_keys_run_separately() {
        let flight = Flight::new();
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        let (a, b) = tokio::join!(
            flight.run("a", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                1
            }),
            flight.run("b", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                2
            })
        );

        assert_eq!((a, b), (1, 2));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_flight_cancelled_leader_hands_over() {
        let flight = Arc::new(Flight::new());

        let leader = {
            let flight = Arc::clone(&flight);
            tokio::spawn(async move {
                flight
                    .run("k", || async {
                        tokio::time::sleep(Duration::from_secs(60)).await;
                        0
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(flight.in_flight(), 1);

        let follower = {
            let flight = Arc::clone(&flight);
            tokio::spawn(async move { flight.run("k", || async { 7 }).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        leader.abort();

        assert_eq!(follower.await.unwrap(), 7);
        assert_eq!(flight.in_flight(), 0);
    }
}
