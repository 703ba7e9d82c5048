//! Periodic refresh of the pharmacy queue.
//!
//! [`QueuePoller::spawn`] fetches once immediately and then on every tick, publishing each
//! result on a `watch` channel. The returned [`QueueHandle`] owns the task: stopping or dropping
//! it aborts the loop, including any fetch in flight, so no snapshot is delivered after the
//! owner has gone away.

use crate::error::ClientResult;
use chrono::{DateTime, Utc};
use hms_core::queue::QueueEntry;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// The latest result of a queue fetch.
#[derive(Debug, Clone, Default)]
pub struct QueueSnapshot {
    pub entries: Arc<Vec<QueueEntry>>,
    pub fetched_at: Option<DateTime<Utc>>,
    /// Message of the most recent failure, cleared by the next success.
    pub last_error: Option<String>,
    /// Completed fetches, successful or not.
    pub refreshes: u64,
}

/// Shortest refresh interval; a zero interval is raised to this.
pub const MIN_INTERVAL: Duration = Duration::from_millis(100);

pub struct QueuePoller;

impl QueuePoller {
    /// Starts polling with `fetch` every `interval`, first fetch immediate.
    ///
    /// Intervals below [`MIN_INTERVAL`] are clamped up to it.
    pub fn spawn<F, Fut>(interval: Duration, mut fetch: F) -> QueueHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ClientResult<Vec<QueueEntry>>> + Send + 'static,
    {
        if interval < MIN_INTERVAL {
            tracing::warn!("queue poll interval {interval:?} too short, using {MIN_INTERVAL:?}");
        }
        let interval = interval.max(MIN_INTERVAL);
        let (tx, rx) = watch::channel(QueueSnapshot::default());
        tracing::info!("pharmacy queue poller started, every {interval:?}");
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let result = fetch().await;
                tx.send_modify(|snapshot| {
                    snapshot.refreshes += 1;
                    match result {
                        Ok(entries) => {
                            tracing::debug!("pharmacy queue refreshed: {} entries", entries.len());
                            snapshot.entries = Arc::new(entries);
                            snapshot.fetched_at = Some(Utc::now());
                            snapshot.last_error = None;
                        }
                        Err(e) => {
                            tracing::error!("error fetching pharmacy queue: {e}");
                            snapshot.last_error = Some(e.to_string());
                        }
                    }
                });
                if tx.is_closed() {
                    break;
                }
            }
            tracing::debug!("pharmacy queue poller exiting: no subscribers");
        });
        QueueHandle { task, rx }
    }
}

/// Owner of a running poller.
#[derive(Debug)]
pub struct QueueHandle {
    task: JoinHandle<()>,
    rx: watch::Receiver<QueueSnapshot>,
}

impl QueueHandle {
    pub fn subscribe(&self) -> watch::Receiver<QueueSnapshot> {
        self.rx.clone()
    }

    pub fn latest(&self) -> QueueSnapshot {
        self.rx.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Aborts the loop and waits for it to wind down.
    pub async fn stop(mut self) {
        self.task.abort();
        // Cancellation is the expected outcome here.
        let _ = (&mut self.task).await;
        tracing::info!("pharmacy queue poller stopped");
    }
}

impl Drop for QueueHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, ClientError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn entry(id: u64) -> QueueEntry {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "prescriptionNumber": format!("RX-{id}"),
            "patientName": "John Doe",
            "patientId": "P001",
            "priority": "NORMAL",
            "status": "PENDING",
            "prescribedDate": "2025-10-22T14:30:00"
        }))
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_immediately_then_on_interval() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let handle = QueuePoller::spawn(Duration::from_secs(30), move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) as u64;
            async move { Ok::<_, ClientError>(vec![entry(n + 1)]) }
        });
        let mut rx = handle.subscribe();

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().refreshes, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(30)).await;
        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.refreshes, 2);
        assert_eq!(snapshot.entries[0].id, 2);
        assert!(snapshot.last_error.is_none());

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_previous_entries() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let handle = QueuePoller::spawn(Duration::from_secs(5), move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Ok(vec![entry(1)])
                } else {
                    Err(ClientError::Api(ApiError::network()))
                }
            }
        });
        let mut rx = handle.subscribe();
        rx.changed().await.unwrap();
        rx.borrow_and_update();

        tokio::time::advance(Duration::from_secs(5)).await;
        rx.changed().await.unwrap();
        let snapshot = handle.latest();
        assert_eq!(snapshot.entries.len(), 1);
        assert_eq!(
            snapshot.last_error.as_deref(),
            Some("Network error. Please check your connection.")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_clamped() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let handle = QueuePoller::spawn(Duration::ZERO, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, ClientError>(vec![entry(1)]) }
        });
        let mut rx = handle.subscribe();
        rx.changed().await.unwrap();
        rx.borrow_and_update();
        assert!(handle.is_running());

        tokio::time::advance(MIN_INTERVAL).await;
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().refreshes, 2);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_polling() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let handle = QueuePoller::spawn(Duration::from_secs(1), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, ClientError>(Vec::new()) }
        });
        let mut rx = handle.subscribe();
        rx.changed().await.unwrap();
        drop(handle);

        let before = calls.load(Ordering::SeqCst);
        tokio::time::advance(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;
        assert_eq!(calls.load(Ordering::SeqCst), before);
    }
}
