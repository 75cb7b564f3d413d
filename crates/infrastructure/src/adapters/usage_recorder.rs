//! Channel-backed usage recorder
//!
//! Usage events go onto a bounded queue and a background task applies them
//! to the store. A full queue drops the event; store failures are logged
//! and swallowed.

use std::sync::Arc;

use application::ports::{ConfigStore, UsageEvent, UsageRecorder};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Queue of usage events drained by [`ChannelUsageRecorder::spawn`]'s worker
#[derive(Debug, Clone)]
pub struct ChannelUsageRecorder {
    sender: mpsc::Sender<UsageEvent>,
}

impl ChannelUsageRecorder {
    /// Create the recorder and spawn the worker that drains it
    ///
    /// The worker stops once every recorder clone has been dropped.
    pub fn spawn(store: Arc<dyn ConfigStore>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(run_worker(store, receiver));
        info!(capacity, "Usage recorder started");
        (Self { sender }, handle)
    }
}

impl UsageRecorder for ChannelUsageRecorder {
    fn record(&self, event: UsageEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {},
            Err(TrySendError::Full(event)) => {
                warn!(endpoint_id = %event.endpoint_id, "Usage queue full, dropping event");
            },
            Err(TrySendError::Closed(_)) => {
                warn!("Usage worker stopped, dropping event");
            },
        }
    }
}

async fn run_worker(store: Arc<dyn ConfigStore>, mut receiver: mpsc::Receiver<UsageEvent>) {
    while let Some(event) = receiver.recv().await {
        match store.record_usage(&event).await {
            Ok(()) => debug!(
                access_key_id = %event.access_key_id,
                collection_id = %event.collection_id,
                endpoint_id = %event.endpoint_id,
                "Usage recorded"
            ),
            Err(e) => warn!(error = %e, "Failed to record usage"),
        }
    }
    info!("Usage recorder stopped");
}

/// Recorder that discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardUsageRecorder;

impl UsageRecorder for DiscardUsageRecorder {
    fn record(&self, _event: UsageEvent) {}
}

#[cfg(test)]
mod tests {
    use application::error::ApplicationError;
    use async_trait::async_trait;
    use domain::{
        AccessKey, AccessKeyId, Collection, CollectionId, DirectRouteKey, Endpoint, EndpointId,
    };
    use parking_lot::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingStore {
        events: Mutex<Vec<UsageEvent>>,
        fail: bool,
    }

    #[async_trait]
    impl ConfigStore for RecordingStore {
        async fn find_direct_key(
            &self,
            _key: &str,
        ) -> Result<Option<DirectRouteKey>, ApplicationError> {
            Ok(None)
        }

        async fn find_access_key(&self, _key: &str) -> Result<Option<AccessKey>, ApplicationError> {
            Ok(None)
        }

        async fn find_collection(
            &self,
            _id: CollectionId,
        ) -> Result<Option<Collection>, ApplicationError> {
            Ok(None)
        }

        async fn list_endpoints(
            &self,
            _collection: CollectionId,
        ) -> Result<Vec<Endpoint>, ApplicationError> {
            Ok(Vec::new())
        }

        async fn record_usage(&self, event: &UsageEvent) -> Result<(), ApplicationError> {
            if self.fail {
                return Err(ApplicationError::Internal("disk full".to_string()));
            }
            self.events.lock().push(*event);
            Ok(())
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    fn event(endpoint: i64) -> UsageEvent {
        UsageEvent::now(
            AccessKeyId::new(1),
            CollectionId::new(2),
            EndpointId::new(endpoint),
        )
    }

    #[tokio::test]
    async fn events_reach_the_store() {
        let store = Arc::new(RecordingStore::default());
        let (recorder, worker) = ChannelUsageRecorder::spawn(store.clone(), 16);

        recorder.record(event(1));
        recorder.record(event(2));
        drop(recorder);
        worker.await.unwrap();

        let events = store.events.lock();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].endpoint_id, EndpointId::new(2));
    }

    #[tokio::test]
    async fn full_queue_drops_without_blocking() {
        let store = Arc::new(RecordingStore::default());
        let (sender, receiver) = mpsc::channel(1);
        let recorder = ChannelUsageRecorder { sender };

        recorder.record(event(1));
        recorder.record(event(2));
        drop(recorder);

        run_worker(store.clone(), receiver).await;
        assert_eq!(store.events.lock().len(), 1);
    }

    #[tokio::test]
    async fn store_failures_are_swallowed() {
        let store = Arc::new(RecordingStore {
            fail: true,
            ..RecordingStore::default()
        });
        let (recorder, worker) = ChannelUsageRecorder::spawn(store.clone(), 4);

        recorder.record(event(1));
        drop(recorder);

        assert!(worker.await.is_ok());
        assert!(store.events.lock().is_empty());
    }

    #[test]
    fn discard_recorder_accepts_events() {
        DiscardUsageRecorder.record(event(1));
    }
}
