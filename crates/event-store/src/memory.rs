use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    EventEnvelope, EventStoreError, Result, StreamId, Version,
    store::{EventStore, validate_events_for_append},
};

/// In-memory event store.
///
/// Clones share the same underlying streams, so one store can be handed to
/// several concurrent writers. Appends hold the write lock across the version
/// check and the write, which makes them atomic.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    streams: Arc<RwLock<HashMap<StreamId, Vec<EventEnvelope>>>>,
}

impl InMemoryEventStore {
    /// Creates a new empty in-memory event store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of events stored across all streams.
    pub async fn event_count(&self) -> usize {
        self.streams.read().await.values().map(Vec::len).sum()
    }

    /// Returns the number of non-empty streams.
    pub async fn stream_count(&self) -> usize {
        self.streams.read().await.len()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn load(&self, stream_id: &StreamId) -> Result<Vec<EventEnvelope>> {
        let streams = self.streams.read().await;
        Ok(streams.get(stream_id).cloned().unwrap_or_default())
    }

    async fn append(
        &self,
        stream_id: &StreamId,
        expected_version: Version,
        events: Vec<EventEnvelope>,
    ) -> Result<Version> {
        let mut streams = self.streams.write().await;

        let current_version = streams
            .get(stream_id)
            .map(|stream| Version::from_len(stream.len()))
            .unwrap_or_default();

        if current_version != expected_version {
            tracing::debug!(
                %stream_id,
                %expected_version,
                %current_version,
                "rejecting append on stale version"
            );
            return Err(EventStoreError::ConcurrencyConflict {
                stream_id: stream_id.clone(),
                expected: expected_version,
                actual: current_version,
            });
        }

        validate_events_for_append(stream_id, expected_version, &events)?;

        let stream = streams.entry(stream_id.clone()).or_default();
        stream.extend(events);
        let new_version = Version::from_len(stream.len());

        tracing::debug!(%stream_id, %new_version, "appended events");
        Ok(new_version)
    }

    async fn stream_version(&self, stream_id: &StreamId) -> Result<Option<Version>> {
        let streams = self.streams.read().await;
        Ok(streams
            .get(stream_id)
            .filter(|stream| !stream.is_empty())
            .map(|stream| Version::from_len(stream.len())))
    }
}
