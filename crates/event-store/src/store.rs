use async_trait::async_trait;

use crate::{EventEnvelope, EventStoreError, Result, StreamId, Version};

/// Core trait for event store implementations.
///
/// A store keeps one ordered, append-only sequence of envelopes per stream.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Returns every event of a stream in version order (oldest first).
    ///
    /// An unknown stream yields an empty list.
    async fn load(&self, stream_id: &StreamId) -> Result<Vec<EventEnvelope>>;

    /// Appends `events` to a stream atomically.
    ///
    /// `expected_version` is the version the caller observed when it loaded
    /// the stream. If the stream has moved on since, nothing is written and
    /// [`EventStoreError::ConcurrencyConflict`] is returned. Envelopes must
    /// carry consecutive versions starting at `expected_version.next()`.
    ///
    /// Returns the new version of the stream.
    async fn append(
        &self,
        stream_id: &StreamId,
        expected_version: Version,
        events: Vec<EventEnvelope>,
    ) -> Result<Version>;

    /// Current version of a stream, or `None` if it has no events.
    async fn stream_version(&self, stream_id: &StreamId) -> Result<Option<Version>>;
}

/// Extension trait providing convenience methods for event stores.
#[async_trait]
pub trait EventStoreExt: EventStore {
    /// Checks if a stream exists (has any events).
    async fn stream_exists(&self, stream_id: &StreamId) -> Result<bool> {
        Ok(self.stream_version(stream_id).await?.is_some())
    }

    /// Returns the events of a stream with a version of at least `from`.
    async fn load_from(&self, stream_id: &StreamId, from: Version) -> Result<Vec<EventEnvelope>> {
        let events = self.load(stream_id).await?;
        Ok(events.into_iter().filter(|e| e.version >= from).collect())
    }
}

// Blanket implementation for all EventStore implementations
impl<T: EventStore + ?Sized> EventStoreExt for T {}

/// Checks the shape of a batch before it is appended.
///
/// The batch must be non-empty, target `stream_id` only, share one aggregate
/// type, and carry consecutive versions starting right after
/// `expected_version`.
pub fn validate_events_for_append(
    stream_id: &StreamId,
    expected_version: Version,
    events: &[EventEnvelope],
) -> Result<()> {
    let Some(first) = events.first() else {
        return Err(EventStoreError::InvalidAppend(
            "cannot append an empty event list".to_string(),
        ));
    };

    let mut version = expected_version;
    for event in events {
        if &event.stream_id != stream_id {
            return Err(EventStoreError::InvalidAppend(format!(
                "event {} targets stream {}, not {}",
                event.event_id, event.stream_id, stream_id
            )));
        }
        if event.aggregate_type != first.aggregate_type {
            return Err(EventStoreError::InvalidAppend(
                "all events must have the same aggregate type".to_string(),
            ));
        }
        version = version.next();
        if event.version != version {
            return Err(EventStoreError::InvalidAppend(format!(
                "event versions must be sequential: expected {}, got {}",
                version, event.version
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(stream_id: &StreamId, version: u64) -> EventEnvelope {
        EventEnvelope::builder()
            .stream_id(stream_id.clone())
            .aggregate_type("User")
            .event_type("NAME_SET")
            .version(Version::new(version))
            .payload_raw(serde_json::json!({"type": "NAME_SET", "name": "tycho"}))
            .build()
            .unwrap()
    }

    #[test]
    fn accepts_consecutive_batch() {
        let stream = StreamId::new("u1");
        let events = vec![envelope(&stream, 3), envelope(&stream, 4)];
        assert!(validate_events_for_append(&stream, Version::new(2), &events).is_ok());
    }

    #[test]
    fn rejects_empty_batch() {
        let stream = StreamId::new("u1");
        let result = validate_events_for_append(&stream, Version::initial(), &[]);
        assert!(matches!(result, Err(EventStoreError::InvalidAppend(_))));
    }

    #[test]
    fn rejects_gap_in_versions() {
        let stream = StreamId::new("u1");
        let events = vec![envelope(&stream, 1), envelope(&stream, 3)];
        let result = validate_events_for_append(&stream, Version::initial(), &events);
        assert!(matches!(result, Err(EventStoreError::InvalidAppend(_))));
    }

    #[test]
    fn rejects_batch_not_following_expected_version() {
        let stream = StreamId::new("u1");
        let events = vec![envelope(&stream, 1)];
        let result = validate_events_for_append(&stream, Version::new(4), &events);
        assert!(matches!(result, Err(EventStoreError::InvalidAppend(_))));
    }

    #[test]
    fn rejects_foreign_stream() {
        let stream = StreamId::new("u1");
        let other = StreamId::new("u2");
        let events = vec![envelope(&other, 1)];
        let result = validate_events_for_append(&stream, Version::initial(), &events);
        assert!(matches!(result, Err(EventStoreError::InvalidAppend(_))));
    }
}
