//! Core aggregate and domain event traits.

use common::StreamId;
use serde::{Serialize, de::DeserializeOwned};

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and should be named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Returns the event type name.
    ///
    /// Stored alongside the payload so envelopes can be filtered without
    /// deserializing them.
    fn event_type(&self) -> &'static str;
}

/// Trait for aggregates in an event-sourced system.
///
/// An aggregate is rebuilt by replaying its stream from [`Default`] and gates
/// which new events may be produced next. Command methods live on the
/// concrete type and return events instead of mutating the aggregate.
pub trait Aggregate: Default + Clone + Send + Sync + Sized {
    /// The type of events this aggregate produces and consumes.
    type Event: DomainEvent;

    /// The type of errors this aggregate can produce.
    type Error: std::error::Error + Send + Sync;

    /// Returns the aggregate type name stored on every envelope.
    fn aggregate_type() -> &'static str;

    /// Returns the stream this aggregate lives in.
    ///
    /// Returns None until the creation event has been applied.
    fn id(&self) -> Option<StreamId>;

    /// Applies one event.
    ///
    /// Must be deterministic. An event that is not legal in the current state
    /// is refused and leaves the aggregate untouched.
    fn apply(&mut self, event: Self::Event) -> Result<(), Self::Error>;

    /// Applies multiple events in sequence, stopping at the first refusal.
    fn apply_events(
        &mut self,
        events: impl IntoIterator<Item = Self::Event>,
    ) -> Result<(), Self::Error> {
        for event in events {
            self.apply(event)?;
        }
        Ok(())
    }

    /// Rebuilds an aggregate from the beginning of its stream.
    fn replay(events: impl IntoIterator<Item = Self::Event>) -> Result<Self, Self::Error> {
        let mut aggregate = Self::default();
        aggregate.apply_events(events)?;
        Ok(aggregate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    enum TestEvent {
        Opened { id: String },
        Counted { by: i32 },
    }

    impl DomainEvent for TestEvent {
        fn event_type(&self) -> &'static str {
            match self {
                TestEvent::Opened { .. } => "TestOpened",
                TestEvent::Counted { .. } => "TestCounted",
            }
        }
    }

    #[derive(Debug, Default, Clone)]
    struct Counter {
        id: Option<StreamId>,
        total: i32,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("counter is not open")]
    struct NotOpen;

    impl Aggregate for Counter {
        type Event = TestEvent;
        type Error = NotOpen;

        fn aggregate_type() -> &'static str {
            "Counter"
        }

        fn id(&self) -> Option<StreamId> {
            self.id.clone()
        }

        fn apply(&mut self, event: Self::Event) -> Result<(), Self::Error> {
            match event {
                TestEvent::Opened { id } => self.id = Some(StreamId::new(id)),
                TestEvent::Counted { by } => {
                    if self.id.is_none() {
                        return Err(NotOpen);
                    }
                    self.total += by;
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_replay_applies_in_order() {
        let counter = Counter::replay(vec![
            TestEvent::Opened {
                id: "c1".to_string(),
            },
            TestEvent::Counted { by: 2 },
            TestEvent::Counted { by: 40 },
        ])
        .unwrap();

        assert_eq!(counter.id(), Some(StreamId::new("c1")));
        assert_eq!(counter.total, 42);
    }

    #[test]
    fn test_replay_stops_at_first_refusal() {
        let result = Counter::replay(vec![TestEvent::Counted { by: 1 }]);
        assert!(result.is_err());
    }

    #[test]
    fn test_domain_event_type() {
        let event = TestEvent::Counted { by: 1 };
        assert_eq!(event.event_type(), "TestCounted");
    }
}
