//! Event store boundary for the user aggregate.
//!
//! Streams are append-only and ordered. Every append names the version the
//! writer last observed; the store refuses the write with
//! [`EventStoreError::ConcurrencyConflict`] when another writer got there
//! first.

pub mod error;
pub mod event;
pub mod memory;
pub mod store;

pub use common::StreamId;
pub use error::{EventStoreError, Result};
pub use event::{EventEnvelope, EventEnvelopeBuilder, EventId, Version};
pub use memory::InMemoryEventStore;
pub use store::{EventStore, EventStoreExt};
