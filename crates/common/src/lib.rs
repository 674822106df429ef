//! Shared identifier types for the user event-sourcing workspace.

mod ids;
mod types;

pub use ids::{IdGenerator, SequentialIdGenerator, UuidGenerator};
pub use types::StreamId;
