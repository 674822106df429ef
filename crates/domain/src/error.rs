//! Domain error types.

use common::StreamId;
use event_store::EventStoreError;
use thiserror::Error;

use crate::user::UserError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the event store.
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),

    /// The user aggregate refused an event or a command.
    #[error("User error: {0}")]
    User(#[from] UserError),

    /// A creation command produced events that establish no identity.
    #[error("{aggregate_type} creation produced no identity")]
    MissingIdentity { aggregate_type: &'static str },

    /// Every attempt of the load-command-append cycle lost the race.
    #[error("Gave up on stream {stream_id} after {attempts} conflicting appends")]
    RetriesExhausted { stream_id: StreamId, attempts: u32 },
}

impl DomainError {
    /// Returns true if the failure was a lost append race.
    pub fn is_conflict(&self) -> bool {
        match self {
            DomainError::EventStore(e) => e.is_conflict(),
            DomainError::RetriesExhausted { .. } => true,
            _ => false,
        }
    }

    /// Returns the aggregate-level error, if that is what failed.
    pub fn as_user_error(&self) -> Option<&UserError> {
        match self {
            DomainError::User(e) => Some(e),
            _ => None,
        }
    }
}
