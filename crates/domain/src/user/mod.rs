//! User aggregate and related types.

mod aggregate;
mod commands;
mod context;
mod events;
pub mod machine;
mod service;
mod state;

pub use aggregate::UserAggregate;
pub use commands::*;
pub use context::{ContextPatch, UserContext};
pub use events::{EventKind, UserEvent};
pub use service::UserService;
pub use state::LifecycleState;

use thiserror::Error;

use crate::validation::ValidationFailure;

/// Errors that can occur during user operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserError {
    /// The event is not declared for the current state. Raised during replay
    /// and when a command would emit an event that cannot be applied.
    #[error("Impossible to play event {event_type} in state {state}")]
    ImpossibleEvent {
        event_type: EventKind,
        state: LifecycleState,
    },

    /// The command is not allowed in the current state.
    #[error("Impossible to {command} in state {state}")]
    Precondition {
        command: &'static str,
        state: LifecycleState,
    },

    /// Raw input failed field validation.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
}
