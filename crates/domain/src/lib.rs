//! Domain layer for the user registration system.
//!
//! This crate provides the core domain abstractions including:
//! - Aggregate trait for event-sourced entities
//! - DomainEvent trait for domain events
//! - Command trait and CommandHandler for command processing
//! - User aggregate implementation with its lifecycle state machine

pub mod aggregate;
pub mod command;
pub mod error;
pub mod user;
pub mod validation;

pub use aggregate::{Aggregate, DomainEvent};
pub use command::{Command, CommandHandler, CommandResult, Loaded, RetryPolicy};
pub use error::DomainError;
pub use user::{
    AddPhoto, AgreeEthics, ContextPatch, EventKind, LifecycleState, SetBirthDate, SetEmail,
    SetName, SetOriginCountry, SetPassword, UserAggregate, UserContext, UserError, UserEvent,
    UserService,
};
pub use validation::{
    EmailShape, Field, FieldRule, FieldRules, NonBlank, PassThrough, ValidationFailure, decode_date,
};
