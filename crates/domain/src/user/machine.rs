//! The user transition table.
//!
//! | State      | Event              | Next state | Context effect          |
//! |------------|--------------------|------------|-------------------------|
//! | NotCreated | USER_CREATED       | Registered | set uuid                |
//! | Registered | NAME_SET           | Registered | set name                |
//! | Registered | EMAIL_SET          | Registered | set email               |
//! | Registered | PASSWORD_SET       | Registered | set hashedPassword      |
//! | Registered | BIRTH_DATE_SET     | Registered | parse and set birthDate |
//! | Registered | ETHICS_AGREED      | Agreed     | none                    |
//! | Agreed     | PHOTO_ADDED        | Agreed     | append photoUrl         |
//! | Agreed     | ORIGIN_COUNTRY_SET | Agreed     | set originCountry       |
//!
//! After every transition [`guard_after_apply`] runs once: an `Agreed` user
//! with at least one photo moves on to `Completed` without consuming an event.

use super::{ContextPatch, LifecycleState, UserContext, UserError, UserEvent};
use crate::validation::decode_date;

/// Outcome of feeding one event to the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: LifecycleState,
    pub patch: ContextPatch,
}

/// Looks up the transition for `event` in `state`.
///
/// Pure: nothing is mutated. Undeclared pairs are refused with
/// [`UserError::ImpossibleEvent`], and a `BIRTH_DATE_SET` whose payload is not
/// a calendar date fails validation.
pub fn transition(state: LifecycleState, event: &UserEvent) -> Result<Transition, UserError> {
    use LifecycleState::{Agreed, NotCreated, Registered};

    let (next, patch) = match (state, event) {
        (NotCreated, UserEvent::UserCreated { uuid }) => {
            (Registered, ContextPatch::Uuid(uuid.clone()))
        }
        (Registered, UserEvent::NameSet { name }) => (Registered, ContextPatch::Name(name.clone())),
        (Registered, UserEvent::EmailSet { email }) => {
            (Registered, ContextPatch::Email(email.clone()))
        }
        (Registered, UserEvent::PasswordSet { hashed_password }) => (
            Registered,
            ContextPatch::HashedPassword(hashed_password.clone()),
        ),
        (Registered, UserEvent::BirthDateSet { birth_date }) => {
            (Registered, ContextPatch::BirthDate(decode_date(birth_date)?))
        }
        (Registered, UserEvent::EthicsAgreed) => (Agreed, ContextPatch::Unchanged),
        (Agreed, UserEvent::PhotoAdded { photo_url }) => {
            (Agreed, ContextPatch::AppendPhoto(photo_url.clone()))
        }
        (Agreed, UserEvent::OriginCountrySet { country }) => {
            (Agreed, ContextPatch::OriginCountry(country.clone()))
        }
        (state, event) => {
            return Err(UserError::ImpossibleEvent {
                event_type: event.kind(),
                state,
            });
        }
    };

    Ok(Transition { next, patch })
}

/// Post-apply hook for the guarded automatic transition.
pub fn guard_after_apply(state: LifecycleState, context: &UserContext) -> LifecycleState {
    match state {
        LifecycleState::Agreed if !context.photo_urls().is_empty() => LifecycleState::Completed,
        other => other,
    }
}
