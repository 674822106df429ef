//! User lifecycle states.

use serde::{Deserialize, Serialize};

use super::EventKind;

/// Where a user stands in the registration lifecycle.
///
/// ```text
/// NotCreated ──USER_CREATED──► Registered ──ETHICS_AGREED──► Agreed ──(first photo)──► Completed
///                              ▲        │                    ▲     │
///                              └────────┘                    └─────┘
///                     NAME/EMAIL/PASSWORD/BIRTH_DATE   PHOTO_ADDED/ORIGIN_COUNTRY
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LifecycleState {
    /// No event has been applied yet.
    #[default]
    NotCreated,

    /// The user exists; profile fields can be filled in.
    Registered,

    /// The ethics charter was accepted; photos and origin can be added.
    Agreed,

    /// At least one photo is on file (terminal state).
    Completed,
}

impl LifecycleState {
    /// Event kinds this state declares a transition for.
    pub fn next_events(&self) -> &'static [EventKind] {
        match self {
            LifecycleState::NotCreated => &[EventKind::UserCreated],
            LifecycleState::Registered => &[
                EventKind::NameSet,
                EventKind::EmailSet,
                EventKind::PasswordSet,
                EventKind::BirthDateSet,
                EventKind::EthicsAgreed,
            ],
            LifecycleState::Agreed => &[EventKind::PhotoAdded, EventKind::OriginCountrySet],
            LifecycleState::Completed => &[],
        }
    }

    /// Returns true if an event of `kind` may be applied in this state.
    pub fn accepts(&self, kind: EventKind) -> bool {
        self.next_events().contains(&kind)
    }

    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        self.next_events().is_empty()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::NotCreated => "NotCreated",
            LifecycleState::Registered => "Registered",
            LifecycleState::Agreed => "Agreed",
            LifecycleState::Completed => "Completed",
        }
    }

    pub const ALL: [LifecycleState; 4] = [
        LifecycleState::NotCreated,
        LifecycleState::Registered,
        LifecycleState::Agreed,
        LifecycleState::Completed,
    ];
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
