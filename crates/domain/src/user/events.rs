//! User domain events.

use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

/// Facts recorded on a user stream.
///
/// Serialized as internally tagged JSON, e.g.
/// `{"type":"PHOTO_ADDED","photoUrl":"s3://photo"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum UserEvent {
    /// The user was registered under a fresh identity.
    UserCreated { uuid: String },

    NameSet { name: String },

    EmailSet { email: String },

    PasswordSet { hashed_password: String },

    /// Carries the raw input; it is parsed when the event is applied.
    BirthDateSet { birth_date: String },

    /// The user accepted the ethics charter.
    EthicsAgreed,

    OriginCountrySet { country: String },

    PhotoAdded { photo_url: String },
}

impl UserEvent {
    /// Returns the payload-free tag of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            UserEvent::UserCreated { .. } => EventKind::UserCreated,
            UserEvent::NameSet { .. } => EventKind::NameSet,
            UserEvent::EmailSet { .. } => EventKind::EmailSet,
            UserEvent::PasswordSet { .. } => EventKind::PasswordSet,
            UserEvent::BirthDateSet { .. } => EventKind::BirthDateSet,
            UserEvent::EthicsAgreed => EventKind::EthicsAgreed,
            UserEvent::OriginCountrySet { .. } => EventKind::OriginCountrySet,
            UserEvent::PhotoAdded { .. } => EventKind::PhotoAdded,
        }
    }

    pub fn user_created(uuid: impl Into<String>) -> Self {
        UserEvent::UserCreated { uuid: uuid.into() }
    }

    pub fn name_set(name: impl Into<String>) -> Self {
        UserEvent::NameSet { name: name.into() }
    }

    pub fn email_set(email: impl Into<String>) -> Self {
        UserEvent::EmailSet {
            email: email.into(),
        }
    }

    pub fn password_set(hashed_password: impl Into<String>) -> Self {
        UserEvent::PasswordSet {
            hashed_password: hashed_password.into(),
        }
    }

    pub fn birth_date_set(birth_date: impl Into<String>) -> Self {
        UserEvent::BirthDateSet {
            birth_date: birth_date.into(),
        }
    }

    pub fn origin_country_set(country: impl Into<String>) -> Self {
        UserEvent::OriginCountrySet {
            country: country.into(),
        }
    }

    pub fn photo_added(photo_url: impl Into<String>) -> Self {
        UserEvent::PhotoAdded {
            photo_url: photo_url.into(),
        }
    }
}

impl DomainEvent for UserEvent {
    fn event_type(&self) -> &'static str {
        self.kind().as_str()
    }
}

/// Tag of a [`UserEvent`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    UserCreated,
    NameSet,
    EmailSet,
    PasswordSet,
    BirthDateSet,
    EthicsAgreed,
    OriginCountrySet,
    PhotoAdded,
}

impl EventKind {
    /// Every event kind, in declaration order.
    pub const ALL: [EventKind; 8] = [
        EventKind::UserCreated,
        EventKind::NameSet,
        EventKind::EmailSet,
        EventKind::PasswordSet,
        EventKind::BirthDateSet,
        EventKind::EthicsAgreed,
        EventKind::OriginCountrySet,
        EventKind::PhotoAdded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::UserCreated => "USER_CREATED",
            EventKind::NameSet => "NAME_SET",
            EventKind::EmailSet => "EMAIL_SET",
            EventKind::PasswordSet => "PASSWORD_SET",
            EventKind::BirthDateSet => "BIRTH_DATE_SET",
            EventKind::EthicsAgreed => "ETHICS_AGREED",
            EventKind::OriginCountrySet => "ORIGIN_COUNTRY_SET",
            EventKind::PhotoAdded => "PHOTO_ADDED",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_format_uses_screaming_tags_and_camel_case_fields() {
        let event = UserEvent::photo_added("s3://photo");
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"type": "PHOTO_ADDED", "photoUrl": "s3://photo"})
        );

        let event = UserEvent::password_set("$argon2id$abc");
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"type": "PASSWORD_SET", "hashedPassword": "$argon2id$abc"})
        );

        assert_eq!(
            serde_json::to_value(UserEvent::EthicsAgreed).unwrap(),
            json!({"type": "ETHICS_AGREED"})
        );
    }

    #[test]
    fn reads_events_written_by_other_producers() {
        let event: UserEvent =
            serde_json::from_value(json!({"type": "BIRTH_DATE_SET", "birthDate": "1990-04-12"}))
                .unwrap();
        assert_eq!(event, UserEvent::birth_date_set("1990-04-12"));
    }

    #[test]
    fn event_type_matches_serialized_tag() {
        let events = vec![
            UserEvent::user_created("u1"),
            UserEvent::name_set("tycho"),
            UserEvent::email_set("tycho@toto.tech"),
            UserEvent::password_set("hash"),
            UserEvent::birth_date_set("1990-04-12"),
            UserEvent::EthicsAgreed,
            UserEvent::origin_country_set("france"),
            UserEvent::photo_added("s3://photo"),
        ];

        for event in events {
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["type"], event.event_type());
        }
    }

    #[test]
    fn kind_serializes_like_event_tag() {
        for kind in EventKind::ALL {
            assert_eq!(serde_json::to_value(kind).unwrap(), json!(kind.as_str()));
        }
    }
}
