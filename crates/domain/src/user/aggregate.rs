//! User aggregate implementation.

use chrono::NaiveDate;
use common::{IdGenerator, StreamId, UuidGenerator};

use crate::aggregate::Aggregate;
use crate::validation::{Field, FieldRules, decode_date};

use super::machine::{self, Transition};
use super::{LifecycleState, UserContext, UserError, UserEvent};

/// User aggregate root.
///
/// Holds the snapshot derived from a user's stream: the lifecycle state and
/// the context record. Command methods check the snapshot and return the
/// events that would follow; they never change it. Append those events to the
/// stream and replay to observe their effect.
#[derive(Debug, Clone, Default)]
pub struct UserAggregate {
    state: LifecycleState,
    context: UserContext,
    rules: FieldRules,
}

impl Aggregate for UserAggregate {
    type Event = UserEvent;
    type Error = UserError;

    fn aggregate_type() -> &'static str {
        "User"
    }

    fn id(&self) -> Option<StreamId> {
        self.context.uuid().map(StreamId::from)
    }

    fn apply(&mut self, event: Self::Event) -> Result<(), Self::Error> {
        let kind = event.kind();
        if !self.state.accepts(kind) {
            return Err(UserError::ImpossibleEvent {
                event_type: kind,
                state: self.state,
            });
        }

        let Transition { next, patch } = machine::transition(self.state, &event)?;
        self.context.apply(patch);
        self.state = machine::guard_after_apply(next, &self.context);
        Ok(())
    }
}

impl UserAggregate {
    /// An empty aggregate whose commands validate input with `rules`.
    pub fn with_rules(rules: FieldRules) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    /// Replays `events` onto an empty aggregate using `rules`.
    pub fn replay_with_rules(
        rules: FieldRules,
        events: impl IntoIterator<Item = UserEvent>,
    ) -> Result<Self, UserError> {
        let mut user = Self::with_rules(rules);
        user.apply_events(events)?;
        Ok(user)
    }
}

// Query methods
impl UserAggregate {
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn context(&self) -> &UserContext {
        &self.context
    }

    pub fn uuid(&self) -> Option<&str> {
        self.context.uuid()
    }

    pub fn name(&self) -> Option<&str> {
        self.context.name()
    }

    pub fn email(&self) -> Option<&str> {
        self.context.email()
    }

    pub fn hashed_password(&self) -> Option<&str> {
        self.context.hashed_password()
    }

    pub fn birth_date(&self) -> Option<NaiveDate> {
        self.context.birth_date()
    }

    pub fn photo_urls(&self) -> &[String] {
        self.context.photo_urls()
    }

    pub fn origin_country(&self) -> Option<&str> {
        self.context.origin_country()
    }

    /// Returns true once the lifecycle has reached its terminal state.
    pub fn is_completed(&self) -> bool {
        self.state.is_terminal()
    }
}

// Command methods (return events)
impl UserAggregate {
    /// Registers the user under a fresh UUID.
    pub fn create_user(&self) -> Result<Vec<UserEvent>, UserError> {
        self.create_user_with(&UuidGenerator)
    }

    /// Registers the user under an identity drawn from `ids`.
    pub fn create_user_with(&self, ids: &dyn IdGenerator) -> Result<Vec<UserEvent>, UserError> {
        self.require("createUser", LifecycleState::NotCreated)?;
        self.emit(vec![UserEvent::user_created(ids.next_id())])
    }

    pub fn set_name(&self, name: &str) -> Result<Vec<UserEvent>, UserError> {
        self.require("setName", LifecycleState::Registered)?;
        let name = self.rules.decode_text(Field::Name, name)?;
        self.emit(vec![UserEvent::name_set(name)])
    }

    pub fn set_email(&self, email: &str) -> Result<Vec<UserEvent>, UserError> {
        self.require("setEmail", LifecycleState::Registered)?;
        let email = self.rules.decode_text(Field::Email, email)?;
        self.emit(vec![UserEvent::email_set(email)])
    }

    /// Records an already hashed password. Hashing happens upstream.
    pub fn set_password(&self, hashed_password: &str) -> Result<Vec<UserEvent>, UserError> {
        self.require("setPassword", LifecycleState::Registered)?;
        let hash = self
            .rules
            .decode_text(Field::HashedPassword, hashed_password)?;
        self.emit(vec![UserEvent::password_set(hash)])
    }

    /// Records a birth date. The event keeps the raw input; it is checked
    /// here and parsed again whenever the event is replayed.
    pub fn set_birth_date(&self, raw: &str) -> Result<Vec<UserEvent>, UserError> {
        self.require("setBirthDate", LifecycleState::Registered)?;
        decode_date(raw)?;
        self.emit(vec![UserEvent::birth_date_set(raw)])
    }

    pub fn agree_ethics(&self) -> Result<Vec<UserEvent>, UserError> {
        self.require("agreeEthics", LifecycleState::Registered)?;
        self.emit(vec![UserEvent::EthicsAgreed])
    }

    /// Adds a photo. The first photo completes the user.
    pub fn add_photo(&self, photo_url: &str) -> Result<Vec<UserEvent>, UserError> {
        self.require("addPhoto", LifecycleState::Agreed)?;
        let url = self.rules.decode_text(Field::PhotoUrl, photo_url)?;
        self.emit(vec![UserEvent::photo_added(url)])
    }

    pub fn set_origin_country(&self, country: &str) -> Result<Vec<UserEvent>, UserError> {
        self.require("setOriginCountry", LifecycleState::Agreed)?;
        let country = self.rules.decode_text(Field::OriginCountry, country)?;
        self.emit(vec![UserEvent::origin_country_set(country)])
    }
}

// Command helpers
impl UserAggregate {
    fn require(&self, command: &'static str, required: LifecycleState) -> Result<(), UserError> {
        if self.state != required {
            return Err(UserError::Precondition {
                command,
                state: self.state,
            });
        }
        Ok(())
    }

    /// Dry-runs `events` against a copy of the snapshot so a command can only
    /// hand out events that replay cleanly.
    fn emit(&self, events: Vec<UserEvent>) -> Result<Vec<UserEvent>, UserError> {
        let mut scratch = self.clone();
        scratch.apply_events(events.iter().cloned())?;
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::EventKind;
    use crate::validation::{FieldRules, NonBlank};
    use common::SequentialIdGenerator;

    fn registered() -> UserAggregate {
        UserAggregate::replay(vec![UserEvent::user_created("u1")]).unwrap()
    }

    fn agreed() -> UserAggregate {
        let events = vec![UserEvent::user_created("u1"), UserEvent::EthicsAgreed];
        UserAggregate::replay(events).unwrap()
    }

    fn scenario() -> Vec<UserEvent> {
        vec![
            UserEvent::user_created("u1"),
            UserEvent::name_set("tycho"),
            UserEvent::email_set("tycho@toto.tech"),
            UserEvent::EthicsAgreed,
            UserEvent::origin_country_set("france"),
            UserEvent::photo_added("s3://photo"),
        ]
    }

    #[test]
    fn test_scenario_replays_to_completed() {
        let user = UserAggregate::replay(scenario()).unwrap();

        assert_eq!(user.state(), LifecycleState::Completed);
        assert_eq!(user.uuid(), Some("u1"));
        assert_eq!(user.name(), Some("tycho"));
        assert_eq!(user.email(), Some("tycho@toto.tech"));
        assert_eq!(user.origin_country(), Some("france"));
        assert_eq!(user.photo_urls(), ["s3://photo".to_string()]);
        assert_eq!(user.hashed_password(), None);
        assert_eq!(user.birth_date(), None);
        assert_eq!(
            serde_json::to_value(user.context()).unwrap(),
            serde_json::json!({
                "uuid": "u1",
                "name": "tycho",
                "email": "tycho@toto.tech",
                "originCountry": "france",
                "photoUrls": ["s3://photo"],
            })
        );
    }

    #[test]
    fn test_empty_replay_is_not_created() {
        let user = UserAggregate::replay(Vec::new()).unwrap();
        assert_eq!(user.state(), LifecycleState::NotCreated);
        assert_eq!(user.id(), None);
    }

    #[test]
    fn test_replay_rejects_event_from_wrong_state() {
        let result = UserAggregate::replay(vec![UserEvent::name_set("tycho")]);
        assert!(matches!(
            result,
            Err(UserError::ImpossibleEvent {
                event_type: EventKind::NameSet,
                state: LifecycleState::NotCreated,
            })
        ));
    }

    #[test]
    fn test_refused_event_leaves_snapshot_untouched() {
        let mut user = registered();
        let before = user.context().clone();

        let err = user
            .apply(UserEvent::photo_added("s3://early"))
            .unwrap_err();
        assert!(matches!(err, UserError::ImpossibleEvent { .. }));
        assert_eq!(user.state(), LifecycleState::Registered);
        assert_eq!(user.context(), &before);

        let err = user
            .apply(UserEvent::birth_date_set("not-a-date"))
            .unwrap_err();
        assert!(matches!(err, UserError::Validation(_)));
        assert_eq!(user.context(), &before);
    }

    #[test]
    fn test_completed_accepts_nothing() {
        let mut user = UserAggregate::replay(scenario()).unwrap();
        for event in scenario() {
            assert!(user.apply(event).is_err());
        }
        assert_eq!(user.photo_urls().len(), 1);
    }

    #[test]
    fn test_create_user_generates_identity() {
        let user = UserAggregate::default();
        let events = user.create_user().unwrap();
        assert_eq!(events.len(), 1);
        let UserEvent::UserCreated { uuid } = &events[0] else {
            panic!("expected USER_CREATED, got {:?}", events[0]);
        };
        assert!(!uuid.is_empty());

        let other = user.create_user().unwrap();
        assert_ne!(events, other);
    }

    #[test]
    fn test_create_user_with_custom_generator() {
        let ids = SequentialIdGenerator::new("user");
        let events = UserAggregate::default().create_user_with(&ids).unwrap();
        assert_eq!(events, vec![UserEvent::user_created("user-1")]);
    }

    #[test]
    fn test_create_user_twice_fails() {
        let result = registered().create_user();
        assert!(matches!(
            result,
            Err(UserError::Precondition {
                command: "createUser",
                state: LifecycleState::Registered,
            })
        ));
    }

    #[test]
    fn test_set_name_before_creation_fails() {
        let result = UserAggregate::default().set_name("tycho");
        assert!(matches!(
            result,
            Err(UserError::Precondition {
                command: "setName",
                state: LifecycleState::NotCreated,
            })
        ));
    }

    #[test]
    fn test_commands_do_not_mutate() {
        let user = registered();
        let events = user.set_name("tycho").unwrap();
        assert_eq!(events, vec![UserEvent::name_set("tycho")]);
        assert_eq!(user.name(), None);
    }

    #[test]
    fn test_profile_commands_in_registered() {
        let user = registered();
        assert_eq!(
            user.set_email("tycho@toto.tech").unwrap(),
            vec![UserEvent::email_set("tycho@toto.tech")]
        );
        assert_eq!(
            user.set_password("hash").unwrap(),
            vec![UserEvent::password_set("hash")]
        );
        assert_eq!(
            user.set_birth_date("1990-04-12").unwrap(),
            vec![UserEvent::birth_date_set("1990-04-12")]
        );
        assert_eq!(user.agree_ethics().unwrap(), vec![UserEvent::EthicsAgreed]);
    }

    #[test]
    fn test_invalid_birth_date_is_rejected() {
        let user = registered();
        let result = user.set_birth_date("not-a-date");
        match result {
            Err(UserError::Validation(failure)) => {
                assert_eq!(failure.field, "birthDate");
                assert_eq!(failure.value, "not-a-date");
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
        assert_eq!(user.birth_date(), None);
    }

    #[test]
    fn test_birth_date_is_stored_parsed() {
        let mut user = registered();
        let events = user.set_birth_date("1990-04-12T08:00:00Z").unwrap();
        user.apply_events(events).unwrap();
        assert_eq!(user.birth_date(), NaiveDate::from_ymd_opt(1990, 4, 12));
    }

    #[test]
    fn test_invalid_email_is_rejected() {
        let result = registered().set_email("tycho-at-toto");
        assert!(matches!(result, Err(UserError::Validation(_))));
    }

    #[test]
    fn test_custom_rules_apply_to_commands() {
        let rules = FieldRules::permissive().with_rule(Field::Name, NonBlank);
        let user =
            UserAggregate::replay_with_rules(rules, vec![UserEvent::user_created("u1")]).unwrap();

        assert!(matches!(
            user.set_name("  "),
            Err(UserError::Validation(_))
        ));
        assert!(user.set_email("no-email-check").is_ok());
    }

    #[test]
    fn test_agree_ethics_requires_registered() {
        let result = agreed().agree_ethics();
        assert!(matches!(
            result,
            Err(UserError::Precondition {
                command: "agreeEthics",
                ..
            })
        ));
    }

    #[test]
    fn test_photo_requires_agreement() {
        let result = registered().add_photo("s3://photo");
        assert!(matches!(
            result,
            Err(UserError::Precondition {
                command: "addPhoto",
                state: LifecycleState::Registered,
            })
        ));
    }

    #[test]
    fn test_first_photo_completes_user() {
        let mut user = agreed();
        let events = user.add_photo("s3://photo").unwrap();
        user.apply_events(events).unwrap();

        assert_eq!(user.state(), LifecycleState::Completed);
        assert!(user.is_completed());
        assert_eq!(user.photo_urls(), ["s3://photo".to_string()]);
    }

    #[test]
    fn test_origin_country_keeps_agreed() {
        let mut user = agreed();
        let events = user.set_origin_country("france").unwrap();
        user.apply_events(events).unwrap();

        assert_eq!(user.state(), LifecycleState::Agreed);
        assert_eq!(user.origin_country(), Some("france"));
    }

    #[test]
    fn test_identity_survives_later_events() {
        let mut user = registered();
        user.apply_events(vec![
            UserEvent::name_set("tycho"),
            UserEvent::EthicsAgreed,
            UserEvent::photo_added("s3://photo"),
        ])
        .unwrap();
        assert_eq!(user.uuid(), Some("u1"));
        assert_eq!(user.id(), Some(StreamId::new("u1")));
    }
}
