//! User service providing a simplified API for user operations.

use std::sync::Arc;

use common::{IdGenerator, StreamId, UuidGenerator};
use event_store::EventStore;

use crate::command::{CommandHandler, CommandResult, RetryPolicy};
use crate::error::DomainError;
use crate::validation::FieldRules;

use super::{
    AddPhoto, AgreeEthics, SetBirthDate, SetEmail, SetName, SetOriginCountry, SetPassword,
    UserAggregate, UserEvent,
};

/// Service for managing users.
///
/// Every call runs one full load-command-append cycle against the store, so
/// callers never hold on to an aggregate between commands.
pub struct UserService<S: EventStore> {
    handler: CommandHandler<S, UserAggregate>,
    ids: Arc<dyn IdGenerator>,
}

impl<S: EventStore> UserService<S> {
    /// Creates a new user service with the given event store.
    pub fn new(store: S) -> Self {
        Self {
            handler: CommandHandler::new(store),
            ids: Arc::new(UuidGenerator),
        }
    }

    /// Validates command input with `rules` instead of the default set.
    pub fn with_rules(mut self, rules: FieldRules) -> Self {
        self.handler = self.handler.with_initial(UserAggregate::with_rules(rules));
        self
    }

    /// Draws new user identities from `ids`.
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.handler = self.handler.with_retry_policy(retry);
        self
    }

    /// Returns a reference to the underlying command handler.
    pub fn handler(&self) -> &CommandHandler<S, UserAggregate> {
        &self.handler
    }

    /// Registers a new user. The user's id is read from the returned aggregate.
    #[tracing::instrument(skip(self))]
    pub async fn create_user(&self) -> Result<CommandResult<UserAggregate>, DomainError> {
        let ids = Arc::clone(&self.ids);
        self.handler
            .execute_new(move |user| user.create_user_with(ids.as_ref()))
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_name(
        &self,
        cmd: SetName,
    ) -> Result<CommandResult<UserAggregate>, DomainError> {
        self.handler
            .handle(&cmd, |user| user.set_name(&cmd.name))
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_email(
        &self,
        cmd: SetEmail,
    ) -> Result<CommandResult<UserAggregate>, DomainError> {
        self.handler
            .handle(&cmd, |user| user.set_email(&cmd.email))
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_password(
        &self,
        cmd: SetPassword,
    ) -> Result<CommandResult<UserAggregate>, DomainError> {
        self.handler
            .handle(&cmd, |user| user.set_password(&cmd.hashed_password))
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_birth_date(
        &self,
        cmd: SetBirthDate,
    ) -> Result<CommandResult<UserAggregate>, DomainError> {
        self.handler
            .handle(&cmd, |user| user.set_birth_date(&cmd.birth_date))
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn agree_ethics(
        &self,
        cmd: AgreeEthics,
    ) -> Result<CommandResult<UserAggregate>, DomainError> {
        self.handler
            .handle(&cmd, |user| user.agree_ethics())
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn add_photo(
        &self,
        cmd: AddPhoto,
    ) -> Result<CommandResult<UserAggregate>, DomainError> {
        self.handler
            .handle(&cmd, |user| user.add_photo(&cmd.photo_url))
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_origin_country(
        &self,
        cmd: SetOriginCountry,
    ) -> Result<CommandResult<UserAggregate>, DomainError> {
        self.handler
            .handle(&cmd, |user| user.set_origin_country(&cmd.country))
            .await
    }

    /// Loads a user by ID.
    ///
    /// Returns None if the user doesn't exist.
    #[tracing::instrument(skip(self))]
    pub async fn get_user(&self, user_id: &StreamId) -> Result<Option<UserAggregate>, DomainError> {
        self.handler.load_existing(user_id).await
    }

    /// Returns the recorded events of a user, oldest first.
    #[tracing::instrument(skip(self))]
    pub async fn history(&self, user_id: &StreamId) -> Result<Vec<UserEvent>, DomainError> {
        self.handler.history(user_id).await
    }
}
