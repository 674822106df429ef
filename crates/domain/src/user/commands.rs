//! User commands.
//!
//! Creation has no command struct: the stream id is the identity minted by
//! the creation itself, see [`UserService::create_user`](super::UserService::create_user).

use common::StreamId;

use crate::command::Command;

use super::UserAggregate;

/// Command to set the user's display name.
#[derive(Debug, Clone)]
pub struct SetName {
    pub user_id: StreamId,
    pub name: String,
}

impl SetName {
    pub fn new(user_id: StreamId, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
        }
    }
}

impl Command for SetName {
    type Aggregate = UserAggregate;

    fn stream_id(&self) -> &StreamId {
        &self.user_id
    }
}

/// Command to set the user's e-mail address.
#[derive(Debug, Clone)]
pub struct SetEmail {
    pub user_id: StreamId,
    pub email: String,
}

impl SetEmail {
    pub fn new(user_id: StreamId, email: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
        }
    }
}

impl Command for SetEmail {
    type Aggregate = UserAggregate;

    fn stream_id(&self) -> &StreamId {
        &self.user_id
    }
}

/// Command to record the user's password hash.
#[derive(Clone)]
pub struct SetPassword {
    pub user_id: StreamId,
    pub hashed_password: String,
}

impl SetPassword {
    pub fn new(user_id: StreamId, hashed_password: impl Into<String>) -> Self {
        Self {
            user_id,
            hashed_password: hashed_password.into(),
        }
    }
}

// Keeps the hash out of tracing spans.
impl std::fmt::Debug for SetPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetPassword")
            .field("user_id", &self.user_id)
            .field("hashed_password", &"<redacted>")
            .finish()
    }
}

impl Command for SetPassword {
    type Aggregate = UserAggregate;

    fn stream_id(&self) -> &StreamId {
        &self.user_id
    }
}

/// Command to record the user's birth date from raw input.
#[derive(Debug, Clone)]
pub struct SetBirthDate {
    pub user_id: StreamId,
    pub birth_date: String,
}

impl SetBirthDate {
    pub fn new(user_id: StreamId, birth_date: impl Into<String>) -> Self {
        Self {
            user_id,
            birth_date: birth_date.into(),
        }
    }
}

impl Command for SetBirthDate {
    type Aggregate = UserAggregate;

    fn stream_id(&self) -> &StreamId {
        &self.user_id
    }
}

/// Command to accept the ethics charter.
#[derive(Debug, Clone)]
pub struct AgreeEthics {
    pub user_id: StreamId,
}

impl AgreeEthics {
    pub fn new(user_id: StreamId) -> Self {
        Self { user_id }
    }
}

impl Command for AgreeEthics {
    type Aggregate = UserAggregate;

    fn stream_id(&self) -> &StreamId {
        &self.user_id
    }
}

/// Command to add a profile photo.
#[derive(Debug, Clone)]
pub struct AddPhoto {
    pub user_id: StreamId,
    pub photo_url: String,
}

impl AddPhoto {
    pub fn new(user_id: StreamId, photo_url: impl Into<String>) -> Self {
        Self {
            user_id,
            photo_url: photo_url.into(),
        }
    }
}

impl Command for AddPhoto {
    type Aggregate = UserAggregate;

    fn stream_id(&self) -> &StreamId {
        &self.user_id
    }
}

/// Command to set the user's country of origin.
#[derive(Debug, Clone)]
pub struct SetOriginCountry {
    pub user_id: StreamId,
    pub country: String,
}

impl SetOriginCountry {
    pub fn new(user_id: StreamId, country: impl Into<String>) -> Self {
        Self {
            user_id,
            country: country.into(),
        }
    }
}

impl Command for SetOriginCountry {
    type Aggregate = UserAggregate;

    fn stream_id(&self) -> &StreamId {
        &self.user_id
    }
}
