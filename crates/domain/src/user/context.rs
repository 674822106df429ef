//! The user record derived from replay.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A change to the user record produced by one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextPatch {
    Unchanged,
    Uuid(String),
    Name(String),
    Email(String),
    HashedPassword(String),
    BirthDate(NaiveDate),
    AppendPhoto(String),
    OriginCountry(String),
}

/// Everything known about a user, filled in event by event.
///
/// Every field starts out absent. `uuid` is written once and never
/// overwritten; `photo_urls` only ever grows, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uuid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    hashed_password: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    birth_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    photo_urls: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    origin_country: Option<String>,
}

impl UserContext {
    pub fn uuid(&self) -> Option<&str> {
        self.uuid.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn hashed_password(&self) -> Option<&str> {
        self.hashed_password.as_deref()
    }

    pub fn birth_date(&self) -> Option<NaiveDate> {
        self.birth_date
    }

    /// Photo URLs in the order they were added.
    pub fn photo_urls(&self) -> &[String] {
        &self.photo_urls
    }

    pub fn origin_country(&self) -> Option<&str> {
        self.origin_country.as_deref()
    }

    /// Applies a transition's patch.
    ///
    /// A second identity is ignored: `uuid` keeps the value it was created with.
    pub(crate) fn apply(&mut self, patch: ContextPatch) {
        match patch {
            ContextPatch::Unchanged => {}
            ContextPatch::Uuid(uuid) => {
                if self.uuid.is_none() {
                    self.uuid = Some(uuid);
                }
            }
            ContextPatch::Name(name) => self.name = Some(name),
            ContextPatch::Email(email) => self.email = Some(email),
            ContextPatch::HashedPassword(hash) => self.hashed_password = Some(hash),
            ContextPatch::BirthDate(date) => self.birth_date = Some(date),
            ContextPatch::AppendPhoto(url) => self.photo_urls.push(url),
            ContextPatch::OriginCountry(country) => self.origin_country = Some(country),
        }
    }
}
