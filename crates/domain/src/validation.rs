//! Field-level validation of raw command input.
//!
//! Every function here is pure: it either turns a raw value into a
//! well-formed one or explains why it cannot.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Raw input rejected by a field rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field} {value:?}: {reason}")]
pub struct ValidationFailure {
    /// Context path of the offending field (e.g. `"birthDate"`).
    pub field: &'static str,
    pub value: String,
    pub reason: String,
}

impl ValidationFailure {
    pub fn new(field: Field, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.path(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// User fields that accept raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    HashedPassword,
    BirthDate,
    PhotoUrl,
    OriginCountry,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Name,
        Field::Email,
        Field::HashedPassword,
        Field::BirthDate,
        Field::PhotoUrl,
        Field::OriginCountry,
    ];

    /// Path of the field within the user context.
    pub fn path(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::HashedPassword => "hashedPassword",
            Field::BirthDate => "birthDate",
            Field::PhotoUrl => "photoUrls",
            Field::OriginCountry => "originCountry",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A check applied to the raw text of one field.
///
/// Returns a human-readable reason on rejection.
pub trait FieldRule: Send + Sync {
    fn check(&self, value: &str) -> Result<(), String>;
}

/// Accepts any string.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl FieldRule for PassThrough {
    fn check(&self, _value: &str) -> Result<(), String> {
        Ok(())
    }
}

/// Rejects empty or whitespace-only strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonBlank;

impl FieldRule for NonBlank {
    fn check(&self, value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            return Err("must not be blank".to_string());
        }
        Ok(())
    }
}

/// Structural e-mail check: `local@host.tld`, no whitespace.
///
/// Catches typos, not undeliverable addresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailShape;

impl FieldRule for EmailShape {
    fn check(&self, value: &str) -> Result<(), String> {
        if value.chars().any(char::is_whitespace) {
            return Err("must not contain whitespace".to_string());
        }
        let Some((local, domain)) = value.split_once('@') else {
            return Err("missing '@'".to_string());
        };
        if local.is_empty() {
            return Err("empty local part".to_string());
        }
        if domain.contains('@') {
            return Err("more than one '@'".to_string());
        }
        if domain.split('.').count() < 2 || domain.split('.').any(str::is_empty) {
            return Err("domain must look like host.tld".to_string());
        }
        Ok(())
    }
}

/// The rule set consulted by user commands, one rule per text field.
///
/// Every field carries a rule. The default set passes every field through
/// except `email`, whose shape is checked.
#[derive(Clone)]
pub struct FieldRules {
    rules: HashMap<Field, Arc<dyn FieldRule>>,
}

impl FieldRules {
    /// A rule set that accepts every string.
    pub fn permissive() -> Self {
        let rules = Field::ALL
            .into_iter()
            .map(|field| (field, Arc::new(PassThrough) as Arc<dyn FieldRule>))
            .collect();
        Self { rules }
    }

    /// Replaces the rule for `field`.
    pub fn with_rule(mut self, field: Field, rule: impl FieldRule + 'static) -> Self {
        self.rules.insert(field, Arc::new(rule));
        self
    }

    /// Runs the rule registered for `field` and returns the accepted value.
    pub fn decode_text(&self, field: Field, raw: &str) -> Result<String, ValidationFailure> {
        let rule = self
            .rules
            .get(&field)
            .ok_or_else(|| ValidationFailure::new(field, raw, "no rule registered"))?;
        rule.check(raw)
            .map_err(|reason| ValidationFailure::new(field, raw, reason))?;
        Ok(raw.to_string())
    }
}

impl Default for FieldRules {
    fn default() -> Self {
        Self::permissive().with_rule(Field::Email, EmailShape)
    }
}

impl fmt::Debug for FieldRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields: Vec<_> = self.rules.keys().map(Field::path).collect();
        fields.sort_unstable();
        f.debug_struct("FieldRules")
            .field("rules", &fields)
            .finish()
    }
}

/// Parses an ISO-8601 calendar date.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 date-times and naive `YYYY-MM-DDTHH:MM:SS`
/// date-times; for date-times the calendar date as written is kept.
pub fn decode_date(raw: &str) -> Result<NaiveDate, ValidationFailure> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Ok(datetime.date_naive());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(datetime.date());
    }
    Err(ValidationFailure::new(
        Field::BirthDate,
        raw,
        "expected an ISO-8601 calendar date",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_date_accepts_plain_date() {
        let date = decode_date("1990-04-12").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(1990, 4, 12).unwrap());
    }

    #[test]
    fn decode_date_accepts_datetimes() {
        let expected = NaiveDate::from_ymd_opt(2001, 2, 3).unwrap();
        assert_eq!(decode_date("2001-02-03T04:05:06Z").unwrap(), expected);
        assert_eq!(decode_date("2001-02-03T23:30:00+02:00").unwrap(), expected);
        assert_eq!(decode_date("2001-02-03T04:05:06").unwrap(), expected);
    }

    #[test]
    fn decode_date_rejects_garbage() {
        let failure = decode_date("not-a-date").unwrap_err();
        assert_eq!(failure.field, "birthDate");
        assert_eq!(failure.value, "not-a-date");
    }

    #[test]
    fn decode_date_rejects_impossible_day() {
        assert!(decode_date("2021-02-30").is_err());
        assert!(decode_date("2021-13-01").is_err());
        assert!(decode_date("").is_err());
    }

    #[test]
    fn email_shape() {
        assert!(EmailShape.check("tycho@toto.tech").is_ok());
        assert!(EmailShape.check("a.b+c@mail.example.org").is_ok());

        assert!(EmailShape.check("tycho").is_err());
        assert!(EmailShape.check("@toto.tech").is_err());
        assert!(EmailShape.check("tycho@toto").is_err());
        assert!(EmailShape.check("tycho@toto.").is_err());
        assert!(EmailShape.check("ty cho@toto.tech").is_err());
        assert!(EmailShape.check("a@b@toto.tech").is_err());
    }

    #[test]
    fn default_rules_only_check_email() {
        let rules = FieldRules::default();

        assert_eq!(rules.decode_text(Field::Name, "").unwrap(), "");
        assert_eq!(
            rules
                .decode_text(Field::PhotoUrl, "amazone.s3/path/to/photo")
                .unwrap(),
            "amazone.s3/path/to/photo"
        );

        let failure = rules.decode_text(Field::Email, "nope").unwrap_err();
        assert_eq!(failure.field, "email");
        assert_eq!(failure.reason, "missing '@'");
    }

    #[test]
    fn rules_are_pluggable() {
        let rules = FieldRules::permissive().with_rule(Field::Name, NonBlank);

        assert!(rules.decode_text(Field::Email, "nope").is_ok());
        assert!(rules.decode_text(Field::Name, "   ").is_err());
        assert!(rules.decode_text(Field::Name, "tycho").is_ok());
    }

    #[test]
    fn permissive_registers_pass_through_for_every_field() {
        let rules = FieldRules::permissive();
        for field in Field::ALL {
            assert_eq!(rules.decode_text(field, "  x ").unwrap(), "  x ");
        }
        assert!(format!("{rules:?}").contains("originCountry"));
    }

    #[test]
    fn pass_through_disables_email_check() {
        let rules = FieldRules::default().with_rule(Field::Email, PassThrough);
        assert!(rules.decode_text(Field::Email, "nope").is_ok());
    }

    #[test]
    fn failure_message_names_field_and_input() {
        let failure = decode_date("yesterday").unwrap_err();
        assert_eq!(
            failure.to_string(),
            "invalid birthDate \"yesterday\": expected an ISO-8601 calendar date"
        );
    }
}
