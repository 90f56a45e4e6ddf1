//! Owners, tokens and the value types passed between them.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, Month, OffsetDateTime};

const ISO_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnerKind {
    Personal,
    Group,
    Project,
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Personal => "user",
            Self::Group => "group",
            Self::Project => "project",
        })
    }
}

/// The user, group or project a token belongs to. Resolved once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub kind: OwnerKind,
    pub id: u64,
    pub display_name: String,
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} (id {})", self.kind, self.display_name, self.id)
    }
}

#[derive(Debug, Error)]
#[error("Invalid expiry date \"{0}\". Use YYYY-MM-DD")]
pub struct InvalidDate(pub String);

/// A calendar date in `YYYY-MM-DD` form, as the host expects for `expires_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExpiryDate(Date);

impl ExpiryDate {
    pub fn new(date: Date) -> Self {
        Self(date)
    }

    pub fn date(&self) -> Date {
        self.0
    }

    /// Same day of the next calendar month, clamped to that month's last day
    /// (January 31st becomes February 28th or 29th).
    pub fn one_month_after(date: Date) -> Result<Self, InvalidDate> {
        let (year, month) = match date.month() {
            Month::December => (date.year() + 1, Month::January),
            month => (date.year(), month.next()),
        };
        let day = date.day().min(month.length(year));
        Date::from_calendar_date(year, month, day)
            .map(Self)
            .map_err(|err| InvalidDate(format!("{date} + 1 month: {err}")))
    }

    /// Default expiry for a token created without an explicit one.
    pub fn default_from(today: Date) -> Result<Self, InvalidDate> {
        Self::one_month_after(today)
    }
}

impl FromStr for ExpiryDate {
    type Err = InvalidDate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Date::parse(s.trim(), ISO_DATE)
            .map(Self)
            .map_err(|_| InvalidDate(s.to_string()))
    }
}

impl TryFrom<String> for ExpiryDate {
    type Error = InvalidDate;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ExpiryDate> for String {
    fn from(value: ExpiryDate) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ExpiryDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day()
        )
    }
}

/// Today's date in the local timezone, falling back to UTC when the local
/// offset cannot be determined.
pub fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

/// Access token metadata as the host reports it. Never carries the secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub expires_at: Option<ExpiryDate>,
    #[serde(default)]
    pub revoked: bool,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub scopes: BTreeSet<String>,
    /// Owning user of a personal token; absent for group and project tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
}

fn default_active() -> bool {
    true
}

impl Token {
    pub fn is_active(&self) -> bool {
        self.active && !self.revoked
    }
}

/// A raw token value. Can be moved out exactly once and is redacted in
/// `Debug` output.
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(self) -> String {
        self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Result of a create or rotate call: the token record plus its one-time
/// secret.
#[derive(Debug)]
pub struct IssuedToken {
    pub token: Token,
    pub secret: Secret,
}

/// Parameters for a create call, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequest {
    pub name: String,
    pub scopes: BTreeSet<String>,
    pub expires_at: ExpiryDate,
}

/// Split a comma- and/or whitespace-delimited scope list.
pub fn parse_scopes(list: &str) -> BTreeSet<String> {
    list.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
