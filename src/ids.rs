//! Airtable identifier validation
//!
//! API keys, base IDs and record IDs share one shape: exactly 17 characters
//! with a fixed three letter prefix.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Length of every Airtable identifier
pub const ID_LENGTH: usize = 17;

/// Kind of Airtable identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    /// Legacy API key (`key...`)
    ApiKey,
    /// Base ID (`app...`)
    BaseId,
    /// Record ID (`rec...`)
    RecordId,
}

impl IdKind {
    /// Required prefix for this kind
    pub fn prefix(self) -> &'static str {
        match self {
            IdKind::ApiKey => "key",
            IdKind::BaseId => "app",
            IdKind::RecordId => "rec",
        }
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            IdKind::ApiKey => "API Key",
            IdKind::BaseId => "Base ID",
            IdKind::RecordId => "Record ID",
        }
    }
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IdKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "API Key" => Ok(IdKind::ApiKey),
            "Base ID" => Ok(IdKind::BaseId),
            "Record ID" => Ok(IdKind::RecordId),
            other => Err(Error::invalid_id(
                other,
                "unsupported identifier kind used for validation",
            )),
        }
    }
}

/// Validate `value` as an identifier of `kind`
pub fn validate(value: &str, kind: IdKind) -> Result<()> {
    let len = value.chars().count();
    if len != ID_LENGTH {
        return Err(Error::invalid_id(
            value,
            format!("{kind} must be {ID_LENGTH} characters long, got {len}"),
        ));
    }

    if !value.starts_with(kind.prefix()) {
        return Err(Error::invalid_id(
            value,
            format!("{kind} must begin with '{}'", kind.prefix()),
        ));
    }

    Ok(())
}

/// A validated identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    kind: IdKind,
    value: String,
}

impl Identifier {
    /// Validate and wrap `value`
    pub fn parse(value: impl Into<String>, kind: IdKind) -> Result<Self> {
        let value = value.into();
        validate(&value, kind)?;
        Ok(Self { kind, value })
    }

    pub fn kind(&self) -> IdKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.value
    }
}
