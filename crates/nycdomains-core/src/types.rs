//! Shared types used across the nycdomains pipeline.
//!
//! This module defines the domain-name newtype, the two-sentinel field
//! value used throughout enrichment output, and the website status enum
//! derived from it.

use crate::error::CoreError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Wire form of the terminal failure sentinel.
pub const ERROR_TEXT: &str = "Error";

/// Wire form of the legitimate-absence sentinel.
pub const NOT_FOUND_TEXT: &str = "Not found";

/// Newtype for registered domain names with validation.
///
/// Domain names are trimmed on construction and must be non-empty with no
/// embedded whitespace or control characters. Scheme prefixes are allowed;
/// the enrichment resolver normalizes bare names itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DomainName(String);

impl DomainName {
    /// Create a new `DomainName` from a string.
    ///
    /// # Errors
    /// Returns error if the name is empty or contains whitespace.
    pub fn new(name: impl Into<String>) -> Result<Self, CoreError> {
        let name = name.into().trim().to_string();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(name: &str) -> Result<(), CoreError> {
        if name.is_empty() {
            return Err(CoreError::Validation(
                "invalid domain name: must not be empty".to_string(),
            ));
        }
        if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(CoreError::Validation(format!(
                "invalid domain name: must not contain whitespace, got '{name}'"
            )));
        }
        Ok(())
    }
}

impl TryFrom<String> for DomainName {
    type Error = CoreError;

    fn try_from(name: String) -> Result<Self, CoreError> {
        Self::new(name)
    }
}

impl From<DomainName> for String {
    fn from(name: DomainName) -> Self {
        name.0
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A field value from a fallible enrichment stage.
///
/// `Error` marks a stage that failed to produce data; `NotFound` marks a
/// stage that succeeded but found nothing. The two are distinct terminal
/// values and must never be collapsed. On the wire both sentinels keep the
/// literal strings of the upstream dataset (`"Error"`, `"Not found"`) so
/// stored rows stay comparable across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    /// The stage produced a value.
    Found(T),
    /// The stage succeeded but no value existed in the source.
    NotFound,
    /// The stage failed before a value could be produced.
    Error,
}

impl Field<String> {
    /// The found-predicate: a real, non-empty value (neither sentinel).
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(value) if !value.trim().is_empty())
    }

    /// Build a field from optional extracted text; empty text is absence.
    #[must_use]
    pub fn from_text(text: Option<String>) -> Self {
        match text {
            Some(value) if !value.trim().is_empty() => Self::Found(value),
            _ => Self::NotFound,
        }
    }

    /// Parse a stored wire value back into a field.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            ERROR_TEXT => Self::Error,
            NOT_FOUND_TEXT | "" => Self::NotFound,
            value => Self::Found(value.to_string()),
        }
    }
}

impl Field<u16> {
    /// Parse a stored wire value back into a numeric field.
    ///
    /// A non-sentinel value that does not parse as a number is treated as
    /// the failure sentinel rather than silently dropped.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            ERROR_TEXT => Self::Error,
            NOT_FOUND_TEXT | "" => Self::NotFound,
            value => value.parse().map_or(Self::Error, Self::Found),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found(value) => write!(f, "{value}"),
            Self::NotFound => write!(f, "{NOT_FOUND_TEXT}"),
            Self::Error => write!(f, "{ERROR_TEXT}"),
        }
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Found(value) => value.serialize(serializer),
            Self::NotFound => serializer.serialize_str(NOT_FOUND_TEXT),
            Self::Error => serializer.serialize_str(ERROR_TEXT),
        }
    }
}

impl<'de> Deserialize<'de> for Field<String> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

impl<'de> Deserialize<'de> for Field<u16> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Code(u16),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Code(code) => Ok(Self::Found(code)),
            Raw::Text(text) => Ok(Self::parse(&text)),
        }
    }
}

/// Overall reachability classification of an enriched domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebsiteStatus {
    /// Address and title were both found.
    IsComplete,
    /// Address was found but no title.
    IsLive,
    /// Address was not found; the site is unreachable.
    IsDown,
}

impl WebsiteStatus {
    /// Parse from the stored wire representation.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "is_complete" => Self::IsComplete,
            "is_live" => Self::IsLive,
            _ => Self::IsDown,
        }
    }
}

impl fmt::Display for WebsiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IsComplete => write!(f, "is_complete"),
            Self::IsLive => write!(f, "is_live"),
            Self::IsDown => write!(f, "is_down"),
        }
    }
}
