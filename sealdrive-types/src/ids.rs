//! Identifier types used throughout sealdrive.
//!
//! Record stores hand out opaque string keys, so identifiers wrap a `String`
//! rather than a `Uuid`. Locally minted identifiers use UUID v7, which embeds
//! a timestamp for natural ordering.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Rejects keys a record store could not address.
fn validate_key(kind: &str, s: &str) -> Result<()> {
    if s.trim().is_empty() {
        return Err(Error::InvalidId(format!("{kind} must not be empty")));
    }
    if s.contains('/') {
        return Err(Error::InvalidId(format!("{kind} must not contain '/': {s}")));
    }
    Ok(())
}

/// Identity of a stored object's metadata record.
///
/// Stable across trash/restore cycles whenever restoration targets the
/// original identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Mints a new, time-ordered object ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Parses an object ID handed out by a record store.
    pub fn parse(s: &str) -> Result<Self> {
        validate_key("object id", s)?;
        Ok(Self(s.to_string()))
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identity of the user who owns a stored object.
/// All queries and mutations are scoped to this value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Parses an owner ID supplied by the identity provider.
    pub fn parse(s: &str) -> Result<Self> {
        validate_key("owner id", s)?;
        Ok(Self(s.to_string()))
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for OwnerId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl AsRef<str> for OwnerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
