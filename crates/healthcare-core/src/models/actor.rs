//! Authenticated actor identity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Stable identifier of the authenticated user performing an operation.
///
/// Resolving credentials to an identifier happens outside this crate; by the
/// time a value reaches here it is trusted. The only check left is that the
/// identity context actually produced one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActorId(String);

impl ActorId {
    /// Accept an identifier from the identity context.
    ///
    /// Blank identifiers mean the request was never authenticated.
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::Unauthenticated);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Rebuild an identifier read back from storage.
    pub(crate) fn from_stored(raw: String) -> Self {
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ActorId {
    type Error = Error;

    fn try_from(raw: String) -> Result<Self> {
        Self::parse(raw)
    }
}

impl From<ActorId> for String {
    fn from(actor: ActorId) -> Self {
        actor.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
