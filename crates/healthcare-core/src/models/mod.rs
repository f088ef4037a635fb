//! Domain models for the healthcare records system.

mod actor;
mod doctor;
mod mapping;
mod patient;

pub use actor::*;
pub use doctor::*;
pub use mapping::*;
pub use patient::*;

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kinds of record held by the entity store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Patient,
    Doctor,
    Mapping,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Patient => "patient",
            EntityKind::Doctor => "doctor",
            EntityKind::Mapping => "mapping",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current UTC time in the RFC 3339 form stored on every record.
pub(crate) fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Fresh random record identifier.
pub(crate) fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
