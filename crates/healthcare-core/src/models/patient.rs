//! Patient models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{new_record_id, timestamp_now, ActorId};
use crate::validation::{ValidationErrors, Validator, MAX_AGE};

/// Administrative gender as recorded on the patient record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ValidationErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gender::ALL
            .into_iter()
            .find(|g| g.as_str() == s.trim())
            .ok_or_else(|| ValidationErrors::single("gender", "must be one of Male, Female, Other"))
    }
}

/// A patient record, owned by the actor that created it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Age in years, 0 to 150
    pub age: u32,
    pub gender: Gender,
    pub address: Option<String>,
    /// Owning actor; fixed at creation
    pub created_by: ActorId,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields supplied when creating a patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewPatient {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub age: u32,
    pub gender: Gender,
    #[serde(default)]
    pub address: Option<String>,
}

/// Partial update of a patient. Absent fields keep their current value, so
/// an address once set can be replaced but not removed.
///
/// There is no owner field: ownership never transfers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub address: Option<String>,
}

impl Patient {
    /// Create a new patient owned by `owner`.
    pub fn new(fields: NewPatient, owner: ActorId) -> Self {
        let now = timestamp_now();
        Self {
            id: new_record_id(),
            name: fields.name,
            email: fields.email,
            phone: fields.phone,
            age: fields.age,
            gender: fields.gender,
            address: fields.address,
            created_by: owner,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Check every declared field constraint.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .required("name", &self.name)
            .email("email", &self.email)
            .phone("phone", &self.phone)
            .at_most("age", self.age, MAX_AGE)
            .optional("address", self.address.as_deref())
            .finish()
    }

    /// Copy of this record with `patch` merged in.
    ///
    /// The identifier, owner and creation time are carried over unchanged.
    pub fn patched(&self, patch: PatientPatch) -> Self {
        Self {
            id: self.id.clone(),
            name: patch.name.unwrap_or_else(|| self.name.clone()),
            email: patch.email.unwrap_or_else(|| self.email.clone()),
            phone: patch.phone.unwrap_or_else(|| self.phone.clone()),
            age: patch.age.unwrap_or(self.age),
            gender: patch.gender.unwrap_or(self.gender),
            address: patch.address.or_else(|| self.address.clone()),
            created_by: self.created_by.clone(),
            created_at: self.created_at.clone(),
            updated_at: timestamp_now(),
        }
    }
}

impl PatientPatch {
    pub fn is_empty(&self) -> bool {
        self == &PatientPatch::default()
    }
}
