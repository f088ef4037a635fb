//! Doctor catalog models.

use serde::{Deserialize, Serialize};

use super::{new_record_id, timestamp_now};
use crate::validation::{ValidationErrors, Validator};

/// A doctor in the shared catalog. Visible to, and editable by, every actor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Clinical specialty (e.g., "Cardiology")
    pub specialization: String,
    /// Years of practice
    pub experience: u32,
    pub hospital: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields supplied when adding a doctor to the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewDoctor {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub specialization: String,
    pub experience: u32,
    #[serde(default)]
    pub hospital: Option<String>,
}

/// Partial update of a doctor. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DoctorPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub experience: Option<u32>,
    pub hospital: Option<String>,
}

impl Doctor {
    pub fn new(fields: NewDoctor) -> Self {
        let now = timestamp_now();
        Self {
            id: new_record_id(),
            name: fields.name,
            email: fields.email,
            phone: fields.phone,
            specialization: fields.specialization,
            experience: fields.experience,
            hospital: fields.hospital,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .required("name", &self.name)
            .email("email", &self.email)
            .phone("phone", &self.phone)
            .required("specialization", &self.specialization)
            .optional("hospital", self.hospital.as_deref())
            .finish()
    }

    pub fn patched(&self, patch: DoctorPatch) -> Self {
        Self {
            id: self.id.clone(),
            name: patch.name.unwrap_or_else(|| self.name.clone()),
            email: patch.email.unwrap_or_else(|| self.email.clone()),
            phone: patch.phone.unwrap_or_else(|| self.phone.clone()),
            specialization: patch
                .specialization
                .unwrap_or_else(|| self.specialization.clone()),
            experience: patch.experience.unwrap_or(self.experience),
            hospital: patch.hospital.or_else(|| self.hospital.clone()),
            created_at: self.created_at.clone(),
            updated_at: timestamp_now(),
        }
    }
}

impl DoctorPatch {
    pub fn is_empty(&self) -> bool {
        self == &DoctorPatch::default()
    }
}
