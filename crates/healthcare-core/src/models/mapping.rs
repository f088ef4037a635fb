//! Patient-to-doctor assignment models.

use serde::{Deserialize, Serialize};

use super::{new_record_id, timestamp_now, ActorId, Doctor, Patient};
use crate::validation::{ValidationErrors, Validator};

/// One doctor assigned to one patient. Never edited in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Mapping {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    /// Actor that made the assignment; only they can see or remove it
    pub assigned_by: ActorId,
    pub created_at: String,
}

impl Mapping {
    pub fn new(patient_id: String, doctor_id: String, assigned_by: ActorId) -> Self {
        Self {
            id: new_record_id(),
            patient_id,
            doctor_id,
            assigned_by,
            created_at: timestamp_now(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .required("patientId", &self.patient_id)
            .required("doctorId", &self.doctor_id)
            .finish()
    }
}

/// Patient fields shown alongside an assignment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Doctor fields shown alongside an assignment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSummary {
    pub id: String,
    pub name: String,
    pub specialization: String,
    pub hospital: Option<String>,
    pub experience: u32,
}

/// An assignment joined with summaries of both sides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MappingDetail {
    #[serde(flatten)]
    pub mapping: Mapping,
    pub patient: PatientSummary,
    pub doctor: DoctorSummary,
}

/// A newly created assignment with the full records it links.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssignedMapping {
    #[serde(flatten)]
    pub mapping: Mapping,
    pub patient: Patient,
    pub doctor: Doctor,
}

/// Every doctor assigned to one patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientDoctors {
    /// Patient name
    pub patient: String,
    pub doctors: Vec<DoctorSummary>,
}
