//! Patient-to-doctor assignments.
//!
//! An assignment is owned by the actor who made it, and can only be made for
//! a patient that actor owns. Lookups are ordered so that a caller learns
//! nothing about records outside their reach: the patient is checked before
//! the doctor, and a foreign patient fails exactly like a missing one.

use crate::db::{Database, DbError, Filter};
use crate::error::{Error, Result};
use crate::models::{
    ActorId, AssignedMapping, Doctor, EntityKind, Mapping, MappingDetail, Patient, PatientDoctors,
};
use crate::policy::Scope;

const DUPLICATE_ASSIGNMENT: &str = "duplicate assignment";

pub struct RelationshipManager<'a> {
    db: &'a Database,
}

impl<'a> RelationshipManager<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// The actor's patient, or `NotFound(patient)` for missing and foreign alike.
    fn owned_patient(&self, actor: &ActorId, patient_id: &str) -> Result<Patient> {
        match self.db.find_by_id(patient_id, Scope::Actor(actor))? {
            Some(patient) => Ok(patient),
            None => {
                tracing::warn!(actor = %actor, patient_id, "patient not accessible");
                Err(Error::NotFound(EntityKind::Patient))
            }
        }
    }

    /// Assign a doctor to one of the actor's patients.
    ///
    /// Each (patient, doctor) pair is assigned at most once, across all actors.
    pub fn create_mapping(
        &self,
        actor: &ActorId,
        patient_id: &str,
        doctor_id: &str,
    ) -> Result<AssignedMapping> {
        let patient = self.owned_patient(actor, patient_id)?;

        let doctor: Doctor = match self.db.find_by_id(doctor_id, Scope::Unscoped)? {
            Some(doctor) => doctor,
            None => {
                tracing::warn!(actor = %actor, doctor_id, "doctor not found for assignment");
                return Err(Error::NotFound(EntityKind::Doctor));
            }
        };

        let pair = Filter::new()
            .eq("patient_id", patient.id.as_str())
            .eq("doctor_id", doctor.id.as_str());
        let existing: Option<Mapping> = self.db.find_one(pair, Scope::Unscoped)?;
        if existing.is_some() {
            tracing::warn!(actor = %actor, patient_id, doctor_id, "assignment already exists");
            return Err(Error::Conflict(DUPLICATE_ASSIGNMENT.to_string()));
        }

        let mapping = Mapping::new(patient.id.clone(), doctor.id.clone(), actor.clone());
        let mapping = match self.db.insert(&mapping) {
            Ok(stored) => stored,
            // Lost a race with a concurrent assignment of the same pair
            Err(DbError::Duplicate(_)) => {
                tracing::warn!(actor = %actor, patient_id, doctor_id, "assignment already exists");
                return Err(Error::Conflict(DUPLICATE_ASSIGNMENT.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(actor = %actor, id = %mapping.id, patient_id, doctor_id, "doctor assigned");
        Ok(AssignedMapping {
            mapping,
            patient,
            doctor,
        })
    }

    /// Remove an assignment the actor made.
    pub fn delete_mapping(&self, actor: &ActorId, mapping_id: &str) -> Result<Mapping> {
        match self.db.delete::<Mapping>(mapping_id, Scope::Actor(actor))? {
            Some(deleted) => {
                tracing::info!(actor = %actor, id = %deleted.id, "assignment removed");
                Ok(deleted)
            }
            None => {
                tracing::warn!(actor = %actor, mapping_id, "assignment not accessible");
                Err(Error::NotFound(EntityKind::Mapping))
            }
        }
    }

    /// Assignments the actor made, each with patient and doctor summaries.
    pub fn list_mappings(&self, actor: &ActorId) -> Result<Vec<MappingDetail>> {
        let details = self.db.list_mapping_details(actor)?;
        tracing::debug!(actor = %actor, count = details.len(), "assignments listed");
        Ok(details)
    }

    /// Every doctor assigned to one of the actor's patients, by any assigner.
    pub fn doctors_for_patient(&self, actor: &ActorId, patient_id: &str) -> Result<PatientDoctors> {
        let patient = self.owned_patient(actor, patient_id)?;
        let doctors = self.db.list_doctors_for_patient(&patient.id)?;
        tracing::debug!(actor = %actor, patient_id, count = doctors.len(), "patient doctors listed");
        Ok(PatientDoctors {
            patient: patient.name,
            doctors,
        })
    }
}
