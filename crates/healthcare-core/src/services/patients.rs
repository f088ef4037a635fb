//! Owner-scoped patient operations.

use crate::db::{Database, Filter};
use crate::error::{Error, Result};
use crate::models::{ActorId, EntityKind, NewPatient, Patient, PatientPatch};
use crate::policy::Scope;

/// Patient records, each visible only to the actor that created it.
pub struct PatientService<'a> {
    db: &'a Database,
}

impl<'a> PatientService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// The actor's patients, oldest first.
    pub fn list(&self, actor: &ActorId) -> Result<Vec<Patient>> {
        let patients = self.db.find_by_filter(Filter::new(), Scope::Actor(actor))?;
        tracing::debug!(actor = %actor, count = patients.len(), "patients listed");
        Ok(patients)
    }

    pub fn get(&self, actor: &ActorId, id: &str) -> Result<Patient> {
        self.db
            .find_by_id(id, Scope::Actor(actor))?
            .ok_or(Error::NotFound(EntityKind::Patient))
    }

    /// Create a patient owned by `actor`.
    pub fn create(&self, actor: &ActorId, fields: NewPatient) -> Result<Patient> {
        let patient = self.db.insert(&Patient::new(fields, actor.clone()))?;
        tracing::info!(actor = %actor, id = %patient.id, "patient created");
        Ok(patient)
    }

    /// Merge `patch` into the actor's patient.
    ///
    /// The merged record is validated as a whole. An empty patch returns the
    /// stored record untouched.
    pub fn update(&self, actor: &ActorId, id: &str, patch: PatientPatch) -> Result<Patient> {
        let current = self.get(actor, id)?;
        if patch.is_empty() {
            return Ok(current);
        }

        let merged = current.patched(patch);
        let updated = self
            .db
            .update(&merged, Scope::Actor(actor))?
            .ok_or(Error::NotFound(EntityKind::Patient))?;
        tracing::debug!(actor = %actor, id = %updated.id, "patient updated");
        Ok(updated)
    }

    /// Delete the actor's patient along with every assignment that names it.
    pub fn delete(&self, actor: &ActorId, id: &str) -> Result<Patient> {
        let deleted: Patient = self
            .db
            .delete(id, Scope::Actor(actor))?
            .ok_or(Error::NotFound(EntityKind::Patient))?;
        tracing::info!(actor = %actor, id = %deleted.id, "patient deleted");
        Ok(deleted)
    }
}
