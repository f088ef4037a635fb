//! Shared doctor catalog.

use crate::db::{Database, Filter};
use crate::error::{Error, Result};
use crate::models::{Doctor, DoctorPatch, EntityKind, NewDoctor};
use crate::policy::Scope;

/// Default number of hits returned by [`DoctorCatalog::search`].
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Doctors are reference data: every authenticated actor sees and edits the
/// same records, so no operation here takes an owner.
pub struct DoctorCatalog<'a> {
    db: &'a Database,
}

impl<'a> DoctorCatalog<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn list(&self) -> Result<Vec<Doctor>> {
        Ok(self.db.find_by_filter(Filter::new(), Scope::Unscoped)?)
    }

    pub fn get(&self, id: &str) -> Result<Doctor> {
        self.db
            .find_by_id(id, Scope::Unscoped)?
            .ok_or(Error::NotFound(EntityKind::Doctor))
    }

    pub fn create(&self, fields: NewDoctor) -> Result<Doctor> {
        let doctor = self.db.insert(&Doctor::new(fields))?;
        tracing::info!(id = %doctor.id, "doctor created");
        Ok(doctor)
    }

    pub fn update(&self, id: &str, patch: DoctorPatch) -> Result<Doctor> {
        let current = self.get(id)?;
        if patch.is_empty() {
            return Ok(current);
        }

        let updated = self
            .db
            .update(&current.patched(patch), Scope::Unscoped)?
            .ok_or(Error::NotFound(EntityKind::Doctor))?;
        tracing::debug!(id = %updated.id, "doctor updated");
        Ok(updated)
    }

    /// Remove a doctor. Assignments naming the doctor go with it.
    pub fn delete(&self, id: &str) -> Result<Doctor> {
        let deleted: Doctor = self
            .db
            .delete(id, Scope::Unscoped)?
            .ok_or(Error::NotFound(EntityKind::Doctor))?;
        tracing::info!(id = %deleted.id, "doctor deleted");
        Ok(deleted)
    }

    /// Prefix search over name, specialization and hospital, best match first.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<Doctor>> {
        let hits = self.db.search_doctors(query, limit)?;
        tracing::debug!(query, hits = hits.len(), "doctor search");
        Ok(hits)
    }
}
