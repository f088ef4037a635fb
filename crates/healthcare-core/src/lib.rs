//! Healthcare Records Core Library
//!
//! Multi-tenant store for patients, a shared doctor catalog, and the
//! assignments linking them.
//!
//! # Ownership
//!
//! ```text
//!   actor A ──owns──▶ Patient ◀──patient_id── Mapping ──doctor_id──▶ Doctor
//!      │                                        ▲                   (shared)
//!      └──────────────────assigned_by───────────┘
//! ```
//!
//! Every operation runs on behalf of an authenticated actor. Patients and
//! mappings are visible only to the actor that created them; a record owned by
//! someone else is reported exactly like one that does not exist. Doctors are
//! reference data shared by all actors.
//!
//! # Modules
//!
//! - [`config`]: Startup configuration (database path, busy timeout)
//! - [`db`]: SQLite entity store with owner-scoped queries and FTS5 doctor search
//! - [`error`]: Error kinds returned by every operation
//! - [`models`]: Domain types (Patient, Doctor, Mapping, ActorId)
//! - [`policy`]: Per-kind ownership rules
//! - [`services`]: Patient service, doctor catalog and relationship manager
//! - [`validation`]: Field-level checks shared by insert and update

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod policy;
pub mod services;
pub mod validation;

// Re-export commonly used types
pub use config::{ConfigError, CoreConfig};
pub use db::Database;
pub use error::Error;
pub use models::{
    ActorId, AssignedMapping, Doctor, DoctorPatch, DoctorSummary, EntityKind, Gender, Mapping,
    MappingDetail, NewDoctor, NewPatient, Patient, PatientDoctors, PatientPatch, PatientSummary,
};
pub use services::{DoctorCatalog, PatientService, RelationshipManager};
pub use validation::ValidationErrors;

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};
use std::time::Duration;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum HealthcareError {
    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error")]
    InternalError,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<Error> for HealthcareError {
    fn from(e: Error) -> Self {
        match e {
            Error::Unauthenticated => HealthcareError::Unauthenticated,
            Error::NotFound(kind) => HealthcareError::NotFound(kind.to_string()),
            Error::Validation(errors) => HealthcareError::ValidationError(errors.to_string()),
            Error::Conflict(detail) => HealthcareError::Conflict(detail),
            Error::Internal => HealthcareError::InternalError,
        }
    }
}

impl From<ValidationErrors> for HealthcareError {
    fn from(e: ValidationErrors) -> Self {
        Error::Validation(e).into()
    }
}

impl From<db::DbError> for HealthcareError {
    fn from(e: db::DbError) -> Self {
        Error::from(e).into()
    }
}

impl From<ConfigError> for HealthcareError {
    fn from(e: ConfigError) -> Self {
        HealthcareError::Config(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for HealthcareError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        tracing::error!(error = %e, "database lock poisoned");
        HealthcareError::InternalError
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<HealthcareCore>, HealthcareError> {
    HealthcareCore::open(&CoreConfig::new(path))
}

/// Open a database at `path`, waiting up to `busy_timeout_ms` on a locked file.
#[uniffi::export]
pub fn open_database_with_timeout(
    path: String,
    busy_timeout_ms: u64,
) -> Result<Arc<HealthcareCore>, HealthcareError> {
    let config = CoreConfig::new(path).with_busy_timeout(Duration::from_millis(busy_timeout_ms));
    HealthcareCore::open(&config)
}

/// Open the database named by `HEALTHCARE_DB_PATH`.
#[uniffi::export]
pub fn open_database_from_env() -> Result<Arc<HealthcareCore>, HealthcareError> {
    HealthcareCore::open(&CoreConfig::from_env()?)
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<HealthcareCore>, HealthcareError> {
    HealthcareCore::open(&CoreConfig::in_memory())
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
///
/// Every method takes the caller's `actor_id` first and rejects a blank one
/// with [`HealthcareError::Unauthenticated`] before touching the store.
#[derive(uniffi::Object)]
pub struct HealthcareCore {
    db: Arc<Mutex<Database>>,
}

impl HealthcareCore {
    fn open(config: &CoreConfig) -> Result<Arc<Self>, HealthcareError> {
        let db = Database::open_with_config(config)?;
        Ok(Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
        }))
    }
}

#[uniffi::export]
impl HealthcareCore {
    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// List the caller's patients.
    pub fn list_patients(&self, actor_id: String) -> Result<Vec<FfiPatient>, HealthcareError> {
        let actor = ActorId::parse(actor_id)?;
        let db = self.db.lock()?;
        let patients = PatientService::new(&db).list(&actor)?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    /// Get one of the caller's patients.
    pub fn get_patient(
        &self,
        actor_id: String,
        patient_id: String,
    ) -> Result<FfiPatient, HealthcareError> {
        let actor = ActorId::parse(actor_id)?;
        let db = self.db.lock()?;
        Ok(PatientService::new(&db).get(&actor, &patient_id)?.into())
    }

    /// Create a patient owned by the caller.
    pub fn create_patient(
        &self,
        actor_id: String,
        patient: FfiNewPatient,
    ) -> Result<FfiPatient, HealthcareError> {
        let actor = ActorId::parse(actor_id)?;
        let fields = NewPatient::try_from(patient)?;
        let db = self.db.lock()?;
        Ok(PatientService::new(&db).create(&actor, fields)?.into())
    }

    /// Apply a partial update to one of the caller's patients.
    pub fn update_patient(
        &self,
        actor_id: String,
        patient_id: String,
        patch: FfiPatientPatch,
    ) -> Result<FfiPatient, HealthcareError> {
        let actor = ActorId::parse(actor_id)?;
        let patch = PatientPatch::try_from(patch)?;
        let db = self.db.lock()?;
        Ok(PatientService::new(&db)
            .update(&actor, &patient_id, patch)?
            .into())
    }

    /// Delete one of the caller's patients and its assignments.
    pub fn delete_patient(&self, actor_id: String, patient_id: String) -> Result<(), HealthcareError> {
        let actor = ActorId::parse(actor_id)?;
        let db = self.db.lock()?;
        PatientService::new(&db).delete(&actor, &patient_id)?;
        Ok(())
    }

    // =========================================================================
    // Doctor Catalog Operations
    // =========================================================================

    /// List every doctor in the catalog.
    pub fn list_doctors(&self, actor_id: String) -> Result<Vec<FfiDoctor>, HealthcareError> {
        ActorId::parse(actor_id)?;
        let db = self.db.lock()?;
        let doctors = DoctorCatalog::new(&db).list()?;
        Ok(doctors.into_iter().map(|d| d.into()).collect())
    }

    /// Get a doctor by ID.
    pub fn get_doctor(
        &self,
        actor_id: String,
        doctor_id: String,
    ) -> Result<FfiDoctor, HealthcareError> {
        ActorId::parse(actor_id)?;
        let db = self.db.lock()?;
        Ok(DoctorCatalog::new(&db).get(&doctor_id)?.into())
    }

    /// Add a doctor to the catalog.
    pub fn create_doctor(
        &self,
        actor_id: String,
        doctor: FfiNewDoctor,
    ) -> Result<FfiDoctor, HealthcareError> {
        ActorId::parse(actor_id)?;
        let db = self.db.lock()?;
        Ok(DoctorCatalog::new(&db).create(doctor.into())?.into())
    }

    /// Apply a partial update to a doctor.
    pub fn update_doctor(
        &self,
        actor_id: String,
        doctor_id: String,
        patch: FfiDoctorPatch,
    ) -> Result<FfiDoctor, HealthcareError> {
        ActorId::parse(actor_id)?;
        let db = self.db.lock()?;
        Ok(DoctorCatalog::new(&db)
            .update(&doctor_id, patch.into())?
            .into())
    }

    /// Remove a doctor and every assignment naming them.
    pub fn delete_doctor(&self, actor_id: String, doctor_id: String) -> Result<(), HealthcareError> {
        ActorId::parse(actor_id)?;
        let db = self.db.lock()?;
        DoctorCatalog::new(&db).delete(&doctor_id)?;
        Ok(())
    }

    /// Search doctors by name, specialization or hospital.
    pub fn search_doctors(
        &self,
        actor_id: String,
        query: String,
        limit: u32,
    ) -> Result<Vec<FfiDoctor>, HealthcareError> {
        ActorId::parse(actor_id)?;
        let db = self.db.lock()?;
        let doctors = DoctorCatalog::new(&db).search(&query, limit as usize)?;
        Ok(doctors.into_iter().map(|d| d.into()).collect())
    }

    // =========================================================================
    // Assignment Operations
    // =========================================================================

    /// Assign a doctor to one of the caller's patients.
    pub fn create_mapping(
        &self,
        actor_id: String,
        patient_id: String,
        doctor_id: String,
    ) -> Result<FfiAssignedMapping, HealthcareError> {
        let actor = ActorId::parse(actor_id)?;
        let db = self.db.lock()?;
        let assigned = RelationshipManager::new(&db).create_mapping(&actor, &patient_id, &doctor_id)?;
        Ok(assigned.into())
    }

    /// Remove an assignment the caller made.
    pub fn delete_mapping(&self, actor_id: String, mapping_id: String) -> Result<(), HealthcareError> {
        let actor = ActorId::parse(actor_id)?;
        let db = self.db.lock()?;
        RelationshipManager::new(&db).delete_mapping(&actor, &mapping_id)?;
        Ok(())
    }

    /// List the assignments the caller made.
    pub fn list_mappings(&self, actor_id: String) -> Result<Vec<FfiMappingDetail>, HealthcareError> {
        let actor = ActorId::parse(actor_id)?;
        let db = self.db.lock()?;
        let details = RelationshipManager::new(&db).list_mappings(&actor)?;
        Ok(details.into_iter().map(|d| d.into()).collect())
    }

    /// List the doctors assigned to one of the caller's patients.
    pub fn list_doctors_for_patient(
        &self,
        actor_id: String,
        patient_id: String,
    ) -> Result<FfiPatientDoctors, HealthcareError> {
        let actor = ActorId::parse(actor_id)?;
        let db = self.db.lock()?;
        let listed = RelationshipManager::new(&db).doctors_for_patient(&actor, &patient_id)?;
        Ok(listed.into())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub age: u32,
    pub gender: String,
    pub address: Option<String>,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Patient> for FfiPatient {
    fn from(p: Patient) -> Self {
        Self {
            id: p.id,
            name: p.name,
            email: p.email,
            phone: p.phone,
            age: p.age,
            gender: p.gender.to_string(),
            address: p.address,
            created_by: p.created_by.to_string(),
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Fields for a new patient. `gender` is one of `Male`, `Female`, `Other`.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewPatient {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub age: u32,
    pub gender: String,
    pub address: Option<String>,
}

impl TryFrom<FfiNewPatient> for NewPatient {
    type Error = ValidationErrors;

    fn try_from(p: FfiNewPatient) -> Result<Self, Self::Error> {
        Ok(Self {
            name: p.name,
            email: p.email,
            phone: p.phone,
            age: p.age,
            gender: p.gender.parse()?,
            address: p.address,
        })
    }
}

/// Partial patient update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiPatientPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub address: Option<String>,
}

impl TryFrom<FfiPatientPatch> for PatientPatch {
    type Error = ValidationErrors;

    fn try_from(p: FfiPatientPatch) -> Result<Self, Self::Error> {
        Ok(Self {
            name: p.name,
            email: p.email,
            phone: p.phone,
            age: p.age,
            gender: p.gender.map(|g| g.parse::<Gender>()).transpose()?,
            address: p.address,
        })
    }
}

/// FFI-safe doctor.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDoctor {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub specialization: String,
    pub experience: u32,
    pub hospital: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Doctor> for FfiDoctor {
    fn from(d: Doctor) -> Self {
        Self {
            id: d.id,
            name: d.name,
            email: d.email,
            phone: d.phone,
            specialization: d.specialization,
            experience: d.experience,
            hospital: d.hospital,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewDoctor {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub specialization: String,
    pub experience: u32,
    pub hospital: Option<String>,
}

impl From<FfiNewDoctor> for NewDoctor {
    fn from(d: FfiNewDoctor) -> Self {
        Self {
            name: d.name,
            email: d.email,
            phone: d.phone,
            specialization: d.specialization,
            experience: d.experience,
            hospital: d.hospital,
        }
    }
}

#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiDoctorPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub experience: Option<u32>,
    pub hospital: Option<String>,
}

impl From<FfiDoctorPatch> for DoctorPatch {
    fn from(d: FfiDoctorPatch) -> Self {
        Self {
            name: d.name,
            email: d.email,
            phone: d.phone,
            specialization: d.specialization,
            experience: d.experience,
            hospital: d.hospital,
        }
    }
}

/// FFI-safe assignment.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMapping {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub assigned_by: String,
    pub created_at: String,
}

impl From<Mapping> for FfiMapping {
    fn from(m: Mapping) -> Self {
        Self {
            id: m.id,
            patient_id: m.patient_id,
            doctor_id: m.doctor_id,
            assigned_by: m.assigned_by.to_string(),
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientSummary {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<PatientSummary> for FfiPatientSummary {
    fn from(p: PatientSummary) -> Self {
        Self {
            id: p.id,
            name: p.name,
            email: p.email,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDoctorSummary {
    pub id: String,
    pub name: String,
    pub specialization: String,
    pub hospital: Option<String>,
    pub experience: u32,
}

impl From<DoctorSummary> for FfiDoctorSummary {
    fn from(d: DoctorSummary) -> Self {
        Self {
            id: d.id,
            name: d.name,
            specialization: d.specialization,
            hospital: d.hospital,
            experience: d.experience,
        }
    }
}

/// An assignment with summaries of its patient and doctor.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMappingDetail {
    pub mapping: FfiMapping,
    pub patient: FfiPatientSummary,
    pub doctor: FfiDoctorSummary,
}

impl From<MappingDetail> for FfiMappingDetail {
    fn from(d: MappingDetail) -> Self {
        Self {
            mapping: d.mapping.into(),
            patient: d.patient.into(),
            doctor: d.doctor.into(),
        }
    }
}

/// A new assignment with the full records it links.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAssignedMapping {
    pub mapping: FfiMapping,
    pub patient: FfiPatient,
    pub doctor: FfiDoctor,
}

impl From<AssignedMapping> for FfiAssignedMapping {
    fn from(a: AssignedMapping) -> Self {
        Self {
            mapping: a.mapping.into(),
            patient: a.patient.into(),
            doctor: a.doctor.into(),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientDoctors {
    pub patient_name: String,
    pub doctors: Vec<FfiDoctorSummary>,
}

impl From<PatientDoctors> for FfiPatientDoctors {
    fn from(p: PatientDoctors) -> Self {
        Self {
            patient_name: p.patient,
            doctors: p.doctors.into_iter().map(|d| d.into()).collect(),
        }
    }
}
