//! Table mappings for each record kind.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, Value, ValueRef};
use rusqlite::Row;

use super::Record;
use crate::models::{ActorId, Doctor, EntityKind, Gender, Mapping, Patient};
use crate::validation::ValidationErrors;

impl FromSql for Gender {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: ValidationErrors| FromSqlError::Other(Box::new(e)))
    }
}

impl FromSql for ActorId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        String::column_result(value).map(ActorId::from_stored)
    }
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

impl Record for Patient {
    const KIND: EntityKind = EntityKind::Patient;
    const TABLE: &'static str = "patients";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "email",
        "phone",
        "age",
        "gender",
        "address",
        "created_by",
        "created_at",
        "updated_at",
    ];
    const FIXED_COLUMNS: &'static [&'static str] = &["id", "created_by", "created_at"];

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Patient {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
            age: row.get(4)?,
            gender: row.get(5)?,
            address: row.get(6)?,
            created_by: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::from(self.id.clone()),
            Value::from(self.name.trim().to_string()),
            Value::from(self.email.trim().to_string()),
            Value::from(self.phone.trim().to_string()),
            Value::from(self.age),
            Value::from(self.gender.as_str().to_string()),
            Value::from(trimmed(self.address.as_deref())),
            Value::from(self.created_by.as_str().to_string()),
            Value::from(self.created_at.clone()),
            Value::from(self.updated_at.clone()),
        ]
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        Patient::validate(self)
    }
}

impl Record for Doctor {
    const KIND: EntityKind = EntityKind::Doctor;
    const TABLE: &'static str = "doctors";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "email",
        "phone",
        "specialization",
        "experience",
        "hospital",
        "created_at",
        "updated_at",
    ];
    const FIXED_COLUMNS: &'static [&'static str] = &["id", "created_at"];

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Doctor {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
            specialization: row.get(4)?,
            experience: row.get(5)?,
            hospital: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::from(self.id.clone()),
            Value::from(self.name.trim().to_string()),
            Value::from(self.email.trim().to_string()),
            Value::from(self.phone.trim().to_string()),
            Value::from(self.specialization.trim().to_string()),
            Value::from(self.experience),
            Value::from(trimmed(self.hospital.as_deref())),
            Value::from(self.created_at.clone()),
            Value::from(self.updated_at.clone()),
        ]
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        Doctor::validate(self)
    }
}

/// Mappings are immutable; the schema rejects any `UPDATE` on them.
impl Record for Mapping {
    const KIND: EntityKind = EntityKind::Mapping;
    const TABLE: &'static str = "mappings";
    const COLUMNS: &'static [&'static str] =
        &["id", "patient_id", "doctor_id", "assigned_by", "created_at"];
    const FIXED_COLUMNS: &'static [&'static str] = &["id", "assigned_by", "created_at"];

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Mapping {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            doctor_id: row.get(2)?,
            assigned_by: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::from(self.id.clone()),
            Value::from(self.patient_id.clone()),
            Value::from(self.doctor_id.clone()),
            Value::from(self.assigned_by.as_str().to_string()),
            Value::from(self.created_at.clone()),
        ]
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        Mapping::validate(self)
    }
}
