//! Assignment read paths that join mappings with their patient and doctor.

use rusqlite::Row;

use super::{Database, DbResult};
use crate::models::{ActorId, DoctorSummary, Mapping, MappingDetail, PatientSummary};

impl Database {
    /// Assignments made by `assigned_by`, with both sides summarized, oldest first.
    pub fn list_mapping_details(&self, assigned_by: &ActorId) -> DbResult<Vec<MappingDetail>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT m.id, m.patient_id, m.doctor_id, m.assigned_by, m.created_at,
                   p.name, p.email,
                   d.name, d.specialization, d.hospital, d.experience
            FROM mappings m
            JOIN patients p ON p.id = m.patient_id
            JOIN doctors d ON d.id = m.doctor_id
            WHERE m.assigned_by = ?1
            ORDER BY m.created_at, m.rowid
            "#,
        )?;

        let rows = stmt.query_map([assigned_by.as_str()], mapping_detail_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Every doctor assigned to `patient_id`, whoever assigned them.
    ///
    /// Callers must have established that the actor owns the patient.
    pub fn list_doctors_for_patient(&self, patient_id: &str) -> DbResult<Vec<DoctorSummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT d.id, d.name, d.specialization, d.hospital, d.experience
            FROM mappings m
            JOIN doctors d ON d.id = m.doctor_id
            WHERE m.patient_id = ?1
            ORDER BY m.created_at, m.rowid
            "#,
        )?;

        let rows = stmt.query_map([patient_id], |row| {
            Ok(DoctorSummary {
                id: row.get(0)?,
                name: row.get(1)?,
                specialization: row.get(2)?,
                hospital: row.get(3)?,
                experience: row.get(4)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

fn mapping_detail_from_row(row: &Row<'_>) -> rusqlite::Result<MappingDetail> {
    let mapping = Mapping {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        doctor_id: row.get(2)?,
        assigned_by: row.get(3)?,
        created_at: row.get(4)?,
    };
    Ok(MappingDetail {
        patient: PatientSummary {
            id: mapping.patient_id.clone(),
            name: row.get(5)?,
            email: row.get(6)?,
        },
        doctor: DoctorSummary {
            id: mapping.doctor_id.clone(),
            name: row.get(7)?,
            specialization: row.get(8)?,
            hospital: row.get(9)?,
            experience: row.get(10)?,
        },
        mapping,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Doctor, Gender, NewDoctor, NewPatient, Patient};

    fn actor(id: &str) -> ActorId {
        ActorId::parse(id).unwrap()
    }

    fn seed_patient(db: &Database, owner: &ActorId, name: &str) -> Patient {
        let patient = Patient::new(
            NewPatient {
                name: name.into(),
                email: format!("{}@example.com", name.to_lowercase()),
                phone: "555-0100".into(),
                age: 50,
                gender: Gender::Male,
                address: None,
            },
            owner.clone(),
        );
        db.insert(&patient).unwrap();
        patient
    }

    fn seed_doctor(db: &Database, name: &str) -> Doctor {
        let doctor = Doctor::new(NewDoctor {
            name: name.into(),
            email: "doc@hospital.example".into(),
            phone: "555-0142".into(),
            specialization: "Cardiology".into(),
            experience: 20,
            hospital: Some("General".into()),
        });
        db.insert(&doctor).unwrap();
        doctor
    }

    #[test]
    fn test_details_scoped_to_assigner() {
        let db = Database::open_in_memory().unwrap();
        let (a, b) = (actor("a"), actor("b"));
        let patient = seed_patient(&db, &a, "Max");
        let doctor = seed_doctor(&db, "Dr. Who");
        db.insert(&Mapping::new(patient.id.clone(), doctor.id.clone(), a.clone()))
            .unwrap();

        let mine = db.list_mapping_details(&a).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].patient.name, "Max");
        assert_eq!(mine[0].patient.email, "max@example.com");
        assert_eq!(mine[0].doctor.name, "Dr. Who");
        assert_eq!(mine[0].mapping.assigned_by, a);

        assert!(db.list_mapping_details(&b).unwrap().is_empty());
    }

    #[test]
    fn test_doctors_for_patient_spans_assigners() {
        let db = Database::open_in_memory().unwrap();
        let (a, b) = (actor("a"), actor("b"));
        let patient = seed_patient(&db, &a, "Max");
        let first = seed_doctor(&db, "Dr. One");
        let second = seed_doctor(&db, "Dr. Two");
        db.insert(&Mapping::new(patient.id.clone(), first.id.clone(), a))
            .unwrap();
        db.insert(&Mapping::new(patient.id.clone(), second.id.clone(), b))
            .unwrap();

        let doctors = db.list_doctors_for_patient(&patient.id).unwrap();
        let names: Vec<_> = doctors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Dr. One", "Dr. Two"]);
        assert_eq!(doctors[0].experience, 20);
    }
}
