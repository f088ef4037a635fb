//! Ownership and isolation integration tests.

use healthcare_core::db::{Database, Filter};
use healthcare_core::error::Error;
use healthcare_core::models::{
    ActorId, EntityKind, Gender, Mapping, NewDoctor, NewPatient, PatientPatch,
};
use healthcare_core::policy::Scope;
use healthcare_core::services::{DoctorCatalog, PatientService, RelationshipManager};
use healthcare_core::validation::MAX_AGE;
use proptest::prelude::*;

fn actor(id: &str) -> ActorId {
    ActorId::parse(id).unwrap()
}

fn make_patient(name: &str, age: u32) -> NewPatient {
    NewPatient {
        name: name.to_string(),
        email: "patient@example.com".to_string(),
        phone: "555-0100".to_string(),
        age,
        gender: Gender::Female,
        address: None,
    }
}

fn make_doctor(name: &str) -> NewDoctor {
    NewDoctor {
        name: name.to_string(),
        email: "doctor@hospital.example".to_string(),
        phone: "555-0142".to_string(),
        specialization: "General Practice".to_string(),
        experience: 10,
        hospital: None,
    }
}

fn all_mappings(db: &Database) -> Vec<Mapping> {
    db.find_by_filter(Filter::new(), Scope::Unscoped).unwrap()
}

#[test]
fn test_foreign_patient_is_not_found_everywhere() {
    let db = Database::open_in_memory().unwrap();
    let patients = PatientService::new(&db);
    let (a, b) = (actor("alice"), actor("bob"));
    let patient = patients.create(&a, make_patient("Max", 30)).unwrap();

    let patch = PatientPatch {
        name: Some("Hijacked".to_string()),
        ..Default::default()
    };
    assert!(matches!(patients.get(&b, &patient.id), Err(Error::NotFound(EntityKind::Patient))));
    assert!(matches!(
        patients.update(&b, &patient.id, patch),
        Err(Error::NotFound(EntityKind::Patient))
    ));
    assert!(matches!(patients.delete(&b, &patient.id), Err(Error::NotFound(EntityKind::Patient))));

    let unchanged = patients.get(&a, &patient.id).unwrap();
    assert_eq!(unchanged, patient);
}

#[test]
fn test_doctors_shared_by_all_actors() {
    let db = Database::open_in_memory().unwrap();
    let catalog = DoctorCatalog::new(&db);

    let doctor = catalog.create(make_doctor("Dr. Shared")).unwrap();
    let renamed = catalog
        .update(
            &doctor.id,
            healthcare_core::models::DoctorPatch {
                name: Some("Dr. Renamed".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(catalog.get(&doctor.id).unwrap(), renamed);
    catalog.delete(&doctor.id).unwrap();
    assert!(catalog.list().unwrap().is_empty());
}

#[test]
fn test_duplicate_assignment_conflicts_across_actors() {
    let db = Database::open_in_memory().unwrap();
    let patients = PatientService::new(&db);
    let catalog = DoctorCatalog::new(&db);
    let manager = RelationshipManager::new(&db);
    let a = actor("alice");

    let patient = patients.create(&a, make_patient("Max", 30)).unwrap();
    let doctor = catalog.create(make_doctor("Dr. Who")).unwrap();
    manager.create_mapping(&a, &patient.id, &doctor.id).unwrap();

    assert!(matches!(
        manager.create_mapping(&a, &patient.id, &doctor.id),
        Err(Error::Conflict(_))
    ));

    // Another actor cannot even reach the pair: the patient is not theirs
    assert!(matches!(
        manager.create_mapping(&actor("bob"), &patient.id, &doctor.id),
        Err(Error::NotFound(EntityKind::Patient))
    ));
    assert_eq!(all_mappings(&db).len(), 1);
}

#[test]
fn test_foreign_mapping_delete_leaves_mapping() {
    let db = Database::open_in_memory().unwrap();
    let manager = RelationshipManager::new(&db);
    let a = actor("alice");
    let patient = PatientService::new(&db)
        .create(&a, make_patient("Max", 30))
        .unwrap();
    let doctor = DoctorCatalog::new(&db).create(make_doctor("Dr. Who")).unwrap();
    let assigned = manager.create_mapping(&a, &patient.id, &doctor.id).unwrap();

    assert!(matches!(
        manager.delete_mapping(&actor("bob"), &assigned.mapping.id),
        Err(Error::NotFound(EntityKind::Mapping))
    ));
    assert_eq!(all_mappings(&db), vec![assigned.mapping.clone()]);
    assert!(manager.list_mappings(&actor("bob")).unwrap().is_empty());
    assert_eq!(manager.list_mappings(&a).unwrap().len(), 1);
}

#[test]
fn test_reads_are_repeatable() {
    let db = Database::open_in_memory().unwrap();
    let a = actor("alice");
    let patients = PatientService::new(&db);
    let manager = RelationshipManager::new(&db);
    let patient = patients.create(&a, make_patient("Max", 30)).unwrap();
    let doctor = DoctorCatalog::new(&db).create(make_doctor("Dr. Who")).unwrap();
    manager.create_mapping(&a, &patient.id, &doctor.id).unwrap();

    assert_eq!(patients.list(&a).unwrap(), patients.list(&a).unwrap());
    assert_eq!(
        patients.get(&a, &patient.id).unwrap(),
        patients.get(&a, &patient.id).unwrap()
    );
    assert_eq!(manager.list_mappings(&a).unwrap(), manager.list_mappings(&a).unwrap());
    assert_eq!(
        manager.doctors_for_patient(&a, &patient.id).unwrap(),
        manager.doctors_for_patient(&a, &patient.id).unwrap()
    );
}

#[test]
fn test_owner_survives_forged_update() {
    let db = Database::open_in_memory().unwrap();
    let a = actor("alice");
    let patient = PatientService::new(&db)
        .create(&a, make_patient("Max", 30))
        .unwrap();

    let mut forged = patient.clone();
    forged.created_by = actor("mallory");
    forged.name = "Max Power".to_string();

    let stored = db.update(&forged, Scope::Actor(&a)).unwrap().unwrap();
    assert_eq!(stored.created_by, a);
    assert_eq!(stored.name, "Max Power");
}

#[test]
fn test_patch_json_cannot_move_ownership() {
    let db = Database::open_in_memory().unwrap();
    let a = actor("alice");
    let patients = PatientService::new(&db);
    let patient = patients.create(&a, make_patient("Max", 30)).unwrap();

    let patch: PatientPatch =
        serde_json::from_str(r#"{"createdBy": "mallory", "age": 31}"#).unwrap();
    let updated = patients.update(&a, &patient.id, patch).unwrap();
    assert_eq!(updated.created_by, a);
    assert_eq!(updated.age, 31);
    assert!(patients.list(&actor("mallory")).unwrap().is_empty());
}

proptest! {
    #[test]
    fn prop_actors_only_list_their_own(counts in proptest::collection::vec(0usize..4, 1..4)) {
        let db = Database::open_in_memory().unwrap();
        let patients = PatientService::new(&db);
        let actors: Vec<ActorId> = (0..counts.len()).map(|i| actor(&format!("actor-{}", i))).collect();

        for (owner, count) in actors.iter().zip(&counts) {
            for n in 0..*count {
                patients.create(owner, make_patient(&format!("Patient {}", n), 20)).unwrap();
            }
        }

        for (owner, count) in actors.iter().zip(&counts) {
            let listed = patients.list(owner).unwrap();
            prop_assert_eq!(listed.len(), *count);
            prop_assert!(listed.iter().all(|p| &p.created_by == owner));
        }
    }

    #[test]
    fn prop_age_bounds(age in 0u32..400) {
        let db = Database::open_in_memory().unwrap();
        let result = PatientService::new(&db).create(&actor("alice"), make_patient("Max", age));
        if age <= MAX_AGE {
            prop_assert!(result.is_ok());
        } else {
            match result {
                Err(Error::Validation(errors)) => prop_assert_eq!(errors.fields(), vec!["age"]),
                other => prop_assert!(false, "unexpected result: {:?}", other),
            }
        }
    }
}
