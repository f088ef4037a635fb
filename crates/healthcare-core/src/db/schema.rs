//! SQLite schema definition.

/// Complete database schema for the records store.
pub const SCHEMA: &str = r#"
-- Enable foreign keys (per connection; cascades depend on it)
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Patients (owned by created_by)
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    email TEXT NOT NULL,
    phone TEXT NOT NULL,
    age INTEGER NOT NULL CHECK (age BETWEEN 0 AND 150),
    gender TEXT NOT NULL CHECK (gender IN ('Male', 'Female', 'Other')),
    address TEXT,
    created_by TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_patients_created_by ON patients(created_by);

-- Owner never changes after insert
CREATE TRIGGER IF NOT EXISTS patients_owner_immutable BEFORE UPDATE OF created_by ON patients
WHEN new.created_by IS NOT old.created_by
BEGIN
    SELECT RAISE(ABORT, 'Patient owner cannot be changed');
END;

-- ============================================================================
-- Doctors (shared catalog)
-- ============================================================================

CREATE TABLE IF NOT EXISTS doctors (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    email TEXT NOT NULL,
    phone TEXT NOT NULL,
    specialization TEXT NOT NULL,
    experience INTEGER NOT NULL CHECK (experience >= 0),
    hospital TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- FTS5 virtual table for catalog search
CREATE VIRTUAL TABLE IF NOT EXISTS doctors_fts USING fts5(
    name,
    specialization,
    hospital,
    content='doctors',
    content_rowid='rowid'
);

-- Triggers to keep FTS5 in sync with main table
CREATE TRIGGER IF NOT EXISTS doctors_ai AFTER INSERT ON doctors BEGIN
    INSERT INTO doctors_fts(rowid, name, specialization, hospital)
    VALUES (new.rowid, new.name, new.specialization, new.hospital);
END;

CREATE TRIGGER IF NOT EXISTS doctors_ad AFTER DELETE ON doctors BEGIN
    INSERT INTO doctors_fts(doctors_fts, rowid, name, specialization, hospital)
    VALUES ('delete', old.rowid, old.name, old.specialization, old.hospital);
END;

CREATE TRIGGER IF NOT EXISTS doctors_au AFTER UPDATE ON doctors BEGIN
    INSERT INTO doctors_fts(doctors_fts, rowid, name, specialization, hospital)
    VALUES ('delete', old.rowid, old.name, old.specialization, old.hospital);
    INSERT INTO doctors_fts(rowid, name, specialization, hospital)
    VALUES (new.rowid, new.name, new.specialization, new.hospital);
END;

-- ============================================================================
-- Mappings (owned by assigned_by; one per patient/doctor pair)
-- ============================================================================

CREATE TABLE IF NOT EXISTS mappings (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
    doctor_id TEXT NOT NULL REFERENCES doctors(id) ON DELETE CASCADE,
    assigned_by TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE (patient_id, doctor_id)
);

CREATE INDEX IF NOT EXISTS idx_mappings_assigned_by ON mappings(assigned_by);
CREATE INDEX IF NOT EXISTS idx_mappings_doctor ON mappings(doctor_id);

-- Assignments are never edited in place
CREATE TRIGGER IF NOT EXISTS mappings_immutable BEFORE UPDATE ON mappings
BEGIN
    SELECT RAISE(ABORT, 'Mappings cannot be updated');
END;
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn
    }

    fn insert_patient(conn: &Connection, id: &str) {
        conn.execute(
            "INSERT INTO patients (id, name, email, phone, age, gender, created_by) VALUES (?, 'Ada', 'a@b.co', '555-0100', 36, 'Female', 'user-a')",
            [id],
        )
        .unwrap();
    }

    fn insert_doctor(conn: &Connection, id: &str) {
        conn.execute(
            "INSERT INTO doctors (id, name, email, phone, specialization, experience) VALUES (?, 'Dr. Hopper', 'g@h.co', '555-0142', 'Cardiology', 12)",
            [id],
        )
        .unwrap();
    }

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_schema_idempotent() {
        let conn = setup();
        assert!(conn.execute_batch(SCHEMA).is_ok());
    }

    #[test]
    fn test_check_constraints() {
        let conn = setup();

        let result = conn.execute(
            "INSERT INTO patients (id, name, email, phone, age, gender, created_by) VALUES ('p1', 'Ada', 'a@b.co', '555', 151, 'Female', 'u')",
            [],
        );
        assert!(result.is_err());

        let result = conn.execute(
            "INSERT INTO patients (id, name, email, phone, age, gender, created_by) VALUES ('p1', 'Ada', 'a@b.co', '555', 30, 'Unknown', 'u')",
            [],
        );
        assert!(result.is_err());

        let result = conn.execute(
            "INSERT INTO doctors (id, name, email, phone, specialization, experience) VALUES ('d1', 'X', 'x@y.co', '555', 'GP', -1)",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_pair_unique() {
        let conn = setup();
        insert_patient(&conn, "p1");
        insert_doctor(&conn, "d1");

        conn.execute(
            "INSERT INTO mappings (id, patient_id, doctor_id, assigned_by) VALUES ('m1', 'p1', 'd1', 'user-a')",
            [],
        )
        .unwrap();
        let result = conn.execute(
            "INSERT INTO mappings (id, patient_id, doctor_id, assigned_by) VALUES ('m2', 'p1', 'd1', 'user-b')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_mapping_requires_existing_refs() {
        let conn = setup();
        insert_doctor(&conn, "d1");
        let result = conn.execute(
            "INSERT INTO mappings (id, patient_id, doctor_id, assigned_by) VALUES ('m1', 'missing', 'd1', 'user-a')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_patient_delete_cascades() {
        let conn = setup();
        insert_patient(&conn, "p1");
        insert_doctor(&conn, "d1");
        conn.execute(
            "INSERT INTO mappings (id, patient_id, doctor_id, assigned_by) VALUES ('m1', 'p1', 'd1', 'user-a')",
            [],
        )
        .unwrap();

        conn.execute("DELETE FROM patients WHERE id = 'p1'", []).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM mappings", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_owner_immutable() {
        let conn = setup();
        insert_patient(&conn, "p1");
        let result = conn.execute("UPDATE patients SET created_by = 'user-b' WHERE id = 'p1'", []);
        assert!(result.is_err());
        assert!(conn
            .execute("UPDATE patients SET name = 'Ada L' WHERE id = 'p1'", [])
            .is_ok());
    }

    #[test]
    fn test_fts_trigger() {
        let conn = setup();
        insert_doctor(&conn, "d1");

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM doctors_fts WHERE doctors_fts MATCH 'cardiology'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }
}
