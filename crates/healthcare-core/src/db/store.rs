//! Generic record storage.
//!
//! One set of CRUD operations serves every record kind. Scoped operations
//! carry the kind's owner predicate in their `WHERE` clause, so ownership is
//! decided by the query itself.

use rusqlite::types::Value;
use rusqlite::{params_from_iter, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::EntityKind;
use crate::policy::{AccessControlled, Scope};
use crate::validation::ValidationErrors;

/// A record kind persisted in its own table.
pub trait Record: AccessControlled + Sized {
    const KIND: EntityKind;
    const TABLE: &'static str;
    /// Every column, in the order of [`Record::to_values`]. `id` comes first.
    const COLUMNS: &'static [&'static str];
    /// Columns never rewritten by [`Database::update`].
    const FIXED_COLUMNS: &'static [&'static str];

    fn id(&self) -> &str;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    fn to_values(&self) -> Vec<Value>;

    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Equality conditions joined with `AND`.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    conditions: Vec<(&'static str, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id(id: &str) -> Self {
        Self::new().eq("id", id)
    }

    /// Require `column = value`.
    pub fn eq(mut self, column: &'static str, value: impl Into<String>) -> Self {
        self.conditions.push((column, Value::Text(value.into())));
        self
    }

    /// Add the owner predicate `R` requires under `scope`.
    fn scoped<R: Record>(mut self, scope: Scope<'_>) -> Self {
        if let Some((column, owner)) = R::OWNERSHIP.predicate(scope) {
            self.conditions.push((column, Value::Text(owner)));
        }
        self
    }

    /// `WHERE` clause numbering placeholders from `?{first}`.
    fn where_sql(&self, first: usize) -> String {
        if self.conditions.is_empty() {
            return String::new();
        }
        let clauses: Vec<String> = self
            .conditions
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{} = ?{}", column, first + i))
            .collect();
        format!("WHERE {}", clauses.join(" AND "))
    }

    fn into_values(self) -> impl Iterator<Item = Value> {
        self.conditions.into_iter().map(|(_, value)| value)
    }
}

fn column_list<R: Record>() -> String {
    R::COLUMNS.join(", ")
}

impl Database {
    /// Insert a new record after checking its field constraints.
    ///
    /// Returns the record as stored, with text fields trimmed.
    pub fn insert<R: Record>(&self, record: &R) -> DbResult<R> {
        record.validate()?;

        let placeholders: Vec<String> = (1..=R::COLUMNS.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            R::TABLE,
            column_list::<R>(),
            placeholders.join(", "),
            column_list::<R>()
        );

        let stored = self
            .conn
            .query_row(&sql, params_from_iter(record.to_values()), |row| {
                R::from_row(row)
            })
            .map_err(DbError::from_write)?;
        tracing::debug!(kind = %R::KIND, id = record.id(), "record inserted");
        Ok(stored)
    }

    /// Get a record by ID, if visible under `scope`.
    pub fn find_by_id<R: Record>(&self, id: &str, scope: Scope<'_>) -> DbResult<Option<R>> {
        self.find_one(Filter::by_id(id), scope)
    }

    /// First record matching `filter` under `scope`.
    pub fn find_one<R: Record>(&self, filter: Filter, scope: Scope<'_>) -> DbResult<Option<R>> {
        let filter = filter.scoped::<R>(scope);
        let sql = format!(
            "SELECT {} FROM {} {} LIMIT 1",
            column_list::<R>(),
            R::TABLE,
            filter.where_sql(1)
        );

        let record = self
            .conn
            .query_row(&sql, params_from_iter(filter.into_values()), |row| {
                R::from_row(row)
            })
            .optional()?;

        debug_assert!(record.as_ref().map_or(true, |r| scope.permits(r)));
        Ok(record)
    }

    /// All records matching `filter` under `scope`, oldest first.
    pub fn find_by_filter<R: Record>(&self, filter: Filter, scope: Scope<'_>) -> DbResult<Vec<R>> {
        let filter = filter.scoped::<R>(scope);
        let sql = format!(
            "SELECT {} FROM {} {} ORDER BY created_at, rowid",
            column_list::<R>(),
            R::TABLE,
            filter.where_sql(1)
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(filter.into_values()), |row| R::from_row(row))?;
        let records = rows.collect::<Result<Vec<R>, _>>()?;

        debug_assert!(records.iter().all(|r| scope.permits(r)));
        Ok(records)
    }

    /// Overwrite a stored record with `record`, if visible under `scope`.
    ///
    /// Fixed columns (identifier, owner, creation time) keep their stored
    /// values. Returns the record as stored, or `None` when nothing matched.
    pub fn update<R: Record>(&self, record: &R, scope: Scope<'_>) -> DbResult<Option<R>> {
        record.validate()?;

        let (columns, values): (Vec<&str>, Vec<Value>) = R::COLUMNS
            .iter()
            .zip(record.to_values())
            .filter(|(column, _)| !R::FIXED_COLUMNS.contains(*column))
            .map(|(column, value)| (*column, value))
            .unzip();

        let assignments: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{} = ?{}", column, i + 1))
            .collect();

        let filter = Filter::by_id(record.id()).scoped::<R>(scope);
        let sql = format!(
            "UPDATE {} SET {} {} RETURNING {}",
            R::TABLE,
            assignments.join(", "),
            filter.where_sql(columns.len() + 1),
            column_list::<R>()
        );

        let params = values.into_iter().chain(filter.into_values());
        let updated = self
            .conn
            .query_row(&sql, params_from_iter(params), |row| R::from_row(row))
            .optional()
            .map_err(DbError::from_write)?;

        if updated.is_some() {
            tracing::debug!(kind = %R::KIND, id = record.id(), "record updated");
        }
        Ok(updated)
    }

    /// Delete a record by ID, if visible under `scope`. Returns what was deleted.
    pub fn delete<R: Record>(&self, id: &str, scope: Scope<'_>) -> DbResult<Option<R>> {
        let filter = Filter::by_id(id).scoped::<R>(scope);
        let sql = format!(
            "DELETE FROM {} {} RETURNING {}",
            R::TABLE,
            filter.where_sql(1),
            column_list::<R>()
        );

        let deleted = self
            .conn
            .query_row(&sql, params_from_iter(filter.into_values()), |row| {
                R::from_row(row)
            })
            .optional()
            .map_err(DbError::from_write)?;

        if deleted.is_some() {
            tracing::debug!(kind = %R::KIND, id, "record deleted");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActorId, Doctor, Gender, Mapping, NewDoctor, NewPatient, Patient};

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn actor(id: &str) -> ActorId {
        ActorId::parse(id).unwrap()
    }

    fn patient(owner: &ActorId, name: &str) -> Patient {
        Patient::new(
            NewPatient {
                name: name.into(),
                email: "patient@example.com".into(),
                phone: "555-0100".into(),
                age: 40,
                gender: Gender::Other,
                address: None,
            },
            owner.clone(),
        )
    }

    fn doctor(name: &str) -> Doctor {
        Doctor::new(NewDoctor {
            name: name.into(),
            email: "doc@hospital.example".into(),
            phone: "555-0142".into(),
            specialization: "Neurology".into(),
            experience: 8,
            hospital: Some("General".into()),
        })
    }

    #[test]
    fn test_insert_and_find() {
        let db = setup_db();
        let a = actor("a");
        let mut p = patient(&a, "Max");
        p.name = "  Max ".into();
        let stored = db.insert(&p).unwrap();
        assert_eq!(stored.name, "Max");

        let found: Patient = db.find_by_id(&p.id, Scope::Actor(&a)).unwrap().unwrap();
        assert_eq!(found, stored);
    }

    #[test]
    fn test_scoped_lookup_hides_foreign_records() {
        let db = setup_db();
        let (a, b) = (actor("a"), actor("b"));
        let p = patient(&a, "Max");
        db.insert(&p).unwrap();

        let hidden: Option<Patient> = db.find_by_id(&p.id, Scope::Actor(&b)).unwrap();
        assert!(hidden.is_none());

        let visible: Option<Patient> = db.find_by_id(&p.id, Scope::Unscoped).unwrap();
        assert!(visible.is_some());
    }

    #[test]
    fn test_shared_kind_ignores_actor_scope() {
        let db = setup_db();
        let d = doctor("Dr. Who");
        db.insert(&d).unwrap();

        let found: Option<Doctor> = db.find_by_id(&d.id, Scope::Actor(&actor("b"))).unwrap();
        assert_eq!(found, Some(d));
    }

    #[test]
    fn test_insert_validates() {
        let db = setup_db();
        let mut p = patient(&actor("a"), "Max");
        p.email = "nope".into();
        let err = db.insert(&p).unwrap_err();
        match err {
            DbError::Validation(errors) => assert_eq!(errors.fields(), vec!["email"]),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_find_by_filter_order_and_scope() {
        let db = setup_db();
        let (a, b) = (actor("a"), actor("b"));
        let first = patient(&a, "First");
        let second = patient(&a, "Second");
        db.insert(&first).unwrap();
        db.insert(&second).unwrap();
        db.insert(&patient(&b, "Other")).unwrap();

        let mine: Vec<Patient> = db.find_by_filter(Filter::new(), Scope::Actor(&a)).unwrap();
        let names: Vec<_> = mine.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);

        let all: Vec<Patient> = db.find_by_filter(Filter::new(), Scope::Unscoped).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_update_scoped() {
        let db = setup_db();
        let (a, b) = (actor("a"), actor("b"));
        let p = patient(&a, "Max");
        db.insert(&p).unwrap();

        let mut changed = p.clone();
        changed.age = 41;

        let denied = db.update(&changed, Scope::Actor(&b)).unwrap();
        assert!(denied.is_none());

        let updated = db.update(&changed, Scope::Actor(&a)).unwrap().unwrap();
        assert_eq!(updated.age, 41);
    }

    #[test]
    fn test_update_keeps_fixed_columns() {
        let db = setup_db();
        let a = actor("a");
        let p = patient(&a, "Max");
        db.insert(&p).unwrap();

        let mut forged = p.clone();
        forged.created_by = actor("b");
        forged.created_at = "1970-01-01T00:00:00Z".into();

        let updated = db.update(&forged, Scope::Unscoped).unwrap().unwrap();
        assert_eq!(updated.created_by, a);
        assert_eq!(updated.created_at, p.created_at);
    }

    #[test]
    fn test_update_revalidates() {
        let db = setup_db();
        let a = actor("a");
        let p = patient(&a, "Max");
        db.insert(&p).unwrap();

        let mut changed = p.clone();
        changed.age = 200;
        assert!(matches!(
            db.update(&changed, Scope::Actor(&a)),
            Err(DbError::Validation(_))
        ));
    }

    #[test]
    fn test_delete_twice() {
        let db = setup_db();
        let d = doctor("Dr. Who");
        db.insert(&d).unwrap();

        let deleted: Option<Doctor> = db.delete(&d.id, Scope::Unscoped).unwrap();
        assert_eq!(deleted.map(|r| r.id), Some(d.id.clone()));

        let again: Option<Doctor> = db.delete(&d.id, Scope::Unscoped).unwrap();
        assert!(again.is_none());
    }

    #[test]
    fn test_duplicate_pair_is_duplicate_error() {
        let db = setup_db();
        let (a, b) = (actor("a"), actor("b"));
        let p = patient(&a, "Max");
        let d = doctor("Dr. Who");
        db.insert(&p).unwrap();
        db.insert(&d).unwrap();

        db.insert(&Mapping::new(p.id.clone(), d.id.clone(), a)).unwrap();
        let err = db
            .insert(&Mapping::new(p.id.clone(), d.id.clone(), b))
            .unwrap_err();
        assert!(matches!(err, DbError::Duplicate(_)));
    }

    #[test]
    fn test_find_one_by_pair() {
        let db = setup_db();
        let a = actor("a");
        let p = patient(&a, "Max");
        let d = doctor("Dr. Who");
        db.insert(&p).unwrap();
        db.insert(&d).unwrap();
        let m = Mapping::new(p.id.clone(), d.id.clone(), a);
        db.insert(&m).unwrap();

        let pair = Filter::new()
            .eq("patient_id", p.id.as_str())
            .eq("doctor_id", d.id.as_str());
        let found: Option<Mapping> = db.find_one(pair, Scope::Unscoped).unwrap();
        assert_eq!(found, Some(m));
    }

    #[test]
    fn test_where_sql_numbering() {
        let filter = Filter::new().eq("a", "1").eq("b", "2");
        assert_eq!(filter.where_sql(3), "WHERE a = ?3 AND b = ?4");
        assert_eq!(Filter::new().where_sql(1), "");
    }
}
