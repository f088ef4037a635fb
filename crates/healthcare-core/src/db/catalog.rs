//! Doctor catalog search.

use rusqlite::params;

use super::{Database, DbResult, Record};
use crate::models::Doctor;

impl Database {
    /// Search doctors by name, specialization or hospital using FTS5 (BM25 ranking).
    pub fn search_doctors(&self, query: &str, limit: usize) -> DbResult<Vec<Doctor>> {
        let escaped_query = escape_fts_query(query);
        if escaped_query.is_empty() {
            return Ok(Vec::new());
        }

        let columns: Vec<String> = Doctor::COLUMNS.iter().map(|c| format!("d.{}", c)).collect();
        let sql = format!(
            r#"
            SELECT {}
            FROM doctors d
            JOIN doctors_fts fts ON d.rowid = fts.rowid
            WHERE doctors_fts MATCH ?1
            ORDER BY bm25(doctors_fts)
            LIMIT ?2
            "#,
            columns.join(", ")
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![escaped_query, limit as i64], |row| {
            Doctor::from_row(row)
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

/// Escape special FTS5 characters and prepare query for prefix matching.
///
/// Each word is quoted so bare keywords such as `OR` stay search terms.
fn escape_fts_query(query: &str) -> String {
    let cleaned: String = query
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    cleaned
        .split_whitespace()
        .map(|word| format!("\"{}\"*", word))
        .collect::<Vec<_>>()
        .join(" ")
}
