//! Patient database operations.

use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use super::{Database, DbResult, PatientStore};
use crate::models::Patient;

const PATIENT_COLUMNS: &str =
    "id, name, last_menstrual_period, notes, created_at, updated_at";

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        name: row.get(1)?,
        last_menstrual_period: row.get(2)?,
        notes: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

impl PatientStore for Database {
    fn insert_patient(&self, patient: &Patient) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO patients (
                id, name, last_menstrual_period, notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                patient.id,
                patient.name,
                patient.last_menstrual_period,
                patient.notes,
                patient.created_at,
                patient.updated_at,
            ],
        )?;
        debug!(id = %patient.id, "inserted patient");
        Ok(())
    }

    fn get_patient(&self, id: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM patients WHERE id = ?", PATIENT_COLUMNS),
                [id],
                patient_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    fn list_patients(&self) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM patients ORDER BY created_at DESC, rowid DESC",
            PATIENT_COLUMNS
        ))?;

        let rows = stmt.query_map([], patient_from_row)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn update_patient(&self, patient: &Patient) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE patients SET
                name = ?2,
                last_menstrual_period = ?3,
                notes = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
            params![
                patient.id,
                patient.name,
                patient.last_menstrual_period,
                patient.notes,
                patient.updated_at,
            ],
        )?;
        debug!(id = %patient.id, rows_affected, "updated patient");
        Ok(rows_affected > 0)
    }

    fn delete_patient(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM patients WHERE id = ?", [id])?;
        debug!(id, rows_affected, "deleted patient");
        Ok(rows_affected > 0)
    }
}

impl Database {
    /// Search patients by name (prefix match).
    ///
    /// `query` is matched literally; `%` and `_` are not wildcards.
    pub fn search_patients(&self, query: &str, limit: usize) -> DbResult<Vec<Patient>> {
        let pattern = format!("{}%", escape_like(query));
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM patients WHERE name LIKE ? ESCAPE '\\' ORDER BY name LIMIT ?",
            PATIENT_COLUMNS
        ))?;

        let rows = stmt.query_map(params![pattern, limit as i64], patient_from_row)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Count stored patients.
    pub fn count_patients(&self) -> DbResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Escape LIKE metacharacters with a backslash.
fn escape_like(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let db = setup_db();

        let patient = Patient::new("Amara".into(), date("2024-01-01"), Some("G2P1".into()));
        db.insert_patient(&patient).unwrap();

        let retrieved = db.get_patient(&patient.id).unwrap().unwrap();
        assert_eq!(retrieved, patient);
        assert_eq!(retrieved.last_menstrual_period, date("2024-01-01"));
    }

    #[test]
    fn test_lmp_stored_as_iso_date() {
        let db = setup_db();

        let patient = Patient::new("Amara".into(), date("2024-02-29"), None);
        db.insert_patient(&patient).unwrap();

        let raw: String = db
            .conn()
            .query_row(
                "SELECT last_menstrual_period FROM patients WHERE id = ?",
                [&patient.id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(raw, "2024-02-29");
    }

    #[test]
    fn test_get_missing() {
        let db = setup_db();
        assert!(db.get_patient("nope").unwrap().is_none());
    }

    #[test]
    fn test_update_patient() {
        let db = setup_db();

        let mut patient = Patient::new("Amara".into(), date("2024-01-01"), None);
        db.insert_patient(&patient).unwrap();

        patient.name = "Amara Okafor".into();
        patient.last_menstrual_period = date("2024-01-08");
        patient.notes = Some("Twins".into());
        patient.touch();
        assert!(db.update_patient(&patient).unwrap());

        let retrieved = db.get_patient(&patient.id).unwrap().unwrap();
        assert_eq!(retrieved.name, "Amara Okafor");
        assert_eq!(retrieved.last_menstrual_period, date("2024-01-08"));
        assert_eq!(retrieved.notes, Some("Twins".into()));
        assert_eq!(retrieved.updated_at, patient.updated_at);
    }

    #[test]
    fn test_update_missing() {
        let db = setup_db();
        let patient = Patient::new("Ghost".into(), date("2024-01-01"), None);
        assert!(!db.update_patient(&patient).unwrap());
    }

    #[test]
    fn test_delete_patient() {
        let db = setup_db();

        let patient = Patient::new("Amara".into(), date("2024-01-01"), None);
        db.insert_patient(&patient).unwrap();

        assert!(db.delete_patient(&patient.id).unwrap());
        assert!(db.get_patient(&patient.id).unwrap().is_none());
        assert!(!db.delete_patient(&patient.id).unwrap());
    }

    #[test]
    fn test_list_newest_first() {
        let db = setup_db();

        let first = Patient::new("First".into(), date("2024-01-01"), None);
        let second = Patient::new("Second".into(), date("2024-02-01"), None);
        db.insert_patient(&first).unwrap();
        db.insert_patient(&second).unwrap();

        let names: Vec<_> = db
            .list_patients()
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Second", "First"]);
    }

    #[test]
    fn test_search_patients() {
        let db = setup_db();

        db.insert_patient(&Patient::new("Amara".into(), date("2024-01-01"), None))
            .unwrap();
        db.insert_patient(&Patient::new("Amaya".into(), date("2024-01-01"), None))
            .unwrap();
        db.insert_patient(&Patient::new("Beatrice".into(), date("2024-01-01"), None))
            .unwrap();

        let results = db.search_patients("Ama", 10).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().any(|p| p.name == "Amara"));
        assert!(results.iter().any(|p| p.name == "Amaya"));
        assert_eq!(db.count_patients().unwrap(), 3);
    }

    #[test]
    fn test_search_is_literal() {
        let db = setup_db();

        db.insert_patient(&Patient::new("Amara".into(), date("2024-01-01"), None))
            .unwrap();
        db.insert_patient(&Patient::new("Beatrice".into(), date("2024-01-01"), None))
            .unwrap();
        db.insert_patient(&Patient::new("100% Sure".into(), date("2024-01-01"), None))
            .unwrap();

        assert!(db.search_patients("_ma", 10).unwrap().is_empty());
        assert!(db.search_patients("\\", 10).unwrap().is_empty());

        let results = db.search_patients("%", 10).unwrap();
        assert!(results.is_empty());

        let results = db.search_patients("100%", 10).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "100% Sure");
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("Amara"), "Amara");
        assert_eq!(escape_like("50%_a\\b"), "50\\%\\_a\\\\b");
    }
}
