//! Patient roster export with gestational age as of a given day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::{DbResult, PatientStore};
use crate::gestation::{compute, Trimester};
use crate::models::Patient;

const CSV_HEADER: &str = "id,name,last_menstrual_period,weeks,days,total_days,trimester,due_date,overdue,progress_percent,notes\n";

/// One exported patient row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterRow {
    pub id: String,
    pub name: String,
    pub last_menstrual_period: NaiveDate,
    pub weeks: i64,
    pub days: i64,
    pub total_days: i64,
    pub trimester: Trimester,
    pub due_date: NaiveDate,
    pub is_overdue: bool,
    pub progress_percent: f64,
    pub notes: Option<String>,
}

impl RosterRow {
    /// Compute the row for `patient` as of `as_of`.
    pub fn from_patient(patient: &Patient, as_of: NaiveDate) -> Self {
        let age = compute(patient.last_menstrual_period, as_of);
        Self {
            id: patient.id.clone(),
            name: patient.name.clone(),
            last_menstrual_period: patient.last_menstrual_period,
            weeks: age.weeks,
            days: age.days,
            total_days: age.total_days,
            trimester: age.trimester,
            due_date: age.due_date,
            is_overdue: age.is_overdue,
            progress_percent: age.progress_percent(),
            notes: patient.notes.clone(),
        }
    }

    fn to_csv_line(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{},{:.1},{}\n",
            escape_csv(&self.id),
            escape_csv(&self.name),
            self.last_menstrual_period,
            self.weeks,
            self.days,
            self.total_days,
            self.trimester.number(),
            self.due_date,
            self.is_overdue,
            self.progress_percent,
            escape_csv(self.notes.as_deref().unwrap_or("")),
        )
    }
}

/// Full roster export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterExport {
    /// Export timestamp
    pub exported_at: String,
    /// Day the gestational ages were computed for
    pub as_of: NaiveDate,
    /// Number of rows
    pub patient_count: usize,
    /// Rows past the due date
    pub overdue_count: usize,
    /// One row per patient, newest first
    pub patients: Vec<RosterRow>,
}

impl RosterExport {
    /// Build an export from already loaded patients.
    pub fn from_patients(patients: &[Patient], as_of: NaiveDate) -> Self {
        let rows: Vec<RosterRow> = patients
            .iter()
            .map(|p| RosterRow::from_patient(p, as_of))
            .collect();

        Self {
            exported_at: chrono::Utc::now().to_rfc3339(),
            as_of,
            patient_count: rows.len(),
            overdue_count: rows.iter().filter(|row| row.is_overdue).count(),
            patients: rows,
        }
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format.
    pub fn to_csv(&self) -> String {
        let mut csv = String::from(CSV_HEADER);
        for row in &self.patients {
            csv.push_str(&row.to_csv_line());
        }
        csv
    }
}

/// Roster exporter.
pub struct RosterExporter<'a, S: PatientStore> {
    store: &'a S,
}

impl<'a, S: PatientStore> RosterExporter<'a, S> {
    /// Create a new roster exporter.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Export every stored patient as of `as_of`.
    pub fn export(&self, as_of: NaiveDate) -> DbResult<RosterExport> {
        let patients = self.store.list_patients()?;
        Ok(RosterExport::from_patients(&patients, as_of))
    }
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn make_patient(name: &str, lmp: &str) -> Patient {
        Patient::new(name.into(), date(lmp), None)
    }

    #[test]
    fn test_row_from_patient() {
        let patient = make_patient("Amara", "2024-01-01");
        let row = RosterRow::from_patient(&patient, date("2024-04-08"));

        assert_eq!(row.weeks, 14);
        assert_eq!(row.days, 0);
        assert_eq!(row.total_days, 98);
        assert_eq!(row.trimester, Trimester::Second);
        assert_eq!(row.due_date, date("2024-10-07"));
        assert!(!row.is_overdue);
        assert!((row.progress_percent - 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_roster_json() {
        let export = RosterExport::from_patients(
            &[make_patient("Amara", "2024-01-01")],
            date("2024-04-08"),
        );

        let json = export.to_json().unwrap();
        assert!(json.contains("Amara"));
        assert!(json.contains("\"due_date\": \"2024-10-07\""));
        assert!(json.contains("\"trimester\": 2"));
    }

    #[test]
    fn test_roster_csv() {
        let mut with_notes = make_patient("Okafor, Amara", "2023-01-01");
        with_notes.notes = Some("Said \"soon\"".into());

        let export = RosterExport::from_patients(
            &[make_patient("Beatrice", "2024-01-01"), with_notes],
            date("2024-01-01"),
        );

        let csv = export.to_csv();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3); // Header + 2 patients
        assert!(lines[0].starts_with("id,name"));
        assert!(lines[1].contains(",Beatrice,2024-01-01,0,0,0,1,2024-10-07,false,0.0,"));
        assert!(lines[2].contains("\"Okafor, Amara\""));
        assert!(lines[2].contains(",true,100.0,\"Said \"\"soon\"\"\""));
        assert_eq!(export.overdue_count, 1);
    }

    #[test]
    fn test_csv_escaping() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(escape_csv("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_exporter_reads_store() {
        let db = Database::open_in_memory().unwrap();
        db.insert_patient(&make_patient("Amara", "2024-01-01")).unwrap();
        db.insert_patient(&make_patient("Beatrice", "2024-02-01")).unwrap();

        let export = RosterExporter::new(&db).export(date("2024-04-08")).unwrap();

        assert_eq!(export.patient_count, 2);
        assert_eq!(export.as_of, date("2024-04-08"));
    }
}
