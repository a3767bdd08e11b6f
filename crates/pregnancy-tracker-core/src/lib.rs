//! Pregnancy Tracker Core Library
//!
//! Local-first patient tracking with gestational age computed from the last
//! menstrual period (LMP).
//!
//! # Architecture
//!
//! ```text
//!   Add / Edit dialog                         Patient list
//!          │                                       ▲
//!          ▼                                       │
//!    PatientForm::validate              PatientCard (name, LMP,
//!          │                            weeks + days, trimester,
//!          ▼                            due date, overdue)
//!    PatientRegistry ──► SQLite                    ▲
//!                       (id, name, LMP, notes)     │
//!                              │                   │
//!                              └──► gestation::compute(lmp, today)
//! ```
//!
//! # Core Principle
//!
//! **Gestational age is never stored.** Only the LMP is persisted; every view
//! recomputes the age against an explicit "today".
//!
//! # Modules
//!
//! - [`gestation`]: Pure gestational age engine and display summary
//! - [`models`]: Domain types (Patient, PatientForm, PatientCard)
//! - [`db`]: SQLite persistence behind the [`PatientStore`] trait
//! - [`registry`]: Validated CRUD with user-facing notices
//! - [`export`]: Roster export (JSON / CSV)
//! - [`config`]: Environment configuration

pub mod config;
pub mod db;
pub mod export;
pub mod gestation;
pub mod models;
pub mod registry;

// Re-export commonly used types
pub use config::TrackerConfig;
pub use db::{Database, PatientStore};
pub use export::{RosterExport, RosterExporter};
pub use gestation::{compute, compute_today, parse_lmp, GestationSummary, GestationalAge, Trimester};
pub use models::{Patient, PatientCard, PatientForm, ValidationError, ValidationErrors};
pub use registry::{Operation, PatientRegistry, RegistryError};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDate};
use tracing::error;
use tracing_subscriber::EnvFilter;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum TrackerError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl TrackerError {
    /// Map a registry failure to what the user should see, logging the cause.
    fn from_registry(e: RegistryError, operation: Operation) -> Self {
        error!(?operation, error = %e, "patient operation failed");
        match e {
            RegistryError::Validation(_) => TrackerError::InvalidInput(e.notice(operation)),
            RegistryError::NotFound(id) => TrackerError::NotFound(id),
            RegistryError::Database(_) => TrackerError::DatabaseError(e.notice(operation)),
        }
    }
}

impl From<db::DbError> for TrackerError {
    fn from(e: db::DbError) -> Self {
        TrackerError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(e: serde_json::Error) -> Self {
        TrackerError::SerializationError(e.to_string())
    }
}

impl From<gestation::GestationError> for TrackerError {
    fn from(e: gestation::GestationError) -> Self {
        TrackerError::InvalidInput(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for TrackerError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        TrackerError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

/// The host app's current calendar day.
fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn parse_optional_day(day: Option<String>) -> Result<NaiveDate, TrackerError> {
    match day {
        Some(day) => Ok(parse_lmp(&day)?),
        None => Ok(today()),
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Install a stderr log subscriber. Returns false if one was already set.
#[uniffi::export]
pub fn init_logging(filter: Option<String>) -> bool {
    let filter = filter.unwrap_or_else(|| config::DEFAULT_LOG_FILTER.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .try_init()
        .is_ok()
}

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<PregnancyTrackerCore>, TrackerError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(PregnancyTrackerCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<PregnancyTrackerCore>, TrackerError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(PregnancyTrackerCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Open the database named by the environment, installing logging first.
#[uniffi::export]
pub fn open_from_env() -> Result<Arc<PregnancyTrackerCore>, TrackerError> {
    init_logging(Some(TrackerConfig::log_filter_from_env()));
    let config = TrackerConfig::from_env();
    let db = Database::open(&config.database_path)?;
    Ok(Arc::new(PregnancyTrackerCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Gestational age for an LMP (`yyyy-MM-dd`), as of `today` or the
/// current date when omitted.
#[uniffi::export]
pub fn calculate_gestational_age(
    lmp: String,
    today: Option<String>,
) -> Result<FfiGestationalAge, TrackerError> {
    let lmp = parse_lmp(&lmp)?;
    let today = parse_optional_day(today)?;
    Ok(GestationSummary::new(lmp, today).into())
}

/// Notification text to show after `operation` succeeds.
#[uniffi::export]
pub fn success_notice(operation: Operation) -> String {
    operation.success_message().to_string()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct PregnancyTrackerCore {
    db: Arc<Mutex<Database>>,
}

#[uniffi::export]
impl PregnancyTrackerCore {
    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Validate and add a new patient.
    pub fn create_patient(
        &self,
        name: String,
        last_menstrual_period: String,
        notes: Option<String>,
    ) -> Result<FfiPatient, TrackerError> {
        let form = PatientForm::from_input(name, &last_menstrual_period, notes)
            .map_err(|e| TrackerError::from_registry(e.into(), Operation::Create))?;
        let db = self.db.lock()?;
        let registry = PatientRegistry::new(&*db);
        let patient = registry
            .create_patient(&form, today())
            .map_err(|e| TrackerError::from_registry(e, Operation::Create))?;
        Ok(patient.into())
    }

    /// All patients, newest first.
    pub fn list_patients(&self) -> Result<Vec<FfiPatient>, TrackerError> {
        let db = self.db.lock()?;
        let registry = PatientRegistry::new(&*db);
        let patients = registry
            .list_patients()
            .map_err(|e| TrackerError::from_registry(e, Operation::List))?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: String) -> Result<Option<FfiPatient>, TrackerError> {
        let db = self.db.lock()?;
        let patient = db.get_patient(&id)?;
        Ok(patient.map(|p| p.into()))
    }

    /// Validate and save an edit.
    pub fn update_patient(
        &self,
        id: String,
        name: String,
        last_menstrual_period: String,
        notes: Option<String>,
    ) -> Result<FfiPatient, TrackerError> {
        let form = PatientForm::from_input(name, &last_menstrual_period, notes)
            .map_err(|e| TrackerError::from_registry(e.into(), Operation::Update))?;
        let db = self.db.lock()?;
        let registry = PatientRegistry::new(&*db);
        let patient = registry
            .update_patient(&id, &form, today())
            .map_err(|e| TrackerError::from_registry(e, Operation::Update))?;
        Ok(patient.into())
    }

    /// Remove a patient.
    pub fn delete_patient(&self, id: String) -> Result<(), TrackerError> {
        let db = self.db.lock()?;
        let registry = PatientRegistry::new(&*db);
        registry
            .delete_patient(&id)
            .map_err(|e| TrackerError::from_registry(e, Operation::Delete))
    }

    /// Search patients by name prefix.
    pub fn search_patients(
        &self,
        query: String,
        limit: u32,
    ) -> Result<Vec<FfiPatient>, TrackerError> {
        let db = self.db.lock()?;
        let patients = db.search_patients(&query, limit as usize)?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    /// Number of stored patients.
    pub fn count_patients(&self) -> Result<u64, TrackerError> {
        let db = self.db.lock()?;
        Ok(db.count_patients()? as u64)
    }

    /// Every patient with gestational age as of today.
    pub fn patient_cards(&self) -> Result<Vec<FfiPatientCard>, TrackerError> {
        let db = self.db.lock()?;
        let registry = PatientRegistry::new(&*db);
        let cards = registry
            .patient_cards(today())
            .map_err(|e| TrackerError::from_registry(e, Operation::List))?;
        Ok(cards.into_iter().map(|c| c.into()).collect())
    }

    // =========================================================================
    // Export Operations
    // =========================================================================

    /// Export the roster as JSON.
    pub fn export_roster_json(&self) -> Result<String, TrackerError> {
        let db = self.db.lock()?;
        let export = RosterExporter::new(&*db).export(today())?;
        Ok(export.to_json()?)
    }

    /// Export the roster as CSV.
    pub fn export_roster_csv(&self) -> Result<String, TrackerError> {
        let db = self.db.lock()?;
        let export = RosterExporter::new(&*db).export(today())?;
        Ok(export.to_csv())
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
    /// yyyy-MM-dd
    pub last_menstrual_period: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name,
            last_menstrual_period: patient.last_menstrual_period.to_string(),
            notes: patient.notes,
            created_at: patient.created_at,
            updated_at: patient.updated_at,
        }
    }
}

/// FFI-safe gestational age with its display strings.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiGestationalAge {
    pub weeks: i64,
    pub days: i64,
    pub total_days: i64,
    pub trimester: u8,
    /// yyyy-MM-dd
    pub due_date: String,
    pub is_overdue: bool,
    pub is_future_date: bool,
    pub progress_percent: f64,
    pub week_label: String,
    pub day_label: String,
    pub trimester_label: String,
    pub weeks_to_go: Option<i64>,
    pub status_line: String,
    pub lmp_display: String,
    pub due_date_display: String,
}

impl From<GestationSummary> for FfiGestationalAge {
    fn from(summary: GestationSummary) -> Self {
        Self {
            weeks: summary.age.weeks,
            days: summary.age.days,
            total_days: summary.age.total_days,
            trimester: summary.age.trimester.number(),
            due_date: summary.age.due_date.to_string(),
            is_overdue: summary.age.is_overdue,
            is_future_date: summary.is_future_date,
            progress_percent: summary.progress_percent,
            week_label: summary.week_label,
            day_label: summary.day_label,
            trimester_label: summary.trimester_label,
            weeks_to_go: summary.weeks_to_go,
            status_line: summary.status_line,
            lmp_display: summary.lmp_display,
            due_date_display: summary.due_date_display,
        }
    }
}

/// FFI-safe patient card.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientCard {
    pub patient: FfiPatient,
    pub gestational_age: FfiGestationalAge,
}

impl From<PatientCard> for FfiPatientCard {
    fn from(card: PatientCard) -> Self {
        Self {
            patient: card.patient.into(),
            gestational_age: card.summary.into(),
        }
    }
}
