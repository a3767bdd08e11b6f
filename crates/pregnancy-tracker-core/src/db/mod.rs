//! Database layer for the pregnancy tracker.

mod schema;
mod patients;

pub use schema::*;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::models::Patient;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type DbResult<T> = Result<T, DbError>;

/// Persistence operations over patient records.
///
/// Implementations provide durability; callers validate input first.
pub trait PatientStore {
    /// Store a new patient.
    fn insert_patient(&self, patient: &Patient) -> DbResult<()>;

    /// Retrieve a patient by ID.
    fn get_patient(&self, id: &str) -> DbResult<Option<Patient>>;

    /// List all patients, newest first.
    fn list_patients(&self) -> DbResult<Vec<Patient>>;

    /// Overwrite name, LMP and notes.
    /// Returns false if no patient has this ID.
    fn update_patient(&self, patient: &Patient) -> DbResult<bool>;

    /// Delete a patient.
    /// Returns false if no patient has this ID.
    fn delete_patient(&self, id: &str) -> DbResult<bool>;
}

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        debug!(path = %path.as_ref().display(), "opening database");
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}
