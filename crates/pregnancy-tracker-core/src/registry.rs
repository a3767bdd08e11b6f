//! Patient registry: validated CRUD over a [`PatientStore`].

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, warn};

use crate::db::{DbError, PatientStore};
use crate::models::{Patient, PatientCard, PatientForm, ValidationErrors};

/// Registry errors.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Invalid patient: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Patient not found: {0}")]
    NotFound(String),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// A user-initiated patient operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum Operation {
    Create,
    Update,
    Delete,
    List,
}

impl Operation {
    /// Notification text after the operation succeeds.
    pub fn success_message(self) -> &'static str {
        match self {
            Operation::Create => "Patient added successfully!",
            Operation::Update => "Patient updated successfully!",
            Operation::Delete => "Patient removed successfully.",
            Operation::List => "Patients loaded.",
        }
    }

    /// Notification text after the operation fails. Failures are retryable.
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::Create => "Failed to add patient. Please try again.",
            Operation::Update => "Failed to update patient. Please try again.",
            Operation::Delete => "Failed to remove patient. Please try again.",
            Operation::List => "Failed to load patients. Please try again.",
        }
    }
}

impl RegistryError {
    /// Message to show the user when `operation` fails with this error.
    ///
    /// Validation failures name the offending fields; everything else gets
    /// the generic retry message.
    pub fn notice(&self, operation: Operation) -> String {
        match self {
            RegistryError::Validation(errors) => errors.to_string(),
            _ => operation.failure_message().to_string(),
        }
    }
}

/// Validated patient CRUD.
pub struct PatientRegistry<'a, S: PatientStore> {
    store: &'a S,
}

impl<'a, S: PatientStore> PatientRegistry<'a, S> {
    /// Create a new registry over a store.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Validate and store a new patient.
    pub fn create_patient(&self, form: &PatientForm, today: NaiveDate) -> RegistryResult<Patient> {
        let valid = form.validate(today).inspect_err(|e| {
            warn!(error = %e, "rejected new patient");
        })?;

        let patient = Patient::new(valid.name, valid.last_menstrual_period, valid.notes);
        self.store.insert_patient(&patient)?;

        info!(id = %patient.id, "created patient");
        Ok(patient)
    }

    /// All patients, newest first.
    pub fn list_patients(&self) -> RegistryResult<Vec<Patient>> {
        Ok(self.store.list_patients()?)
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: &str) -> RegistryResult<Option<Patient>> {
        Ok(self.store.get_patient(id)?)
    }

    /// Validate and apply an edit to an existing patient.
    pub fn update_patient(
        &self,
        id: &str,
        form: &PatientForm,
        today: NaiveDate,
    ) -> RegistryResult<Patient> {
        let valid = form.validate(today).inspect_err(|e| {
            warn!(id, error = %e, "rejected patient update");
        })?;

        let mut patient = self
            .store
            .get_patient(id)?
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;

        patient.name = valid.name;
        patient.last_menstrual_period = valid.last_menstrual_period;
        patient.notes = valid.notes;
        patient.touch();

        if !self.store.update_patient(&patient)? {
            return Err(RegistryError::NotFound(id.to_string()));
        }

        info!(id, "updated patient");
        Ok(patient)
    }

    /// Delete a patient.
    pub fn delete_patient(&self, id: &str) -> RegistryResult<()> {
        if !self.store.delete_patient(id)? {
            warn!(id, "delete requested for unknown patient");
            return Err(RegistryError::NotFound(id.to_string()));
        }

        info!(id, "deleted patient");
        Ok(())
    }

    /// Every patient with gestational age computed for `today`.
    pub fn patient_cards(&self, today: NaiveDate) -> RegistryResult<Vec<PatientCard>> {
        Ok(self
            .list_patients()?
            .into_iter()
            .map(|patient| PatientCard::new(patient, today))
            .collect())
    }
}
