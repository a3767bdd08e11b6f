//! Add/edit patient form and its validation rules.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gestation::parse_lmp;

/// Maximum name length in characters.
pub const MAX_NAME_CHARS: usize = 200;

/// Maximum notes length in characters.
pub const MAX_NOTES_CHARS: usize = 1000;

/// Earliest accepted LMP.
pub fn earliest_lmp() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// A single form constraint violation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name is required")]
    NameRequired,

    #[error("Name must be at most {max} characters (got {actual})")]
    NameTooLong { max: usize, actual: usize },

    #[error("Please select the last menstrual period date")]
    LmpRequired,

    #[error("Last menstrual period must be a date (yyyy-MM-dd): {0}")]
    LmpUnreadable(String),

    #[error("Last menstrual period cannot be in the future: {0}")]
    LmpInFuture(NaiveDate),

    #[error("Last menstrual period cannot be before 1900-01-01: {0}")]
    LmpTooEarly(NaiveDate),

    #[error("Notes must be at most {max} characters (got {actual})")]
    NotesTooLong { max: usize, actual: usize },
}

/// Every violation found in one form submission.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", join_errors(.0))]
pub struct ValidationErrors(pub Vec<ValidationError>);

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn contains(&self, error: &ValidationError) -> bool {
        self.0.contains(error)
    }
}

/// Raw form input as submitted by the add or edit dialog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientForm {
    pub name: String,
    pub last_menstrual_period: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Form input that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidPatient {
    pub name: String,
    pub last_menstrual_period: NaiveDate,
    pub notes: Option<String>,
}

impl PatientForm {
    pub fn new(name: impl Into<String>, lmp: NaiveDate, notes: Option<String>) -> Self {
        Self {
            name: name.into(),
            last_menstrual_period: Some(lmp),
            notes,
        }
    }

    /// Build a form from the dialog's text fields.
    ///
    /// A blank LMP is left unset so validation reports it as required.
    pub fn from_input(
        name: impl Into<String>,
        lmp: &str,
        notes: Option<String>,
    ) -> Result<Self, ValidationErrors> {
        let lmp = lmp.trim();
        let last_menstrual_period = if lmp.is_empty() {
            None
        } else {
            let parsed = parse_lmp(lmp)
                .map_err(|_| ValidationErrors(vec![ValidationError::LmpUnreadable(lmp.to_string())]))?;
            Some(parsed)
        };

        Ok(Self {
            name: name.into(),
            last_menstrual_period,
            notes,
        })
    }

    /// Check every constraint against `today`.
    ///
    /// Empty notes are normalized to `None`.
    pub fn validate(&self, today: NaiveDate) -> Result<ValidPatient, ValidationErrors> {
        let mut errors = Vec::new();

        let name_chars = self.name.chars().count();
        if self.name.trim().is_empty() {
            errors.push(ValidationError::NameRequired);
        } else if name_chars > MAX_NAME_CHARS {
            errors.push(ValidationError::NameTooLong {
                max: MAX_NAME_CHARS,
                actual: name_chars,
            });
        }

        match self.last_menstrual_period {
            None => errors.push(ValidationError::LmpRequired),
            Some(lmp) if lmp > today => errors.push(ValidationError::LmpInFuture(lmp)),
            Some(lmp) if lmp < earliest_lmp() => errors.push(ValidationError::LmpTooEarly(lmp)),
            Some(_) => {}
        }

        let notes = self.notes.as_deref().filter(|n| !n.is_empty());
        if let Some(notes) = notes {
            let notes_chars = notes.chars().count();
            if notes_chars > MAX_NOTES_CHARS {
                errors.push(ValidationError::NotesTooLong {
                    max: MAX_NOTES_CHARS,
                    actual: notes_chars,
                });
            }
        }

        match (errors.is_empty(), self.last_menstrual_period) {
            (true, Some(lmp)) => Ok(ValidPatient {
                name: self.name.clone(),
                last_menstrual_period: lmp,
                notes: notes.map(str::to_string),
            }),
            _ => Err(ValidationErrors(errors)),
        }
    }
}
