//! Patient models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::gestation::{compute, GestationSummary, GestationalAge};

/// A tracked pregnancy.
///
/// Gestational age is never stored; it is recomputed from
/// `last_menstrual_period` whenever it is shown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Opaque UUID assigned on creation
    pub id: String,
    /// Patient name
    pub name: String,
    /// First day of the last menstrual period
    pub last_menstrual_period: NaiveDate,
    /// Free-form clinician notes
    pub notes: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Patient {
    /// Create a new patient with a fresh ID.
    pub fn new(name: String, last_menstrual_period: NaiveDate, notes: Option<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            last_menstrual_period,
            notes,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Gestational age on `today`.
    pub fn gestational_age(&self, today: NaiveDate) -> GestationalAge {
        compute(self.last_menstrual_period, today)
    }

    /// Display summary on `today`.
    pub fn summary(&self, today: NaiveDate) -> GestationSummary {
        GestationSummary::new(self.last_menstrual_period, today)
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}

/// A patient paired with its freshly computed summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientCard {
    pub patient: Patient,
    pub summary: GestationSummary,
}

impl PatientCard {
    pub fn new(patient: Patient, today: NaiveDate) -> Self {
        let summary = patient.summary(today);
        Self { patient, summary }
    }
}
