//! Gestational age engine.
//!
//! Pipeline: LMP string → [`parse_lmp`] → [`compute`] → [`GestationSummary`]

mod calculator;
mod summary;

pub use calculator::*;
pub use summary::*;

use thiserror::Error;

/// Gestation input errors. The calculation itself cannot fail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GestationError {
    #[error("Invalid date (expected yyyy-MM-dd): {0}")]
    InvalidDate(String),

    #[error("Invalid trimester: {0}")]
    InvalidTrimester(u8),
}

pub type GestationResult<T> = Result<T, GestationError>;
