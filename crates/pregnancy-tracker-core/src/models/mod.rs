//! Domain models for the pregnancy tracker.

mod form;
mod patient;

pub use form::*;
pub use patient::*;
