//! SQLite schema definition.

/// Complete database schema for the pregnancy tracker.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Patients
-- ============================================================================

-- Gestational age is derived on read and never stored.
CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL CHECK (length(name) BETWEEN 1 AND 200),
    last_menstrual_period TEXT NOT NULL,         -- yyyy-MM-dd
    notes TEXT CHECK (notes IS NULL OR length(notes) <= 1000),
    created_at TEXT NOT NULL,                    -- RFC 3339
    updated_at TEXT NOT NULL                     -- RFC 3339
);

CREATE INDEX IF NOT EXISTS idx_patients_name ON patients(name);
CREATE INDEX IF NOT EXISTS idx_patients_created_at ON patients(created_at);
"#;
