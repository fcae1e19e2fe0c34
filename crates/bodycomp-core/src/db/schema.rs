//! SQLite schema definition.

/// Complete database schema for the patient store.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    local_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    birth_date TEXT,                             -- YYYY-MM-DD
    gender INTEGER CHECK (gender IN (0, 1)),     -- 0 = female, 1 = male
    height_cm REAL,
    athlete_mode INTEGER NOT NULL DEFAULT 0,
    activity_level INTEGER CHECK (activity_level BETWEEN 0 AND 4),
    tanita_slot INTEGER CHECK (tanita_slot BETWEEN 1 AND 4),
    tanita_profile_code TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_patients_birth_date ON patients(birth_date);
CREATE INDEX IF NOT EXISTS idx_patients_name ON patients(name);

-- ============================================================================
-- Scale Measurements (Append-Only from the importer)
-- ============================================================================

CREATE TABLE IF NOT EXISTS scale_measurements (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(local_id),
    measured_at TEXT NOT NULL,                   -- YYYY-MM-DD HH:MM:SS
    source TEXT NOT NULL DEFAULT 'tanita',
    weight_kg REAL NOT NULL,
    bmi REAL,
    body_fat_percent REAL,
    water_percent REAL,
    muscle_mass_percent_total REAL,
    bone_mass_kg REAL,
    visceral_fat_rating INTEGER,
    metabolic_age INTEGER,
    daily_calorie_maintenance INTEGER,
    fat_arm_right REAL,
    fat_arm_left REAL,
    fat_leg_right REAL,
    fat_leg_left REAL,
    fat_trunk REAL,
    muscle_arm_right REAL,
    muscle_arm_left REAL,
    muscle_leg_right REAL,
    muscle_leg_left REAL,
    muscle_trunk REAL,
    fingerprint TEXT NOT NULL,                   -- SHA-256(patient|measured_at|weight)
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_measurements_patient ON scale_measurements(patient_id, measured_at);
CREATE INDEX IF NOT EXISTS idx_measurements_fingerprint
    ON scale_measurements(patient_id, fingerprint);
"#;
