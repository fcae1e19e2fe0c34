//! Bodycomp Core Library
//!
//! Imports Tanita body-composition scale exports into a local patient store.
//!
//! # Architecture
//!
//! ```text
//! Export folder ([TANITA/]GRAPHV1)
//!         │
//!         ▼
//!   Slot resolver ── PROF{n}.CSV ──► profile parser
//!         │        └─ DATA{n}.CSV ──► measurement parser
//!         ▼
//!   [ImportRun: per-slot preview]
//!         │
//!   Operator confirms
//!         │
//!         ▼
//!   Reconciler ── birth date + height match ──► update / create patient
//!         │
//!         ▼
//!   scale_measurements (append)
//! ```
//!
//! # Core Principle
//!
//! **One slot never sinks another.** Missing files, bad lines and failed
//! writes are recorded per slot or per record; only a missing `GRAPHV1`
//! stops a scan.
//!
//! # Modules
//!
//! - [`tanita`]: Export layout, tokenizer and record parsers
//! - [`reconcile`]: Patient matching and measurement commit
//! - [`db`]: SQLite patient store
//! - [`models`]: Domain types (ScaleProfile, Patient, ImportRun, etc.)
//! - [`config`]: Import configuration

pub mod config;
pub mod db;
pub mod models;
pub mod reconcile;
pub mod tanita;

// Re-export commonly used types
pub use config::{ConfigError, ImportConfig};
pub use db::Database;
pub use models::{
    CommitSummary, ImportRun, Patient, PersistedMeasurement, ScaleMeasurementRecord,
    ScaleProfile, SlotImportResult,
};
pub use reconcile::{PatientStore, Reconciler};
pub use tanita::{ImportError, Importer};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::path::Path;
use std::sync::{Arc, Mutex};

use models::{
    ActivityLevel, BodyComposition, DeviceGender, PatientGender, SegmentalMetrics, SlotOutcome,
};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum BodyCompError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Import error: {0}")]
    ImportError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<db::DbError> for BodyCompError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => BodyCompError::NotFound(what),
            other => BodyCompError::DatabaseError(other.to_string()),
        }
    }
}

impl From<tanita::ImportError> for BodyCompError {
    fn from(e: tanita::ImportError) -> Self {
        BodyCompError::ImportError(e.to_string())
    }
}

impl From<config::ConfigError> for BodyCompError {
    fn from(e: config::ConfigError) -> Self {
        BodyCompError::ConfigError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for BodyCompError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        BodyCompError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<BodyCompCore>, BodyCompError> {
    let db = Database::open(&path)?;
    Ok(BodyCompCore::wrap(db, ImportConfig::default()))
}

/// Open a database with an import configuration given as JSON.
#[uniffi::export]
pub fn open_database_with_config(
    path: String,
    config_json: String,
) -> Result<Arc<BodyCompCore>, BodyCompError> {
    let config = ImportConfig::from_json(&config_json)?;
    let db = Database::open(&path)?;
    Ok(BodyCompCore::wrap(db, config))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<BodyCompCore>, BodyCompError> {
    let db = Database::open_in_memory()?;
    Ok(BodyCompCore::wrap(db, ImportConfig::default()))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct BodyCompCore {
    db: Arc<Mutex<Database>>,
    config: ImportConfig,
}

impl BodyCompCore {
    fn wrap(db: Database, config: ImportConfig) -> Arc<Self> {
        Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
            config,
        })
    }
}

#[uniffi::export]
impl BodyCompCore {
    // =========================================================================
    // Import Operations
    // =========================================================================

    /// Scan an export folder. Nothing is written.
    pub fn scan_export(&self, root: String) -> Result<FfiImportPreview, BodyCompError> {
        let run = Importer::new().scan(Path::new(&root))?;
        Ok(run.into())
    }

    /// Persist a previously scanned (and confirmed) preview.
    pub fn commit_import(
        &self,
        preview: FfiImportPreview,
    ) -> Result<FfiCommitSummary, BodyCompError> {
        let results = preview
            .slots
            .into_iter()
            .map(SlotImportResult::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let db = self.db.lock()?;
        let reconciler = Reconciler::new(&*db, self.config.clone());
        Ok(reconciler.commit(&results).into())
    }

    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// List all patients.
    pub fn list_patients(&self) -> Result<Vec<FfiPatient>, BodyCompError> {
        let db = self.db.lock()?;
        let patients = db.list_patients()?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    /// Scale measurements of a patient, oldest first.
    pub fn list_measurements(
        &self,
        patient_id: String,
    ) -> Result<Vec<FfiStoredMeasurement>, BodyCompError> {
        let db = self.db.lock()?;
        if db.get_patient(&patient_id)?.is_none() {
            return Err(BodyCompError::NotFound(format!("patient {}", patient_id)));
        }
        let rows = db.list_measurements_for_patient(&patient_id)?;
        Ok(rows.into_iter().map(|m| m.into()).collect())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe scale profile. Codes use the device convention.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiScaleProfile {
    pub slot: u8,
    pub profile_code: Option<String>,
    pub birth_date: Option<String>,
    pub device_gender_code: Option<i64>,
    pub height_cm: Option<f64>,
    pub athlete_mode: Option<bool>,
    pub activity_level: Option<i64>,
}

impl From<ScaleProfile> for FfiScaleProfile {
    fn from(p: ScaleProfile) -> Self {
        Self {
            slot: p.slot,
            profile_code: p.profile_code,
            birth_date: p.birth_date,
            device_gender_code: p.gender.map(DeviceGender::code),
            height_cm: p.height_cm,
            athlete_mode: p.athlete_mode,
            activity_level: p.activity_level.map(ActivityLevel::code),
        }
    }
}

impl From<FfiScaleProfile> for ScaleProfile {
    fn from(p: FfiScaleProfile) -> Self {
        ScaleProfile {
            slot: p.slot,
            profile_code: p.profile_code,
            birth_date: p.birth_date,
            gender: p.device_gender_code.and_then(DeviceGender::from_code),
            height_cm: p.height_cm,
            athlete_mode: p.athlete_mode,
            activity_level: p.activity_level.and_then(ActivityLevel::from_code),
        }
    }
}

/// FFI-safe weigh-in as read from the device.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMeasurement {
    pub timestamp: String,
    pub weight_kg: f64,
    pub bmi: Option<f64>,
    pub body_fat_percent: Option<f64>,
    pub water_percent: Option<f64>,
    pub muscle_mass_percent_total: Option<f64>,
    pub bone_mass_kg: Option<f64>,
    pub visceral_fat_rating: Option<i32>,
    pub metabolic_age: Option<i32>,
    pub daily_calorie_maintenance: Option<i32>,
    pub fat_arm_right: Option<f64>,
    pub fat_arm_left: Option<f64>,
    pub fat_leg_right: Option<f64>,
    pub fat_leg_left: Option<f64>,
    pub fat_trunk: Option<f64>,
    pub muscle_arm_right: Option<f64>,
    pub muscle_arm_left: Option<f64>,
    pub muscle_leg_right: Option<f64>,
    pub muscle_leg_left: Option<f64>,
    pub muscle_trunk: Option<f64>,
}

impl From<ScaleMeasurementRecord> for FfiMeasurement {
    fn from(m: ScaleMeasurementRecord) -> Self {
        let c = m.composition;
        Self {
            timestamp: m.timestamp,
            weight_kg: m.weight_kg,
            bmi: c.bmi,
            body_fat_percent: c.body_fat_percent,
            water_percent: c.water_percent,
            muscle_mass_percent_total: c.muscle_mass_percent_total,
            bone_mass_kg: c.bone_mass_kg,
            visceral_fat_rating: c.visceral_fat_rating,
            metabolic_age: c.metabolic_age,
            daily_calorie_maintenance: c.daily_calorie_maintenance,
            fat_arm_right: c.fat.arm_right,
            fat_arm_left: c.fat.arm_left,
            fat_leg_right: c.fat.leg_right,
            fat_leg_left: c.fat.leg_left,
            fat_trunk: c.fat.trunk,
            muscle_arm_right: c.muscle.arm_right,
            muscle_arm_left: c.muscle.arm_left,
            muscle_leg_right: c.muscle.leg_right,
            muscle_leg_left: c.muscle.leg_left,
            muscle_trunk: c.muscle.trunk,
        }
    }
}

impl From<FfiMeasurement> for ScaleMeasurementRecord {
    fn from(m: FfiMeasurement) -> Self {
        ScaleMeasurementRecord {
            timestamp: m.timestamp,
            weight_kg: m.weight_kg,
            composition: BodyComposition {
                bmi: m.bmi,
                body_fat_percent: m.body_fat_percent,
                water_percent: m.water_percent,
                muscle_mass_percent_total: m.muscle_mass_percent_total,
                bone_mass_kg: m.bone_mass_kg,
                visceral_fat_rating: m.visceral_fat_rating,
                metabolic_age: m.metabolic_age,
                daily_calorie_maintenance: m.daily_calorie_maintenance,
                fat: SegmentalMetrics {
                    arm_right: m.fat_arm_right,
                    arm_left: m.fat_arm_left,
                    leg_right: m.fat_leg_right,
                    leg_left: m.fat_leg_left,
                    trunk: m.fat_trunk,
                },
                muscle: SegmentalMetrics {
                    arm_right: m.muscle_arm_right,
                    arm_left: m.muscle_arm_left,
                    leg_right: m.muscle_leg_right,
                    leg_left: m.muscle_leg_left,
                    trunk: m.muscle_trunk,
                },
            },
        }
    }
}

/// FFI-safe slot result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSlotImport {
    pub slot: u8,
    pub profile_code: Option<String>,
    pub profile: FfiScaleProfile,
    pub measurements: Vec<FfiMeasurement>,
}

impl From<SlotImportResult> for FfiSlotImport {
    fn from(r: SlotImportResult) -> Self {
        Self {
            slot: r.slot,
            profile_code: r.profile_code,
            profile: r.profile.into(),
            measurements: r.measurements.into_iter().map(|m| m.into()).collect(),
        }
    }
}

impl TryFrom<FfiSlotImport> for SlotImportResult {
    type Error = BodyCompError;

    fn try_from(r: FfiSlotImport) -> Result<Self, Self::Error> {
        if !tanita::SLOTS.contains(&r.slot) || r.profile.slot != r.slot {
            return Err(BodyCompError::InvalidInput(format!(
                "slot {} (profile slot {}) is not a valid scale slot",
                r.slot, r.profile.slot
            )));
        }
        Ok(SlotImportResult {
            slot: r.slot,
            profile_code: r.profile_code,
            profile: r.profile.into(),
            measurements: r.measurements.into_iter().map(|m| m.into()).collect(),
        })
    }
}

/// FFI-safe per-slot outcome.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSlotReport {
    pub slot: u8,
    pub included: bool,
    pub measurement_count: u32,
    pub skip_reason: Option<String>,
}

/// FFI-safe scan result, handed back unchanged for commit.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiImportPreview {
    pub export_root: String,
    pub profiles_found: u32,
    pub slots: Vec<FfiSlotImport>,
    pub reports: Vec<FfiSlotReport>,
    pub summary_lines: Vec<String>,
}

impl From<ImportRun> for FfiImportPreview {
    fn from(run: ImportRun) -> Self {
        let summary_lines = run.summary_lines();
        let reports = run
            .reports
            .iter()
            .map(|r| match &r.outcome {
                SlotOutcome::Included { measurement_count } => FfiSlotReport {
                    slot: r.slot,
                    included: true,
                    measurement_count: *measurement_count as u32,
                    skip_reason: None,
                },
                SlotOutcome::Skipped(reason) => FfiSlotReport {
                    slot: r.slot,
                    included: false,
                    measurement_count: 0,
                    skip_reason: Some(reason.to_string()),
                },
            })
            .collect();

        Self {
            export_root: run.export_root.display().to_string(),
            profiles_found: run.profiles_found() as u32,
            slots: run.results.into_iter().map(|r| r.into()).collect(),
            reports,
            summary_lines,
        }
    }
}

/// FFI-safe commit summary.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCommitSummary {
    pub patients_created: u32,
    pub patients_updated: u32,
    pub patients_touched: u32,
    pub measurements_inserted: u32,
    pub measurements_duplicate: u32,
    pub measurements_failed: u32,
    pub failures: Vec<String>,
}

impl From<CommitSummary> for FfiCommitSummary {
    fn from(s: CommitSummary) -> Self {
        Self {
            patients_created: s.patients_created as u32,
            patients_updated: s.patients_updated as u32,
            patients_touched: s.patients_touched() as u32,
            measurements_inserted: s.measurements_inserted as u32,
            measurements_duplicate: s.measurements_duplicate as u32,
            measurements_failed: s.measurements_failed as u32,
            failures: s
                .failures
                .iter()
                .map(|f| format!("slot {} ({:?}): {}", f.slot, f.stage, f.message))
                .collect(),
        }
    }
}

/// FFI-safe patient. Gender uses the application convention.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub local_id: String,
    pub name: String,
    pub birth_date: Option<String>,
    pub gender_code: Option<i64>,
    pub height_cm: Option<f64>,
    pub athlete_mode: bool,
    pub activity_level: Option<i64>,
    pub tanita_slot: Option<u8>,
    pub tanita_profile_code: Option<String>,
}

impl From<Patient> for FfiPatient {
    fn from(p: Patient) -> Self {
        Self {
            local_id: p.local_id,
            name: p.name,
            birth_date: p.birth_date,
            gender_code: p.gender.map(PatientGender::code),
            height_cm: p.height_cm,
            athlete_mode: p.athlete_mode,
            activity_level: p.activity_level.map(ActivityLevel::code),
            tanita_slot: p.tanita_slot,
            tanita_profile_code: p.tanita_profile_code,
        }
    }
}

/// FFI-safe stored measurement (headline values).
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiStoredMeasurement {
    pub id: String,
    pub patient_id: String,
    pub measured_at: String,
    pub source: String,
    pub weight_kg: f64,
    pub bmi: Option<f64>,
    pub body_fat_percent: Option<f64>,
    pub water_percent: Option<f64>,
    pub muscle_mass_percent_total: Option<f64>,
    pub visceral_fat_rating: Option<i32>,
    pub metabolic_age: Option<i32>,
}

impl From<PersistedMeasurement> for FfiStoredMeasurement {
    fn from(m: PersistedMeasurement) -> Self {
        Self {
            id: m.id,
            patient_id: m.patient_id,
            measured_at: m.measured_at,
            source: m.source,
            weight_kg: m.weight_kg,
            bmi: m.composition.bmi,
            body_fat_percent: m.composition.body_fat_percent,
            water_percent: m.composition.water_percent,
            muscle_mass_percent_total: m.composition.muscle_mass_percent_total,
            visceral_fat_rating: m.composition.visceral_fat_rating,
            metabolic_age: m.composition.metabolic_age,
        }
    }
}
