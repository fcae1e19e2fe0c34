//! Weigh-in models, as parsed from the device and as persisted.

use serde::{Deserialize, Serialize};

/// Per-region percentages for one metric (fat or muscle).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct SegmentalMetrics {
    pub arm_right: Option<f64>,
    pub arm_left: Option<f64>,
    pub leg_right: Option<f64>,
    pub leg_left: Option<f64>,
    pub trunk: Option<f64>,
}

/// Derived body-composition values of one weigh-in. All optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BodyComposition {
    pub bmi: Option<f64>,
    pub body_fat_percent: Option<f64>,
    pub water_percent: Option<f64>,
    pub muscle_mass_percent_total: Option<f64>,
    pub bone_mass_kg: Option<f64>,
    pub visceral_fat_rating: Option<i32>,
    pub metabolic_age: Option<i32>,
    pub daily_calorie_maintenance: Option<i32>,
    /// Fat percentage by region
    pub fat: SegmentalMetrics,
    /// Muscle percentage by region
    pub muscle: SegmentalMetrics,
}

/// One weigh-in read from `DATA{slot}.CSV`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScaleMeasurementRecord {
    /// Device-local timestamp, `DD/MM/YYYY HH:MM:SS`
    pub timestamp: String,
    pub weight_kg: f64,
    #[serde(flatten)]
    pub composition: BodyComposition,
}

/// Where a stored measurement came from.
pub const SOURCE_TANITA: &str = "tanita";

/// A measurement row linked to a patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersistedMeasurement {
    /// Row UUID
    pub id: String,
    /// Owning patient local ID
    pub patient_id: String,
    /// Canonical timestamp `YYYY-MM-DD HH:MM:SS`
    pub measured_at: String,
    /// Origin tag (e.g. "tanita")
    pub source: String,
    pub weight_kg: f64,
    #[serde(flatten)]
    pub composition: BodyComposition,
    /// SHA-256 over patient, timestamp and weight
    pub fingerprint: String,
    pub created_at: String,
}

impl PersistedMeasurement {
    /// Build a row from a parsed weigh-in whose timestamp is already canonical.
    pub fn from_scale(
        patient_id: &str,
        measured_at: String,
        record: &ScaleMeasurementRecord,
    ) -> Self {
        let fingerprint = measurement_fingerprint(patient_id, &measured_at, record.weight_kg);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id: patient_id.to_string(),
            measured_at,
            source: SOURCE_TANITA.to_string(),
            weight_kg: record.weight_kg,
            composition: record.composition.clone(),
            fingerprint,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Identity of a weigh-in for duplicate detection.
pub fn measurement_fingerprint(patient_id: &str, measured_at: &str, weight_kg: f64) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(patient_id.as_bytes());
    hasher.update(b"|");
    hasher.update(measured_at.as_bytes());
    hasher.update(b"|");
    hasher.update(format!("{:.2}", weight_kg).as_bytes());
    hex::encode(hasher.finalize())
}
