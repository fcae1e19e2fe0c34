//! Patient models.

use serde::{Deserialize, Serialize};

use super::profile::{ActivityLevel, DeviceGender};

/// Gender in the application's convention (0 = female, 1 = male).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PatientGender {
    Female,
    Male,
}

impl PatientGender {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(PatientGender::Female),
            1 => Some(PatientGender::Male),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            PatientGender::Female => 0,
            PatientGender::Male => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PatientGender::Female => "Female",
            PatientGender::Male => "Male",
        }
    }
}

impl From<DeviceGender> for PatientGender {
    fn from(gender: DeviceGender) -> Self {
        match gender {
            DeviceGender::Male => PatientGender::Male,
            DeviceGender::Female => PatientGender::Female,
        }
    }
}

/// A patient record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Local UUID
    pub local_id: String,
    pub name: String,
    /// Canonical birth date `YYYY-MM-DD`
    pub birth_date: Option<String>,
    pub gender: Option<PatientGender>,
    pub height_cm: Option<f64>,
    pub athlete_mode: bool,
    pub activity_level: Option<ActivityLevel>,
    /// Scale slot that last wrote to this patient
    pub tanita_slot: Option<u8>,
    /// Device profile code that last wrote to this patient
    pub tanita_profile_code: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Patient {
    /// Create a new patient with only a name.
    pub fn new(name: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            local_id: uuid::Uuid::new_v4().to_string(),
            name,
            birth_date: None,
            gender: None,
            height_cm: None,
            athlete_mode: false,
            activity_level: None,
            tanita_slot: None,
            tanita_profile_code: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Overwrite the scale-owned fields with a fresh profile.
    pub fn apply_scale_profile(&mut self, update: &ScaleProfileUpdate) {
        self.birth_date = update.birth_date.clone();
        self.gender = update.gender;
        self.height_cm = update.height_cm;
        self.athlete_mode = update.athlete_mode;
        self.activity_level = update.activity_level;
        self.tanita_slot = Some(update.tanita_slot);
        self.tanita_profile_code = update.tanita_profile_code.clone();
    }
}

/// Lightweight row returned by a birth-date lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientCandidate {
    pub local_id: String,
    pub name: String,
    pub height_cm: Option<f64>,
}

/// Scale-owned patient fields, already in application conventions.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleProfileUpdate {
    pub birth_date: Option<String>,
    pub gender: Option<PatientGender>,
    pub height_cm: Option<f64>,
    pub athlete_mode: bool,
    pub activity_level: Option<ActivityLevel>,
    pub tanita_slot: u8,
    pub tanita_profile_code: Option<String>,
}
