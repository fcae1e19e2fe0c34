//! Scale profile models and the device-side enums.

use serde::{Deserialize, Serialize};

/// Gender code as written by the scale (`GE` key).
///
/// The device uses 1 = male, 2 = female. This is NOT the application's
/// convention; convert with `PatientGender::from` before persisting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeviceGender {
    Male,
    Female,
}

impl DeviceGender {
    /// Decode a raw device code. Unknown codes yield `None`.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(DeviceGender::Male),
            2 => Some(DeviceGender::Female),
            _ => None,
        }
    }

    /// Raw code as the device writes it.
    pub fn code(self) -> i64 {
        match self {
            DeviceGender::Male => 1,
            DeviceGender::Female => 2,
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            DeviceGender::Male => "Male",
            DeviceGender::Female => "Female",
        }
    }
}

/// Activity level (`AL` key), shared by device and application.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    ExtremelyActive,
}

impl ActivityLevel {
    /// Decode a level code in `0..=4`.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ActivityLevel::Sedentary),
            1 => Some(ActivityLevel::LightlyActive),
            2 => Some(ActivityLevel::ModeratelyActive),
            3 => Some(ActivityLevel::VeryActive),
            4 => Some(ActivityLevel::ExtremelyActive),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            ActivityLevel::Sedentary => 0,
            ActivityLevel::LightlyActive => 1,
            ActivityLevel::ModeratelyActive => 2,
            ActivityLevel::VeryActive => 3,
            ActivityLevel::ExtremelyActive => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary",
            ActivityLevel::LightlyActive => "Lightly active",
            ActivityLevel::ModeratelyActive => "Moderately active",
            ActivityLevel::VeryActive => "Very active",
            ActivityLevel::ExtremelyActive => "Extremely active",
        }
    }
}

/// Demographic record stored in one hardware slot (`PROF{slot}.CSV`).
///
/// Every device field is optional: a key missing from the file leaves
/// the field as `None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ScaleProfile {
    /// Hardware slot, 1 to 4
    pub slot: u8,
    /// Opaque device token (`CS`), kept for traceability only
    pub profile_code: Option<String>,
    /// Birth date in device format `DD/MM/YYYY`
    pub birth_date: Option<String>,
    /// Gender in device convention
    pub gender: Option<DeviceGender>,
    /// Height in centimetres
    pub height_cm: Option<f64>,
    /// Athlete mode flag (`Bt` == 1)
    pub athlete_mode: Option<bool>,
    /// Activity level
    pub activity_level: Option<ActivityLevel>,
}

impl ScaleProfile {
    /// Empty profile for a slot.
    pub fn new(slot: u8) -> Self {
        Self {
            slot,
            ..Default::default()
        }
    }

    /// True when the athlete flag was present and set.
    pub fn is_athlete(&self) -> bool {
        self.athlete_mode.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_gender_codes() {
        assert_eq!(DeviceGender::from_code(1), Some(DeviceGender::Male));
        assert_eq!(DeviceGender::from_code(2), Some(DeviceGender::Female));
        assert_eq!(DeviceGender::from_code(0), None);
        assert_eq!(DeviceGender::Female.code(), 2);
    }

    #[test]
    fn test_activity_level_range() {
        for code in 0..=4 {
            let level = ActivityLevel::from_code(code).unwrap();
            assert_eq!(level.code(), code);
        }
        assert_eq!(ActivityLevel::from_code(5), None);
        assert_eq!(ActivityLevel::from_code(-1), None);
        assert_eq!(ActivityLevel::ModeratelyActive.label(), "Moderately active");
    }
}
