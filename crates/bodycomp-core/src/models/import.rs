//! Import run results and commit summaries.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::measurement::ScaleMeasurementRecord;
use super::profile::ScaleProfile;

/// Everything read from one slot: profile plus its weigh-ins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlotImportResult {
    pub slot: u8,
    pub profile_code: Option<String>,
    pub profile: ScaleProfile,
    pub measurements: Vec<ScaleMeasurementRecord>,
}

/// Why a slot was left out of a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum SkipReason {
    /// `SYSTEM` or `DATA` directory absent
    MissingDirectory(String),
    /// Profile or measurement file absent
    MissingFile(String),
    /// File present but could not be read
    Unreadable(String),
    /// Profile file had no usable line
    EmptyProfile,
    /// Measurement file had no complete weigh-in
    NoMeasurements,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingDirectory(dir) => write!(f, "directory {} not found", dir),
            SkipReason::MissingFile(file) => write!(f, "file {} not found", file),
            SkipReason::Unreadable(msg) => write!(f, "unreadable: {}", msg),
            SkipReason::EmptyProfile => write!(f, "profile empty or invalid"),
            SkipReason::NoMeasurements => write!(f, "no measurements found"),
        }
    }
}

/// Final state of one slot in a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum SlotOutcome {
    Included { measurement_count: usize },
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlotReport {
    pub slot: u8,
    pub outcome: SlotOutcome,
}

/// Completed scan of one export directory.
///
/// Pure data: handed to the operator for review, then to the reconciler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportRun {
    /// Resolved `GRAPHV1` directory
    pub export_root: PathBuf,
    /// Included slots, in slot order
    pub results: Vec<SlotImportResult>,
    /// One report per slot, in slot order
    pub reports: Vec<SlotReport>,
}

impl ImportRun {
    /// Number of profiles found with at least one measurement.
    pub fn profiles_found(&self) -> usize {
        self.results.len()
    }

    pub fn total_measurements(&self) -> usize {
        self.results.iter().map(|r| r.measurements.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Operator preview, one line per slot.
    pub fn summary_lines(&self) -> Vec<String> {
        self.reports
            .iter()
            .map(|report| match &report.outcome {
                SlotOutcome::Included { measurement_count } => {
                    let profile = self
                        .results
                        .iter()
                        .find(|r| r.slot == report.slot)
                        .map(|r| &r.profile);
                    match profile {
                        Some(p) => format!(
                            "Slot {} [{}]: born {}, {}, {} cm, {}{} - {} measurement(s)",
                            report.slot,
                            p.profile_code.as_deref().unwrap_or("-"),
                            p.birth_date.as_deref().unwrap_or("?"),
                            p.gender.map(|g| g.label()).unwrap_or("unknown gender"),
                            p.height_cm
                                .map(|h| h.to_string())
                                .unwrap_or_else(|| "?".into()),
                            p.activity_level
                                .map(|a| a.label())
                                .unwrap_or("activity not set"),
                            if p.is_athlete() { ", athlete" } else { "" },
                            measurement_count
                        ),
                        None => {
                            format!("Slot {}: {} measurement(s)", report.slot, measurement_count)
                        }
                    }
                }
                SlotOutcome::Skipped(reason) => {
                    format!("Slot {}: skipped ({})", report.slot, reason)
                }
            })
            .collect()
    }
}

/// Step of the commit at which a record failed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum CommitStage {
    PatientLookup,
    PatientCreate,
    PatientUpdate,
    MeasurementInsert,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommitFailure {
    pub slot: u8,
    pub stage: CommitStage,
    pub message: String,
}

/// How a slot's patient was resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum PatientResolution {
    Created { patient_id: String },
    Updated { patient_id: String },
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlotCommit {
    pub slot: u8,
    pub resolution: PatientResolution,
    pub measurements_inserted: usize,
}

/// Aggregate outcome of persisting an import run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CommitSummary {
    pub patients_created: usize,
    pub patients_updated: usize,
    pub measurements_inserted: usize,
    pub measurements_duplicate: usize,
    pub measurements_failed: usize,
    pub slots: Vec<SlotCommit>,
    pub failures: Vec<CommitFailure>,
}

impl CommitSummary {
    /// Patients created or updated.
    pub fn patients_touched(&self) -> usize {
        self.patients_created + self.patients_updated
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityLevel, DeviceGender};

    #[test]
    fn test_summary_lines() {
        let mut profile = ScaleProfile::new(1);
        profile.profile_code = Some("ABC123".into());
        profile.birth_date = Some("01/05/1990".into());
        profile.gender = Some(DeviceGender::Male);
        profile.height_cm = Some(175.5);
        profile.activity_level = Some(ActivityLevel::ModeratelyActive);

        let run = ImportRun {
            export_root: PathBuf::from("/tmp/GRAPHV1"),
            results: vec![SlotImportResult {
                slot: 1,
                profile_code: Some("ABC123".into()),
                profile,
                measurements: Vec::new(),
            }],
            reports: vec![
                SlotReport {
                    slot: 1,
                    outcome: SlotOutcome::Included { measurement_count: 3 },
                },
                SlotReport {
                    slot: 2,
                    outcome: SlotOutcome::Skipped(SkipReason::MissingFile("DATA2.CSV".into())),
                },
            ],
        };

        let lines = run.summary_lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("ABC123"));
        assert!(lines[0].contains("175.5 cm"));
        assert!(lines[0].contains("3 measurement(s)"));
        assert_eq!(lines[1], "Slot 2: skipped (file DATA2.CSV not found)");
        assert_eq!(run.profiles_found(), 1);
    }

    #[test]
    fn test_patients_touched() {
        let summary = CommitSummary {
            patients_created: 2,
            patients_updated: 1,
            ..Default::default()
        };
        assert_eq!(summary.patients_touched(), 3);
        assert!(!summary.has_failures());
    }
}
