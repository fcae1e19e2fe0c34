//! Patient reconciliation and measurement commit.
//!
//! For each imported slot, in slot order:
//! 1. canonicalize the birth date and translate device enums
//! 2. look up patients by exact birth date
//! 3. take the first whose height is within tolerance, else create one
//! 4. append every weigh-in to the resolved patient
//!
//! Every store failure is logged and recorded in the [`CommitSummary`];
//! the batch always runs to the end. Nothing is rolled back.

mod store;

pub use store::*;

use tracing::{debug, info, warn};

use crate::config::ImportConfig;
use crate::models::{
    CommitFailure, CommitStage, CommitSummary, Patient, PatientCandidate, PatientGender,
    PatientResolution, PersistedMeasurement, ScaleProfile, ScaleProfileUpdate, SlotCommit,
    SlotImportResult,
};
use crate::tanita::{device_date_to_canonical, device_timestamp_to_canonical};

/// First candidate whose height is within `tolerance_cm` (inclusive).
///
/// Candidates without a stored height never match.
pub fn find_height_match(
    candidates: &[PatientCandidate],
    height_cm: f64,
    tolerance_cm: f64,
) -> Option<&PatientCandidate> {
    candidates.iter().find(|c| {
        c.height_cm
            .map(|h| (h - height_cm).abs() <= tolerance_cm)
            .unwrap_or(false)
    })
}

/// Convert a device profile into application-convention patient fields.
pub fn scale_update(profile: &ScaleProfile) -> ScaleProfileUpdate {
    let birth_date = profile.birth_date.as_deref().and_then(|raw| {
        let canonical = device_date_to_canonical(raw);
        if canonical.is_none() {
            warn!(slot = profile.slot, birth_date = raw, "Unrecognized birth date");
        }
        canonical
    });

    ScaleProfileUpdate {
        birth_date,
        gender: profile.gender.map(PatientGender::from),
        height_cm: profile.height_cm,
        athlete_mode: profile.is_athlete(),
        activity_level: profile.activity_level,
        tanita_slot: profile.slot,
        tanita_profile_code: profile.profile_code.clone(),
    }
}

/// Commits import results to a [`PatientStore`].
pub struct Reconciler<'a, S: PatientStore> {
    store: &'a S,
    config: ImportConfig,
}

impl<'a, S: PatientStore> Reconciler<'a, S> {
    pub fn new(store: &'a S, config: ImportConfig) -> Self {
        Self { store, config }
    }

    /// Persist every slot. Never aborts; failures land in the summary.
    pub fn commit(&self, results: &[SlotImportResult]) -> CommitSummary {
        let mut ordered: Vec<&SlotImportResult> = results.iter().collect();
        ordered.sort_by_key(|r| r.slot);

        let mut summary = CommitSummary::default();
        for result in ordered {
            self.commit_slot(result, &mut summary);
        }

        info!(
            patients = summary.patients_touched(),
            created = summary.patients_created,
            updated = summary.patients_updated,
            measurements = summary.measurements_inserted,
            duplicates = summary.measurements_duplicate,
            failed = summary.measurements_failed,
            "Import committed"
        );
        summary
    }

    fn commit_slot(&self, result: &SlotImportResult, summary: &mut CommitSummary) {
        let slot = result.slot;
        let update = scale_update(&result.profile);

        let resolution = match self.resolve_patient(slot, &update) {
            Ok(resolution) => resolution,
            Err(failure) => {
                summary.failures.push(failure);
                summary.slots.push(SlotCommit {
                    slot,
                    resolution: PatientResolution::Failed,
                    measurements_inserted: 0,
                });
                return;
            }
        };

        let patient_id = match &resolution {
            PatientResolution::Created { patient_id } => {
                summary.patients_created += 1;
                patient_id.clone()
            }
            PatientResolution::Updated { patient_id } => {
                summary.patients_updated += 1;
                patient_id.clone()
            }
            PatientResolution::Failed => return,
        };

        let mut inserted = 0;
        for record in &result.measurements {
            let Some(measured_at) = device_timestamp_to_canonical(&record.timestamp) else {
                warn!(slot, timestamp = %record.timestamp, "Unrecognized measurement timestamp");
                summary.measurements_failed += 1;
                summary.failures.push(CommitFailure {
                    slot,
                    stage: CommitStage::MeasurementInsert,
                    message: format!("unrecognized timestamp {:?}", record.timestamp),
                });
                continue;
            };

            let row = PersistedMeasurement::from_scale(&patient_id, measured_at, record);

            if self.config.skip_duplicate_measurements {
                match self.store.measurement_exists(&patient_id, &row.fingerprint) {
                    Ok(true) => {
                        debug!(
                            slot,
                            measured_at = %row.measured_at,
                            "Duplicate measurement skipped"
                        );
                        summary.measurements_duplicate += 1;
                        continue;
                    }
                    Ok(false) => {}
                    Err(e) => {
                        warn!(
                            slot,
                            measured_at = %row.measured_at,
                            error = %e,
                            "Duplicate check failed"
                        );
                        summary.measurements_failed += 1;
                        summary.failures.push(CommitFailure {
                            slot,
                            stage: CommitStage::MeasurementInsert,
                            message: format!(
                                "duplicate check for {} failed: {}",
                                row.measured_at, e
                            ),
                        });
                        continue;
                    }
                }
            }

            match self.store.insert_measurement(&row) {
                Ok(()) => inserted += 1,
                Err(e) => {
                    warn!(
                        slot,
                        patient_id = %patient_id,
                        measured_at = %row.measured_at,
                        weight_kg = row.weight_kg,
                        error = %e,
                        "Failed to insert measurement"
                    );
                    summary.measurements_failed += 1;
                    summary.failures.push(CommitFailure {
                        slot,
                        stage: CommitStage::MeasurementInsert,
                        message: format!("insert of {} failed: {}", row.measured_at, e),
                    });
                }
            }
        }

        info!(slot, patient_id = %patient_id, inserted, "Slot committed");
        summary.measurements_inserted += inserted;
        summary.slots.push(SlotCommit {
            slot,
            resolution,
            measurements_inserted: inserted,
        });
    }

    /// Match an existing patient or create one.
    fn resolve_patient(
        &self,
        slot: u8,
        update: &ScaleProfileUpdate,
    ) -> Result<PatientResolution, CommitFailure> {
        let candidates = match &update.birth_date {
            Some(birth_date) => self
                .store
                .find_patients_by_birth_date(birth_date)
                .map_err(|e| {
                    warn!(slot, birth_date = %birth_date, error = %e, "Patient lookup failed");
                    CommitFailure {
                        slot,
                        stage: CommitStage::PatientLookup,
                        message: format!("lookup by birth date {} failed: {}", birth_date, e),
                    }
                })?,
            None => Vec::new(),
        };
        debug!(slot, candidates = candidates.len(), "Patient candidates");

        let matched = update
            .height_cm
            .and_then(|h| find_height_match(&candidates, h, self.config.height_tolerance_cm));

        if let Some(candidate) = matched {
            self.store
                .apply_scale_profile(&candidate.local_id, update)
                .map_err(|e| {
                    warn!(
                        slot,
                        patient_id = %candidate.local_id,
                        ?update,
                        error = %e,
                        "Patient update failed"
                    );
                    CommitFailure {
                        slot,
                        stage: CommitStage::PatientUpdate,
                        message: format!(
                            "update of patient {} failed: {}",
                            candidate.local_id, e
                        ),
                    }
                })?;
            info!(
                slot,
                patient_id = %candidate.local_id,
                name = %candidate.name,
                "Slot matched existing patient"
            );
            return Ok(PatientResolution::Updated {
                patient_id: candidate.local_id.clone(),
            });
        }

        let mut patient = Patient::new(self.config.placeholder_name(slot));
        patient.apply_scale_profile(update);
        self.store.insert_patient(&patient).map_err(|e| {
            warn!(slot, ?update, error = %e, "Patient creation failed");
            CommitFailure {
                slot,
                stage: CommitStage::PatientCreate,
                message: format!("creation of {} failed: {}", patient.name, e),
            }
        })?;
        info!(slot, patient_id = %patient.local_id, "Slot created new patient");
        Ok(PatientResolution::Created {
            patient_id: patient.local_id,
        })
    }
}
