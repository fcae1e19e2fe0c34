//! Persistence boundary used by the reconciler.

use crate::db::{Database, DbError};
use crate::models::{Patient, PatientCandidate, PersistedMeasurement, ScaleProfileUpdate};

/// Operations the reconciler needs from a patient store.
///
/// Calls are issued strictly in sequence; implementations need no
/// transactional guarantees across calls.
pub trait PatientStore {
    type Error: std::error::Error;

    /// Patients whose canonical birth date equals `birth_date`, in a stable order.
    fn find_patients_by_birth_date(
        &self,
        birth_date: &str,
    ) -> Result<Vec<PatientCandidate>, Self::Error>;

    fn insert_patient(&self, patient: &Patient) -> Result<(), Self::Error>;

    /// Overwrite the scale-owned fields of an existing patient.
    fn apply_scale_profile(
        &self,
        patient_id: &str,
        update: &ScaleProfileUpdate,
    ) -> Result<(), Self::Error>;

    fn insert_measurement(&self, measurement: &PersistedMeasurement) -> Result<(), Self::Error>;

    fn measurement_exists(&self, patient_id: &str, fingerprint: &str) -> Result<bool, Self::Error>;
}

impl PatientStore for Database {
    type Error = DbError;

    fn find_patients_by_birth_date(
        &self,
        birth_date: &str,
    ) -> Result<Vec<PatientCandidate>, DbError> {
        Database::find_patients_by_birth_date(self, birth_date)
    }

    fn insert_patient(&self, patient: &Patient) -> Result<(), DbError> {
        Database::insert_patient(self, patient)
    }

    fn apply_scale_profile(
        &self,
        patient_id: &str,
        update: &ScaleProfileUpdate,
    ) -> Result<(), DbError> {
        if self.update_patient_scale_fields(patient_id, update)? {
            Ok(())
        } else {
            Err(DbError::NotFound(format!("patient {}", patient_id)))
        }
    }

    fn insert_measurement(&self, measurement: &PersistedMeasurement) -> Result<(), DbError> {
        Database::insert_measurement(self, measurement)
    }

    fn measurement_exists(&self, patient_id: &str, fingerprint: &str) -> Result<bool, DbError> {
        Database::measurement_exists(self, patient_id, fingerprint)
    }
}
