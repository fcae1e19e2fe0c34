//! Patient database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbResult};
use crate::models::{
    ActivityLevel, Patient, PatientCandidate, PatientGender, ScaleProfileUpdate,
};

const PATIENT_COLUMNS: &str = "local_id, name, birth_date, gender, height_cm, athlete_mode, \
     activity_level, tanita_slot, tanita_profile_code, created_at, updated_at";

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    let gender: Option<i64> = row.get(3)?;
    let activity_level: Option<i64> = row.get(6)?;
    Ok(Patient {
        local_id: row.get(0)?,
        name: row.get(1)?,
        birth_date: row.get(2)?,
        gender: gender.and_then(PatientGender::from_code),
        height_cm: row.get(4)?,
        athlete_mode: row.get(5)?,
        activity_level: activity_level.and_then(ActivityLevel::from_code),
        tanita_slot: row.get(7)?,
        tanita_profile_code: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

impl Database {
    /// Insert a new patient.
    pub fn insert_patient(&self, patient: &Patient) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO patients (
                local_id, name, birth_date, gender, height_cm, athlete_mode,
                activity_level, tanita_slot, tanita_profile_code, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                patient.local_id,
                patient.name,
                patient.birth_date,
                patient.gender.map(PatientGender::code),
                patient.height_cm,
                patient.athlete_mode,
                patient.activity_level.map(ActivityLevel::code),
                patient.tanita_slot,
                patient.tanita_profile_code,
                patient.created_at,
                patient.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Overwrite the scale-owned fields of a patient. Name is untouched.
    pub fn update_patient_scale_fields(
        &self,
        local_id: &str,
        update: &ScaleProfileUpdate,
    ) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE patients SET
                birth_date = ?2,
                gender = ?3,
                height_cm = ?4,
                athlete_mode = ?5,
                activity_level = ?6,
                tanita_slot = ?7,
                tanita_profile_code = ?8,
                updated_at = datetime('now')
            WHERE local_id = ?1
            "#,
            params![
                local_id,
                update.birth_date,
                update.gender.map(PatientGender::code),
                update.height_cm,
                update.athlete_mode,
                update.activity_level.map(ActivityLevel::code),
                update.tanita_slot,
                update.tanita_profile_code,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a patient by local ID.
    pub fn get_patient(&self, local_id: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM patients WHERE local_id = ?", PATIENT_COLUMNS),
                [local_id],
                patient_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Patients with an exact birth date, in insertion order.
    pub fn find_patients_by_birth_date(&self, birth_date: &str) -> DbResult<Vec<PatientCandidate>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT local_id, name, height_cm
            FROM patients
            WHERE birth_date = ?
            ORDER BY rowid
            "#,
        )?;

        let rows = stmt.query_map([birth_date], |row| {
            Ok(PatientCandidate {
                local_id: row.get(0)?,
                name: row.get(1)?,
                height_cm: row.get(2)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Search patients by name (prefix match).
    pub fn search_patients(&self, query: &str, limit: usize) -> DbResult<Vec<Patient>> {
        let pattern = format!("{}%", query);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM patients WHERE name LIKE ? ORDER BY name LIMIT ?",
            PATIENT_COLUMNS
        ))?;

        let rows = stmt.query_map(params![pattern, limit as i64], patient_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// List all patients.
    pub fn list_patients(&self) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM patients ORDER BY name, rowid",
            PATIENT_COLUMNS
        ))?;

        let rows = stmt.query_map([], patient_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
