//! Scale measurement database operations.

use rusqlite::{params, Row};

use super::{Database, DbResult};
use crate::models::{BodyComposition, PersistedMeasurement, SegmentalMetrics};

const MEASUREMENT_COLUMNS: &str = "id, patient_id, measured_at, source, weight_kg, bmi, \
     body_fat_percent, water_percent, muscle_mass_percent_total, bone_mass_kg, \
     visceral_fat_rating, metabolic_age, daily_calorie_maintenance, \
     fat_arm_right, fat_arm_left, fat_leg_right, fat_leg_left, fat_trunk, \
     muscle_arm_right, muscle_arm_left, muscle_leg_right, muscle_leg_left, muscle_trunk, \
     fingerprint, created_at";

fn measurement_from_row(row: &Row<'_>) -> rusqlite::Result<PersistedMeasurement> {
    Ok(PersistedMeasurement {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        measured_at: row.get(2)?,
        source: row.get(3)?,
        weight_kg: row.get(4)?,
        composition: BodyComposition {
            bmi: row.get(5)?,
            body_fat_percent: row.get(6)?,
            water_percent: row.get(7)?,
            muscle_mass_percent_total: row.get(8)?,
            bone_mass_kg: row.get(9)?,
            visceral_fat_rating: row.get(10)?,
            metabolic_age: row.get(11)?,
            daily_calorie_maintenance: row.get(12)?,
            fat: SegmentalMetrics {
                arm_right: row.get(13)?,
                arm_left: row.get(14)?,
                leg_right: row.get(15)?,
                leg_left: row.get(16)?,
                trunk: row.get(17)?,
            },
            muscle: SegmentalMetrics {
                arm_right: row.get(18)?,
                arm_left: row.get(19)?,
                leg_right: row.get(20)?,
                leg_left: row.get(21)?,
                trunk: row.get(22)?,
            },
        },
        fingerprint: row.get(23)?,
        created_at: row.get(24)?,
    })
}

impl Database {
    /// Insert a measurement row. Rows are never updated by the importer.
    pub fn insert_measurement(&self, m: &PersistedMeasurement) -> DbResult<()> {
        let c = &m.composition;
        self.conn.execute(
            &format!(
                "INSERT INTO scale_measurements ({}) VALUES \
                 (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, \
                  ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25)",
                MEASUREMENT_COLUMNS
            ),
            params![
                m.id,
                m.patient_id,
                m.measured_at,
                m.source,
                m.weight_kg,
                c.bmi,
                c.body_fat_percent,
                c.water_percent,
                c.muscle_mass_percent_total,
                c.bone_mass_kg,
                c.visceral_fat_rating,
                c.metabolic_age,
                c.daily_calorie_maintenance,
                c.fat.arm_right,
                c.fat.arm_left,
                c.fat.leg_right,
                c.fat.leg_left,
                c.fat.trunk,
                c.muscle.arm_right,
                c.muscle.arm_left,
                c.muscle.leg_right,
                c.muscle.leg_left,
                c.muscle.trunk,
                m.fingerprint,
                m.created_at,
            ],
        )?;
        Ok(())
    }

    /// Measurements of a patient, oldest first.
    pub fn list_measurements_for_patient(
        &self,
        patient_id: &str,
    ) -> DbResult<Vec<PersistedMeasurement>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM scale_measurements WHERE patient_id = ? ORDER BY measured_at, rowid",
            MEASUREMENT_COLUMNS
        ))?;

        let rows = stmt.query_map([patient_id], measurement_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Whether a weigh-in with this fingerprint is already stored.
    pub fn measurement_exists(&self, patient_id: &str, fingerprint: &str) -> DbResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM scale_measurements WHERE patient_id = ? AND fingerprint = ?",
            params![patient_id, fingerprint],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn count_measurements(&self) -> DbResult<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM scale_measurements", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
