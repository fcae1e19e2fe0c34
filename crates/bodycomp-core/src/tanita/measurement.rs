//! Parser for `DATA{slot}.CSV` measurement files.

use tracing::debug;

use crate::models::{BodyComposition, ScaleMeasurementRecord};

use super::numeric::{parse_decimal, parse_integer, strip_quotes};
use super::record::{FieldSetter, KeyValueLine};

/// Accumulator for one line before the completeness check.
#[derive(Debug, Default)]
struct MeasurementDraft {
    date: Option<String>,
    time: Option<String>,
    weight_kg: Option<f64>,
    composition: BodyComposition,
}

impl MeasurementDraft {
    /// Date, time and a positive weight are mandatory.
    fn finish(self) -> Option<ScaleMeasurementRecord> {
        let date = self.date.filter(|d| !d.is_empty())?;
        let time = self.time.filter(|t| !t.is_empty())?;
        let weight_kg = self.weight_kg.filter(|w| *w > 0.0)?;
        Some(ScaleMeasurementRecord {
            timestamp: format!("{} {}", date, time),
            weight_kg,
            composition: self.composition,
        })
    }
}

fn int32(v: &str) -> Option<i32> {
    parse_integer(v).and_then(|n| i32::try_from(n).ok())
}

type D = MeasurementDraft;

/// Measurement key codes. Matching is exact-case: `Fr` (fat, right arm)
/// and `FR` (fat, right leg) are different fields.
static MEASUREMENT_FIELDS: &[(&str, FieldSetter<MeasurementDraft>)] = &[
    ("DT", |m: &mut D, v: &str| m.date = Some(strip_quotes(v).to_string())),
    ("Ti", |m: &mut D, v: &str| m.time = Some(strip_quotes(v).to_string())),
    ("Wk", |m: &mut D, v: &str| m.weight_kg = parse_decimal(v)),
    ("MI", |m: &mut D, v: &str| m.composition.bmi = parse_decimal(v)),
    ("FW", |m: &mut D, v: &str| m.composition.body_fat_percent = parse_decimal(v)),
    ("ww", |m: &mut D, v: &str| m.composition.water_percent = parse_decimal(v)),
    ("mW", |m: &mut D, v: &str| {
        m.composition.muscle_mass_percent_total = parse_decimal(v)
    }),
    ("bW", |m: &mut D, v: &str| m.composition.bone_mass_kg = parse_decimal(v)),
    ("IF", |m: &mut D, v: &str| m.composition.visceral_fat_rating = int32(v)),
    ("rA", |m: &mut D, v: &str| m.composition.metabolic_age = int32(v)),
    ("rD", |m: &mut D, v: &str| {
        m.composition.daily_calorie_maintenance = int32(v)
    }),
    ("Fr", |m: &mut D, v: &str| m.composition.fat.arm_right = parse_decimal(v)),
    ("Fl", |m: &mut D, v: &str| m.composition.fat.arm_left = parse_decimal(v)),
    ("FR", |m: &mut D, v: &str| m.composition.fat.leg_right = parse_decimal(v)),
    ("FL", |m: &mut D, v: &str| m.composition.fat.leg_left = parse_decimal(v)),
    ("FT", |m: &mut D, v: &str| m.composition.fat.trunk = parse_decimal(v)),
    ("mr", |m: &mut D, v: &str| m.composition.muscle.arm_right = parse_decimal(v)),
    ("ml", |m: &mut D, v: &str| m.composition.muscle.arm_left = parse_decimal(v)),
    ("mR", |m: &mut D, v: &str| m.composition.muscle.leg_right = parse_decimal(v)),
    ("mL", |m: &mut D, v: &str| m.composition.muscle.leg_left = parse_decimal(v)),
    ("mT", |m: &mut D, v: &str| m.composition.muscle.trunk = parse_decimal(v)),
];

/// Parse one measurement line. Incomplete lines yield `None`.
pub fn parse_measurement_line(line: &str) -> Option<ScaleMeasurementRecord> {
    let mut draft = MeasurementDraft::default();
    KeyValueLine::parse(line).apply(&mut draft, MEASUREMENT_FIELDS);
    draft.finish()
}

/// Parse a measurement file, keeping file order.
pub fn parse_measurements(content: &str, slot: u8) -> Vec<ScaleMeasurementRecord> {
    let mut dropped = 0usize;
    let measurements: Vec<_> = content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| {
            let parsed = parse_measurement_line(l);
            if parsed.is_none() {
                dropped += 1;
            }
            parsed
        })
        .collect();

    debug!(slot, kept = measurements.len(), dropped, "Parsed measurement file");
    measurements
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "MO,\"BC-601\",DT,\"01/06/2024\",Ti,\"08:30:00\",Bt,0,GE,1,AG,34,Hm,175.5,\
AL,2,Wk,80.2,MI,26.1,FW,18.5,Fr,15.2,Fl,15.9,FR,17.1,FL,17.4,FT,20.3,mW,62.4,mr,3.4,ml,3.3,\
mR,10.2,mL,10.1,mT,35.4,bW,3.3,IF,7,rD,2450,rA,30,ww,57.3,CS,9A";

    #[test]
    fn test_full_line() {
        let m = parse_measurement_line(FULL).unwrap();
        assert_eq!(m.timestamp, "01/06/2024 08:30:00");
        assert_eq!(m.weight_kg, 80.2);
        let c = &m.composition;
        assert_eq!(c.bmi, Some(26.1));
        assert_eq!(c.body_fat_percent, Some(18.5));
        assert_eq!(c.water_percent, Some(57.3));
        assert_eq!(c.muscle_mass_percent_total, Some(62.4));
        assert_eq!(c.bone_mass_kg, Some(3.3));
        assert_eq!(c.visceral_fat_rating, Some(7));
        assert_eq!(c.metabolic_age, Some(30));
        assert_eq!(c.daily_calorie_maintenance, Some(2450));
    }

    #[test]
    fn test_segmental_case_sensitivity() {
        let m = parse_measurement_line(FULL).unwrap();
        let fat = m.composition.fat;
        assert_eq!(fat.arm_right, Some(15.2));
        assert_eq!(fat.arm_left, Some(15.9));
        assert_eq!(fat.leg_right, Some(17.1));
        assert_eq!(fat.leg_left, Some(17.4));
        assert_eq!(fat.trunk, Some(20.3));

        let muscle = m.composition.muscle;
        assert_eq!(muscle.arm_right, Some(3.4));
        assert_eq!(muscle.arm_left, Some(3.3));
        assert_eq!(muscle.leg_right, Some(10.2));
        assert_eq!(muscle.leg_left, Some(10.1));
        assert_eq!(muscle.trunk, Some(35.4));

        // lowercase "fr" is not a known code
        let m = parse_measurement_line("DT,01/06/2024,Ti,08:30:00,Wk,80,fr,9.9").unwrap();
        assert_eq!(m.composition.fat.arm_right, None);
    }

    #[test]
    fn test_completeness_gate() {
        assert!(parse_measurement_line("DT,\"01/06/2024\",Ti,\"08:30:00\",Wk,80.2").is_some());
        assert!(parse_measurement_line("Ti,\"08:30:00\",Wk,80.2,MI,26.1").is_none());
        assert!(parse_measurement_line("DT,\"01/06/2024\",Wk,80.2").is_none());
        assert!(parse_measurement_line("DT,\"01/06/2024\",Ti,\"08:30:00\",MI,26.1").is_none());
        assert!(parse_measurement_line("DT,\"01/06/2024\",Ti,\"08:30:00\",Wk,abc").is_none());
        assert!(parse_measurement_line("DT,\"01/06/2024\",Ti,\"08:30:00\",Wk,0").is_none());
        assert!(parse_measurement_line("DT,\"\",Ti,\"08:30:00\",Wk,80").is_none());
    }

    #[test]
    fn test_weight_with_unit_suffix() {
        let m = parse_measurement_line("DT,01/06/2024,Ti,08:30:00,Wk,80.2kg").unwrap();
        assert_eq!(m.weight_kg, 80.2);
    }

    #[test]
    fn test_comma_decimal_weight() {
        let m =
            parse_measurement_line("DT,01/06/2024,Ti,08:30:00,Wk,\"80,2\",MI,\"26,1\"").unwrap();
        assert_eq!(m.weight_kg, 80.2);
        assert_eq!(m.composition.bmi, Some(26.1));
    }

    #[test]
    fn test_file_order_and_drops() {
        let content = "DT,01/06/2024,Ti,08:30:00,Wk,80.2\r\n\
                       \r\n\
                       DT,02/06/2024,Wk,79.9\r\n\
                       DT,03/06/2024,Ti,07:45:10,Wk,79.5\r\n";
        let ms = parse_measurements(content, 1);
        assert_eq!(ms.len(), 2);
        assert_eq!(ms[0].timestamp, "01/06/2024 08:30:00");
        assert_eq!(ms[1].timestamp, "03/06/2024 07:45:10");
        assert_eq!(parse_measurements(content, 1), ms);
    }

    #[test]
    fn test_empty_file() {
        assert!(parse_measurements("", 4).is_empty());
    }
}
