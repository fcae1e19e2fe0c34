//! End-to-end tests: export folder on disk → scan → commit.

use std::fs;
use std::path::Path;

use bodycomp_core::db::Database;
use bodycomp_core::models::{DeviceGender, PatientGender, SkipReason, SlotOutcome};
use bodycomp_core::{ImportConfig, Importer, Patient, Reconciler};

const PROFILE_1: &str = "DB,\"01/05/1990\",GE,1,Hm,175.5,AL,2,Bt,0,CS,ABC123";
const DATA_1: &str = "DT,\"01/06/2024\",Ti,\"08:30:00\",Wk,80.2,MI,26.1,FW,18.5";

/// Build `<root>/<prefix>GRAPHV1/{SYSTEM,DATA}` and write the given slots.
fn write_export(root: &Path, prefix: &str, slots: &[(u8, Option<&str>, Option<&str>)]) {
    let graph = root.join(prefix).join("GRAPHV1");
    fs::create_dir_all(graph.join("SYSTEM")).unwrap();
    fs::create_dir_all(graph.join("DATA")).unwrap();
    for (slot, profile, data) in slots {
        if let Some(p) = profile {
            fs::write(graph.join("SYSTEM").join(format!("PROF{}.CSV", slot)), p).unwrap();
        }
        if let Some(d) = data {
            fs::write(graph.join("DATA").join(format!("DATA{}.CSV", slot)), d).unwrap();
        }
    }
}

#[test]
fn test_reference_scenario() {
    let tmp = tempfile::tempdir().unwrap();
    write_export(tmp.path(), "", &[(1, Some(PROFILE_1), Some(DATA_1))]);

    let run = Importer::new().scan(tmp.path()).unwrap();
    assert_eq!(run.profiles_found(), 1);

    let slot = &run.results[0];
    assert_eq!(slot.slot, 1);
    assert_eq!(slot.profile.gender, Some(DeviceGender::Male));
    assert_eq!(slot.profile.height_cm, Some(175.5));
    assert_eq!(slot.measurements.len(), 1);
    assert_eq!(slot.measurements[0].weight_kg, 80.2);

    let db = Database::open_in_memory().unwrap();
    let summary = Reconciler::new(&db, ImportConfig::default()).commit(&run.results);
    assert_eq!(summary.patients_touched(), 1);
    assert_eq!(summary.measurements_inserted, 1);

    let patients = db.list_patients().unwrap();
    assert_eq!(patients.len(), 1);
    let patient = &patients[0];
    assert_eq!(patient.name, "Tanita Slot 1");
    assert_eq!(patient.birth_date.as_deref(), Some("1990-05-01"));
    assert_eq!(patient.gender, Some(PatientGender::Male));
    assert_eq!(patient.height_cm, Some(175.5));
    assert_eq!(patient.tanita_profile_code.as_deref(), Some("ABC123"));

    let rows = db.list_measurements_for_patient(&patient.local_id).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].measured_at, "2024-06-01 08:30:00");
    assert_eq!(rows[0].weight_kg, 80.2);
    assert_eq!(rows[0].composition.bmi, Some(26.1));
    assert_eq!(rows[0].composition.body_fat_percent, Some(18.5));
}

#[test]
fn test_nested_tanita_layout_with_missing_slot() {
    let tmp = tempfile::tempdir().unwrap();
    write_export(
        tmp.path(),
        "TANITA",
        &[
            (1, Some(PROFILE_1), Some(DATA_1)),
            (2, Some("DB,\"02/02/1982\",GE,2,Hm,160"), None),
            (3, Some("DB,\"03/03/1983\",GE,2,Hm,\"158,5\""), Some(DATA_1)),
            (4, Some("DB,\"04/04/1984\",GE,1,Hm,190"), Some(DATA_1)),
        ],
    );

    let run = Importer::new().scan(tmp.path()).unwrap();
    let included: Vec<u8> = run.results.iter().map(|r| r.slot).collect();
    assert_eq!(included, vec![1, 3, 4]);
    assert_eq!(
        run.reports[1].outcome,
        SlotOutcome::Skipped(SkipReason::MissingFile("DATA2.CSV".into()))
    );

    let db = Database::open_in_memory().unwrap();
    let summary = Reconciler::new(&db, ImportConfig::default()).commit(&run.results);
    assert_eq!(summary.patients_created, 3);
    assert_eq!(summary.measurements_inserted, 3);

    // Device female (2) lands as application female (0)
    let slot3 = db.search_patients("Tanita Slot 3", 1).unwrap();
    assert_eq!(slot3[0].gender.map(PatientGender::code), Some(0));
    assert_eq!(slot3[0].height_cm, Some(158.5));
}

#[test]
fn test_matches_existing_patient_and_keeps_name() {
    let tmp = tempfile::tempdir().unwrap();
    write_export(
        tmp.path(),
        "",
        &[(
            2,
            Some("DB,\"01/05/1990\",GE,2,Hm,171.9,AL,4,Bt,1,CS,Z9"),
            Some(
                "DT,\"01/06/2024\",Ti,\"08:30:00\",Wk,\"61,2\"\n\
                 DT,\"08/06/2024\",Ti,\"08:31:00\",Wk,\"61,0\"\n",
            ),
        )],
    );

    let db = Database::open_in_memory().unwrap();
    let mut maria = Patient::new("Maria".into());
    maria.birth_date = Some("1990-05-01".into());
    maria.height_cm = Some(170.0);
    db.insert_patient(&maria).unwrap();

    let run = Importer::new().scan(tmp.path()).unwrap();
    let summary = Reconciler::new(&db, ImportConfig::default()).commit(&run.results);
    assert_eq!(summary.patients_updated, 1);
    assert_eq!(summary.measurements_inserted, 2);

    let stored = db.get_patient(&maria.local_id).unwrap().unwrap();
    assert_eq!(stored.name, "Maria");
    assert_eq!(stored.height_cm, Some(171.9));
    assert!(stored.athlete_mode);
    assert_eq!(stored.tanita_slot, Some(2));

    let rows = db.list_measurements_for_patient(&maria.local_id).unwrap();
    let weights: Vec<f64> = rows.iter().map(|r| r.weight_kg).collect();
    assert_eq!(weights, vec![61.2, 61.0]);
}

#[test]
fn test_unrecognized_folder_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    fs::create_dir_all(tmp.path().join("SYSTEM")).unwrap();
    assert!(Importer::new().scan(tmp.path()).is_err());
}
