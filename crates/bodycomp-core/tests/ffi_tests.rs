//! Tests for the exported FFI surface.

use std::fs;

use bodycomp_core::{open_database_in_memory, open_database_with_config, BodyCompError};

fn export_dir() -> tempfile::TempDir {
    let tmp = tempfile::tempdir().unwrap();
    let graph = tmp.path().join("GRAPHV1");
    fs::create_dir_all(graph.join("SYSTEM")).unwrap();
    fs::create_dir_all(graph.join("DATA")).unwrap();
    fs::write(
        graph.join("SYSTEM").join("PROF1.CSV"),
        "DB,\"01/05/1990\",GE,2,Hm,165,AL,1,Bt,0,CS,F1",
    )
    .unwrap();
    fs::write(
        graph.join("DATA").join("DATA1.CSV"),
        "DT,\"01/06/2024\",Ti,\"08:30:00\",Wk,60.5,Fr,30.1,FR,33.2\n",
    )
    .unwrap();
    tmp
}

#[test]
fn test_scan_then_commit() {
    let tmp = export_dir();
    let core = open_database_in_memory().unwrap();

    let preview = core
        .scan_export(tmp.path().display().to_string())
        .unwrap();
    assert_eq!(preview.profiles_found, 1);
    assert_eq!(preview.reports.len(), 4);
    assert!(preview.reports[0].included);
    assert!(preview.reports[1].skip_reason.is_some());
    assert_eq!(preview.slots[0].profile.device_gender_code, Some(2));
    assert_eq!(preview.slots[0].measurements[0].fat_arm_right, Some(30.1));
    assert_eq!(preview.slots[0].measurements[0].fat_leg_right, Some(33.2));

    let summary = core.commit_import(preview).unwrap();
    assert_eq!(summary.patients_touched, 1);
    assert_eq!(summary.measurements_inserted, 1);
    assert!(summary.failures.is_empty());

    let patients = core.list_patients().unwrap();
    assert_eq!(patients.len(), 1);
    assert_eq!(patients[0].gender_code, Some(0));

    let rows = core.list_measurements(patients[0].local_id.clone()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].measured_at, "2024-06-01 08:30:00");
    assert_eq!(rows[0].source, "tanita");
}

#[test]
fn test_commit_rejects_bad_slot() {
    let tmp = export_dir();
    let core = open_database_in_memory().unwrap();
    let mut preview = core.scan_export(tmp.path().display().to_string()).unwrap();
    preview.slots[0].slot = 9;

    let err = core.commit_import(preview).unwrap_err();
    assert!(matches!(err, BodyCompError::InvalidInput(_)));
    assert!(core.list_patients().unwrap().is_empty());
}

#[test]
fn test_scan_errors() {
    let tmp = tempfile::tempdir().unwrap();
    let core = open_database_in_memory().unwrap();
    let err = core
        .scan_export(tmp.path().display().to_string())
        .unwrap_err();
    assert!(matches!(err, BodyCompError::ImportError(_)));

    let err = core.list_measurements("nobody".into()).unwrap_err();
    assert!(matches!(err, BodyCompError::NotFound(_)));
}

#[test]
fn test_open_with_config() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("store.db").display().to_string();

    let err = open_database_with_config(path.clone(), r#"{"height_tolerance_cm": -2}"#.into());
    assert!(matches!(err, Err(BodyCompError::ConfigError(_))));

    let config = r#"{"placeholder_name_prefix": "Balança"}"#;
    let core = open_database_with_config(path, config.into()).unwrap();
    let export = export_dir();
    let preview = core.scan_export(export.path().display().to_string()).unwrap();
    core.commit_import(preview).unwrap();
    assert_eq!(core.list_patients().unwrap()[0].name, "Balança 1");
}
