//! Tanita export importer.
//!
//! Pipeline: locate `GRAPHV1` → per slot: profile file → measurement file
//! → [`ImportRun`] for operator review. Nothing here touches the patient
//! store; see [`crate::reconcile`] for the commit side.

mod dates;
mod layout;
mod measurement;
mod numeric;
mod profile;
mod record;

pub use dates::*;
pub use layout::*;
pub use measurement::*;
pub use numeric::*;
pub use profile::*;
pub use record::*;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::models::{ImportRun, SkipReason, SlotImportResult, SlotOutcome, SlotReport};

/// Importer errors.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error(
        "{} does not look like a Tanita export: no GRAPHV1 directory found",
        .0.display()
    )]
    ExportRootNotFound(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type ImportResult<T> = Result<T, ImportError>;

/// Scans a Tanita export directory.
#[derive(Debug, Default, Clone)]
pub struct Importer;

impl Importer {
    pub fn new() -> Self {
        Self
    }

    /// Read every slot under `root`.
    ///
    /// Fails only when no `GRAPHV1` directory exists. Each slot is isolated:
    /// a missing or empty file skips that slot and the scan moves on.
    pub fn scan(&self, root: &Path) -> ImportResult<ImportRun> {
        let layout = ExportLayout::locate(root)?;

        let mut results = Vec::new();
        let mut reports = Vec::new();

        for slot in SLOTS {
            let outcome = match self.read_slot(&layout, slot) {
                Ok(result) => {
                    let measurement_count = result.measurements.len();
                    info!(
                        slot,
                        measurements = measurement_count,
                        profile_code = result.profile_code.as_deref().unwrap_or(""),
                        "Slot included"
                    );
                    results.push(result);
                    SlotOutcome::Included { measurement_count }
                }
                Err(reason) => {
                    warn!(slot, reason = %reason, "Slot skipped");
                    SlotOutcome::Skipped(reason)
                }
            };
            reports.push(SlotReport { slot, outcome });
        }

        info!(
            profiles = results.len(),
            root = %layout.graph_dir.display(),
            "Scan completed"
        );

        Ok(ImportRun {
            export_root: layout.graph_dir,
            results,
            reports,
        })
    }

    fn read_slot(&self, layout: &ExportLayout, slot: u8) -> Result<SlotImportResult, SkipReason> {
        let files = layout.slot_files(slot)?;

        let content = read_device_file(&files.profile)
            .map_err(|e| SkipReason::Unreadable(e.to_string()))?;
        let profile = parse_profile(&content, slot).ok_or(SkipReason::EmptyProfile)?;

        let content = read_device_file(&files.measurements)
            .map_err(|e| SkipReason::Unreadable(e.to_string()))?;
        let measurements = parse_measurements(&content, slot);
        if measurements.is_empty() {
            return Err(SkipReason::NoMeasurements);
        }

        Ok(SlotImportResult {
            slot,
            profile_code: profile.profile_code.clone(),
            profile,
            measurements,
        })
    }
}
