//! Locating the export tree on disk.
//!
//! ```text
//! <root>/[TANITA/]GRAPHV1/SYSTEM/PROF{1..4}.CSV
//! <root>/[TANITA/]GRAPHV1/DATA/DATA{1..4}.CSV
//! ```

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::models::SkipReason;

use super::{ImportError, ImportResult};

pub const GRAPH_DIR: &str = "GRAPHV1";
pub const TANITA_DIR: &str = "TANITA";
pub const SYSTEM_DIR: &str = "SYSTEM";
pub const DATA_DIR: &str = "DATA";

/// Hardware slots on the scale.
pub const SLOTS: std::ops::RangeInclusive<u8> = 1..=4;

/// Resolved export directories.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportLayout {
    pub graph_dir: PathBuf,
    pub system_dir: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
}

/// Files for one slot.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotFiles {
    pub slot: u8,
    pub profile: PathBuf,
    pub measurements: PathBuf,
}

pub fn profile_file_name(slot: u8) -> String {
    format!("PROF{}.CSV", slot)
}

pub fn data_file_name(slot: u8) -> String {
    format!("DATA{}.CSV", slot)
}

impl ExportLayout {
    /// Find `GRAPHV1` directly under `root` or under `root/TANITA`.
    ///
    /// This is the only fatal lookup of an import run.
    pub fn locate(root: &Path) -> ImportResult<Self> {
        let graph_dir = find_entry(root, GRAPH_DIR, true)
            .or_else(|| {
                find_entry(root, TANITA_DIR, true).and_then(|t| find_entry(&t, GRAPH_DIR, true))
            })
            .ok_or_else(|| ImportError::ExportRootNotFound(root.to_path_buf()))?;

        debug!(path = %graph_dir.display(), "Found export directory");

        Ok(Self {
            system_dir: find_entry(&graph_dir, SYSTEM_DIR, true),
            data_dir: find_entry(&graph_dir, DATA_DIR, true),
            graph_dir,
        })
    }

    /// Resolve both files for a slot, or say why the slot cannot be read.
    pub fn slot_files(&self, slot: u8) -> Result<SlotFiles, SkipReason> {
        let system = self
            .system_dir
            .as_ref()
            .ok_or_else(|| SkipReason::MissingDirectory(SYSTEM_DIR.into()))?;
        let data = self
            .data_dir
            .as_ref()
            .ok_or_else(|| SkipReason::MissingDirectory(DATA_DIR.into()))?;

        let profile_name = profile_file_name(slot);
        let profile = find_entry(system, &profile_name, false)
            .ok_or(SkipReason::MissingFile(profile_name))?;

        let data_name = data_file_name(slot);
        let measurements =
            find_entry(data, &data_name, false).ok_or(SkipReason::MissingFile(data_name))?;

        Ok(SlotFiles {
            slot,
            profile,
            measurements,
        })
    }
}

/// Look up a child by ASCII case-insensitive name.
///
/// The exact name is tried first; a directory scan is the fallback for
/// exports copied off the device with altered case.
fn find_entry(dir: &Path, name: &str, want_dir: bool) -> Option<PathBuf> {
    let kind_ok = |p: &Path| if want_dir { p.is_dir() } else { p.is_file() };

    let exact = dir.join(name);
    if kind_ok(exact.as_path()) {
        return Some(exact);
    }

    std::fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .find(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.eq_ignore_ascii_case(name))
                .unwrap_or(false)
                && kind_ok(p.as_path())
        })
}

/// Read a device file, tolerating non-UTF-8 bytes.
pub fn read_device_file(path: &Path) -> ImportResult<String> {
    let bytes = std::fs::read(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
