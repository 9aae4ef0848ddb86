//! Backup catalog: discovery and ordering of kubeconfig backups.
//!
//! Backups live next to the kubeconfig they were taken from, named
//! `<basename>.backup.<YYYYMMDD-HHMMSS>`. Anything whose suffix does not
//! parse as that exact timestamp format is silently skipped — including
//! selective backups, which use a different prefix precisely so they are
//! never offered as restore candidates.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::error::{Error, Result};
use crate::kubeconfig::BACKUP_TIME_FORMAT;

/// Human-facing timestamp format for backup listings.
const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A discovered backup file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backup {
    /// File name (no directory).
    pub name: String,
    /// Full path to the backup file.
    pub path: PathBuf,
    /// Timestamp parsed from the file name suffix.
    pub timestamp: NaiveDateTime,
}

impl Backup {
    /// Timestamp formatted for display in the selection list.
    pub fn display_time(&self) -> String {
        self.timestamp.format(DISPLAY_TIME_FORMAT).to_string()
    }
}

/// Find all full backups co-located with the given kubeconfig, newest first.
///
/// Backups are discovered, never mutated; no rotation or limit is imposed.
pub fn find_backups(kubeconfig_path: &Path) -> Result<Vec<Backup>> {
    let dir = kubeconfig_path.parent().unwrap_or_else(|| Path::new("."));
    let base_name = kubeconfig_path
        .file_name()
        .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
    let prefix = format!("{base_name}.backup.");

    let entries = fs::read_dir(dir).map_err(|source| Error::BackupScan {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut backups = Vec::new();
    for entry in entries {
        let Ok(entry) = entry else { continue };
        let file_name = entry.file_name().to_string_lossy().into_owned();

        if entry.path().is_dir() {
            continue;
        }
        let Some(suffix) = file_name.strip_prefix(&prefix) else {
            continue;
        };
        // Skip files that don't match our backup format.
        let Ok(timestamp) = NaiveDateTime::parse_from_str(suffix, BACKUP_TIME_FORMAT) else {
            continue;
        };

        backups.push(Backup {
            path: dir.join(&file_name),
            name: file_name,
            timestamp,
        });
    }

    backups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(backups)
}
