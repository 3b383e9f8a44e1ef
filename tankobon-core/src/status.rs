//! Per-folder processing status, the resumability record.
//!
//! The status file is plain JSON keyed by chapter-range labels. Writes go
//! through a temporary file in the same directory followed by an atomic
//! rename, so a crash mid-write never leaves a half-written file behind.

use std::collections::BTreeMap;
use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::errors::Result;

/// Name of the status file kept inside each processed folder.
pub const STATUS_FILE: &str = ".tankobon-status.json";

/// Which parts have been combined and which converted, keyed by chapter range.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    processed_cbz_parts: BTreeMap<String, bool>,
    #[serde(default)]
    converted_mobi_parts: BTreeMap<String, bool>,
    #[serde(skip)]
    path: Utf8PathBuf,
}

impl Status {
    /// Loads the status file from `folder`. A missing or unreadable file just
    /// means nothing has been done yet, never an error.
    #[must_use]
    pub fn load(folder: &Utf8Path) -> Self {
        let path = folder.join(STATUS_FILE);

        let mut status = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<Self>(&bytes) {
                Ok(status) => {
                    debug!("loaded processing status from '{path}'");
                    status
                }
                Err(err) => {
                    warn!("failed to parse status file '{path}': {err}");
                    Self::default()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!("status file '{path}' does not exist, initializing new status");
                Self::default()
            }
            Err(err) => {
                warn!("failed to read status file '{path}': {err}");
                Self::default()
            }
        };

        status.path = path;
        status
    }

    /// Writes the record to a temporary file next to the status file, then
    /// atomically renames it into place.
    ///
    /// ## Errors
    ///
    /// Fails when the temporary file can't be written or renamed.
    pub fn save(&self) -> Result<()> {
        let directory = self.path.parent().unwrap_or(Utf8Path::new("."));

        let mut temp = NamedTempFile::new_in(directory)?;
        serde_json::to_writer_pretty(&mut temp, self)?;
        temp.persist(&self.path).map_err(|err| err.error)?;

        debug!("saved processing status to '{}'", self.path);

        Ok(())
    }

    /// Marks the range as combined and persists immediately.
    ///
    /// ## Errors
    ///
    /// Fails when the status file can't be written.
    pub fn mark_combined(&mut self, range: &str) -> Result<()> {
        self.processed_cbz_parts.insert(range.to_string(), true);
        self.save()
    }

    /// Marks the range as converted and persists immediately.
    ///
    /// ## Errors
    ///
    /// Fails when the status file can't be written.
    pub fn mark_converted(&mut self, range: &str) -> Result<()> {
        self.converted_mobi_parts.insert(range.to_string(), true);
        self.save()
    }

    #[must_use]
    pub fn is_combined(&self, range: &str) -> bool {
        self.processed_cbz_parts.contains_key(range)
    }

    #[must_use]
    pub fn is_converted(&self, range: &str) -> bool {
        self.converted_mobi_parts.contains_key(range)
    }

    #[must_use]
    pub fn combined_ranges(&self) -> Vec<&str> {
        self.processed_cbz_parts.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn converted_ranges(&self) -> Vec<&str> {
        self.converted_mobi_parts.keys().map(String::as_str).collect()
    }
}
