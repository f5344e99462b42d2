//! Properties artifact writer
//!
//! Each run appends one JSON object (listing ID -> record) as a single line
//! to the configured file. Earlier runs are never rewritten.

use crate::extract::ListingRecord;
use crate::output::traits::{OutputResult, RecordExporter};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appends the record collection to a text file as one JSON line
#[derive(Debug, Clone)]
pub struct JsonAppendExporter {
    path: PathBuf,
}

impl JsonAppendExporter {
    /// Creates an exporter writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The artifact path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordExporter for JsonAppendExporter {
    fn export(&self, records: &BTreeMap<String, ListingRecord>) -> OutputResult<usize> {
        let mut line = serde_json::to_string(records)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.flush()?;

        tracing::debug!(
            "Appended {} records ({} bytes) to {}",
            records.len(),
            line.len(),
            self.path.display()
        );

        Ok(records.len())
    }
}
