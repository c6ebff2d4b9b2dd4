//! Write-only destinations for experiment results.

use crate::diagnostics::LabError;
use crate::lab::region::ParamValue;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Everything known about one experiment after it ran.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentRecord {
    pub id: usize,
    pub tool: String,
    pub problem: String,
    pub inputs: BTreeMap<String, ParamValue>,
    pub outputs: BTreeMap<String, ParamValue>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Receives experiment records. Sinks absorb their own failures.
pub trait ResultSink {
    fn record(&mut self, record: &ExperimentRecord);

    fn finish(&mut self) {}
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct RecordBuffer {
    pub records: Vec<ExperimentRecord>,
}

impl RecordBuffer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultSink for RecordBuffer {
    fn record(&mut self, record: &ExperimentRecord) {
        self.records.push(record.clone());
    }
}

/// Appends one JSON object per line.
pub struct JsonLinesSink {
    writer: BufWriter<File>,
    path: String,
}

impl JsonLinesSink {
    /// Opens `path` for appending, creating it and its directory if needed.
    pub fn create(path: &Path) -> Result<Self, LabError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| LabError::io("create directory", parent, e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| LabError::io("open", path, e))?;
        Ok(Self {
            writer: BufWriter::new(file),
            path: path.display().to_string(),
        })
    }
}

impl ResultSink for JsonLinesSink {
    fn record(&mut self, record: &ExperimentRecord) {
        let written = serde_json::to_string(record)
            .map_err(|e| e.to_string())
            .and_then(|line| writeln!(self.writer, "{}", line).map_err(|e| e.to_string()));
        if let Err(e) = written {
            tracing::warn!(path = %self.path, experiment = record.id, "could not write result: {}", e);
        }
    }

    fn finish(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::warn!(path = %self.path, "could not flush results: {}", e);
        }
    }
}

impl Drop for JsonLinesSink {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
