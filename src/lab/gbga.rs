//! Published GBGA results.
//!
//! GBGA is not run; its sizes and times come from a tab-separated table with
//! columns `t n v size time` (time in seconds) and `#` comment lines.

use crate::diagnostics::LabError;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GbgaEntry {
    pub size: usize,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GbgaTable {
    entries: HashMap<(usize, usize, usize), GbgaEntry>,
}

impl GbgaTable {
    pub fn load(path: &Path) -> Result<Self, LabError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| LabError::io("read", path, e))?;
        let table = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), entries = table.len(), "loaded GBGA table");
        Ok(table)
    }

    pub fn parse(content: &str) -> Result<Self, LabError> {
        let mut entries = HashMap::new();
        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let bad = |what: &str| {
                LabError::config(format!("GBGA table line {}: {}", line_no + 1, what))
            };
            let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
            if fields.len() < 5 {
                return Err(bad("expected 5 tab-separated columns"));
            }
            let int = |i: usize| fields[i].parse::<usize>().map_err(|_| bad(fields[i]));
            let (t, n, v, size) = (int(0)?, int(1)?, int(2)?, int(3)?);
            let seconds: f64 = fields[4].parse().map_err(|_| bad(fields[4]))?;
            entries.insert(
                (t, v, n),
                GbgaEntry {
                    size,
                    duration_ms: (seconds * 1000.0).round() as u64,
                },
            );
        }
        Ok(Self { entries })
    }

    pub fn lookup(&self, t: usize, v: usize, n: usize) -> Option<GbgaEntry> {
        self.entries.get(&(t, v, n)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
