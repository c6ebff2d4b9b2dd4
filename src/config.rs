//! Lab configuration, loaded from YAML.
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! standard sweep: t in 2..=3, v and n in 2..=6, four tools, plain t-way
//! generation only.

use crate::diagnostics::LabError;
use crate::tool::ToolId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Inclusive integer range of one sweep axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntRange {
    pub min: u32,
    pub max: u32,
}

impl IntRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

/// Inclusive stepped range, used for the number of existing tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRange {
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

/// Which testing problems the sweep includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProblemToggles {
    pub t_way: bool,
    pub forbidden_tuples: bool,
    pub increasing_values: bool,
    pub test_suite_completion: bool,
}

impl Default for ProblemToggles {
    fn default() -> Self {
        Self {
            t_way: true,
            forbidden_tuples: false,
            increasing_values: false,
            test_suite_completion: false,
        }
    }
}

/// Locations of the external executables, jars and reduction scripts.
/// Bare names are looked up on `PATH`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub jenny: PathBuf,
    pub casa: PathBuf,
    pub java: PathBuf,
    pub php: PathBuf,
    pub dsatur: PathBuf,
    pub tcases_jar: PathBuf,
    pub acts_jar: PathBuf,
    pub hitting_set_jar: PathBuf,
    pub graph_script: PathBuf,
    pub hypergraph_script: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            jenny: "jenny".into(),
            casa: "casa-1.1b".into(),
            java: "java".into(),
            php: "php".into(),
            dsatur: "./dsatur".into(),
            tcases_jar: "tcases.jar".into(),
            acts_jar: "acts_3.1.jar".into(),
            hitting_set_jar: "hitting-set-0.9.0-standalone.jar".into(),
            graph_script: "variables-to-graph.php".into(),
            hypergraph_script: "variables-to-hypergraph.php".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    /// Where input files are cached.
    pub data_folder: PathBuf,
    /// Upper bound on a single tool invocation.
    pub timeout_ms: u64,
    /// Generate inputs and walk the lifecycle without running any tool.
    pub dry_run: bool,
    /// Seed for the pre-existing tests of completion problems.
    pub seed: u64,
    pub t: IntRange,
    pub v: IntRange,
    pub n: IntRange,
    pub tools: Vec<ToolId>,
    pub problems: ProblemToggles,
    /// Candidate fractions for forbidden tuples.
    pub fractions: Vec<f64>,
    pub num_tests: StepRange,
    pub paths: ToolPaths,
    /// Tab-separated GBGA results (`t n v size time`).
    pub gbga_table: Option<PathBuf>,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            data_folder: "data".into(),
            timeout_ms: 100_000,
            dry_run: false,
            seed: 0,
            t: IntRange::new(2, 3),
            v: IntRange::new(2, 6),
            n: IntRange::new(2, 6),
            tools: vec![ToolId::Casa, ToolId::Jenny, ToolId::Gbga, ToolId::Hypergraph],
            problems: ProblemToggles::default(),
            fractions: vec![0.0, 0.1, 0.2, 0.5],
            num_tests: StepRange {
                min: 0,
                max: 10,
                step: 2,
            },
            paths: ToolPaths::default(),
            gbga_table: None,
        }
    }
}

impl LabConfig {
    /// Reads and validates a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, LabError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| LabError::io("read", path, e))?;
        let config = Self::from_yaml(&content)?;
        tracing::debug!(path = %path.display(), "loaded lab configuration");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, LabError> {
        let config: LabConfig = if content.trim().is_empty() {
            LabConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| LabError::config(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LabError> {
        for (name, range) in [("t", self.t), ("v", self.v), ("n", self.n)] {
            if range.min > range.max {
                return Err(LabError::config(format!(
                    "range '{}' is empty: {} > {}",
                    name, range.min, range.max
                )));
            }
        }
        if self.t.min < 1 {
            return Err(LabError::config("t must be at least 1"));
        }
        if self.v.min < 2 {
            return Err(LabError::config("v must be at least 2"));
        }
        if self.timeout_ms == 0 {
            return Err(LabError::config("timeout_ms must be positive"));
        }
        if self.num_tests.step == 0 || self.num_tests.min > self.num_tests.max {
            return Err(LabError::config(
                "num_tests needs min <= max and a positive step",
            ));
        }
        if let Some(f) = self.fractions.iter().find(|f| !(0.0..=1.0).contains(*f)) {
            return Err(LabError::config(format!(
                "fraction {} is outside [0, 1]",
                f
            )));
        }
        if self.tools.is_empty() {
            return Err(LabError::config("no tools selected"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
