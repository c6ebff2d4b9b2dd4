//! Startup probe for the external tools a sweep needs.

use crate::config::LabConfig;
use crate::diagnostics::LabError;
use crate::tool::ToolId;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Probe {
    /// Looked up on `PATH` when given as a bare name.
    Executable(PathBuf),
    /// A jar or script, relative to the working directory.
    File(PathBuf),
}

impl Probe {
    fn path(&self) -> &Path {
        match self {
            Probe::Executable(p) | Probe::File(p) => p,
        }
    }

    fn is_available(&self) -> bool {
        match self {
            Probe::Executable(p) => executable_available(p),
            Probe::File(p) => p.is_file(),
        }
    }
}

fn executable_available(program: &Path) -> bool {
    if program.components().count() > 1 || program.is_absolute() {
        return program.is_file();
    }
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}

fn probes(tool: ToolId, config: &LabConfig) -> Vec<Probe> {
    let p = &config.paths;
    match tool {
        ToolId::Jenny => vec![Probe::Executable(p.jenny.clone())],
        ToolId::Casa => vec![Probe::Executable(p.casa.clone())],
        ToolId::Tcases => vec![
            Probe::Executable(p.java.clone()),
            Probe::File(p.tcases_jar.clone()),
        ],
        ToolId::Acts => vec![
            Probe::Executable(p.java.clone()),
            Probe::File(p.acts_jar.clone()),
        ],
        ToolId::Coloring => vec![
            Probe::Executable(p.dsatur.clone()),
            Probe::Executable(p.php.clone()),
            Probe::File(p.graph_script.clone()),
        ],
        ToolId::Hypergraph => vec![
            Probe::Executable(p.java.clone()),
            Probe::File(p.hitting_set_jar.clone()),
            Probe::Executable(p.php.clone()),
            Probe::File(p.hypergraph_script.clone()),
        ],
        ToolId::Gbga => match &config.gbga_table {
            Some(table) => vec![Probe::File(table.clone())],
            None => Vec::new(),
        },
    }
}

/// Lists, per configured tool, whatever it needs that cannot be found.
///
/// Returns one aggregated [`LabError::MissingExecutable`] warning, or `None`
/// when everything is present. Never fails the caller.
pub fn check_environment(config: &LabConfig) -> Option<LabError> {
    let mut missing = Vec::new();
    for &tool in &config.tools {
        let absent: Vec<String> = probes(tool, config)
            .iter()
            .filter(|probe| !probe.is_available())
            .map(|probe| probe.path().display().to_string())
            .collect();
        if !absent.is_empty() {
            missing.push(format!("{}: {}", tool, absent.join(", ")));
        }
        if tool == ToolId::Gbga && config.gbga_table.is_none() {
            missing.push("GBGA: no gbga_table configured".to_string());
        }
    }
    if missing.is_empty() {
        tracing::debug!("all external tools found");
        return None;
    }
    let warning = LabError::MissingExecutable { missing };
    tracing::warn!("{}", warning);
    Some(warning)
}
