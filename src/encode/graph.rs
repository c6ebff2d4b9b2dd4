//! Graph and hypergraph inputs, produced by the external reduction scripts.

use crate::config::ToolPaths;
use crate::diagnostics::LabError;
use crate::encode::{qict, EncodeContext};
use crate::lab::files::scratch_path;
use crate::lab::process::Invocation;
use crate::problem::Problem;
use std::fs;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// DOT graph for the coloring tool.
    Graph,
    /// EDN hypergraph for the hitting-set tool.
    Hypergraph,
}

impl Reduction {
    pub fn invocation(&self, paths: &ToolPaths, t: usize, condition_file: &Path) -> Invocation {
        let file = condition_file.display().to_string();
        match self {
            Reduction::Graph => Invocation::new(&paths.php)
                .arg(paths.graph_script.display().to_string())
                .arg(t.to_string())
                .arg(file),
            Reduction::Hypergraph => Invocation::new(&paths.php)
                .arg(paths.hypergraph_script.display().to_string())
                .arg("-t")
                .arg(t.to_string())
                .arg("--edn")
                .arg(file),
        }
    }

    fn target(&self) -> &'static str {
        match self {
            Reduction::Graph => "graph",
            Reduction::Hypergraph => "hypergraph",
        }
    }
}

/// Writes the QICT condition file of `problem` to a scratch file, runs the
/// reduction script on it and copies the script's output into `sink`.
pub fn reduce(
    problem: &Problem,
    reduction: Reduction,
    sink: &mut dyn Write,
    ctx: &EncodeContext<'_>,
) -> Result<(), LabError> {
    fs::create_dir_all(ctx.scratch_dir)
        .map_err(|e| LabError::io("create directory", ctx.scratch_dir, e))?;
    let condition_file = scratch_path(ctx.scratch_dir, "conditions", "ncond");
    let mut conditions = Vec::new();
    qict::write(problem, &mut conditions)?;
    fs::write(&condition_file, &conditions)
        .map_err(|e| LabError::io("write", &condition_file, e))?;

    let invocation = reduction.invocation(ctx.paths, problem.shape().t(), &condition_file);
    tracing::debug!(command = %invocation, "reducing problem to a {}", reduction.target());
    let result = ctx.runner.run(&invocation, ctx.timeout);
    if let Err(e) = fs::remove_file(&condition_file) {
        tracing::debug!(path = %condition_file.display(), "could not remove condition file: {}", e);
    }

    let output = result.map_err(|e| LabError::InputGeneration {
        target: reduction.target().to_string(),
        reason: e.to_string(),
    })?;
    if output.trim().is_empty() {
        return Err(LabError::InputGeneration {
            target: reduction.target().to_string(),
            reason: "the reduction script produced no output".to_string(),
        });
    }
    sink.write_all(output.as_bytes())?;
    Ok(())
}
