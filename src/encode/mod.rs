//! Per-tool serialization of testing problems.
//!
//! Each submodule writes one input syntax. Domain declarations never depend
//! on the constraint; only the constraint section does. The graph tools go
//! through an external reduction script fed with a QICT condition file.

pub mod acts;
pub mod casa;
pub mod graph;
pub mod jenny;
pub mod qict;
pub mod tcases;

use crate::config::ToolPaths;
use crate::diagnostics::LabError;
use crate::lab::process::ProcessRunner;
use crate::problem::Problem;
use crate::tool::ToolId;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// What an encoder may need beyond the problem itself.
pub struct EncodeContext<'a> {
    pub paths: &'a ToolPaths,
    pub runner: &'a dyn ProcessRunner,
    /// Bound on the reduction script.
    pub timeout: Duration,
    /// Where temporary condition files go.
    pub scratch_dir: &'a Path,
}

/// Writes the input of `tool` for `problem`. Support is checked by the caller.
pub(crate) fn encode(
    problem: &Problem,
    tool: ToolId,
    sink: &mut dyn Write,
    ctx: &EncodeContext<'_>,
) -> Result<(), LabError> {
    match tool {
        ToolId::Jenny => jenny::write_arguments(problem, sink),
        ToolId::Tcases => tcases::write_system(problem, sink),
        ToolId::Acts => acts::write(problem, sink),
        ToolId::Casa => casa::write(problem, sink),
        ToolId::Coloring => graph::reduce(problem, graph::Reduction::Graph, sink, ctx),
        ToolId::Hypergraph => graph::reduce(problem, graph::Reduction::Hypergraph, sink, ctx),
        // Results come from a table; there is no input file.
        ToolId::Gbga => Ok(()),
    }
}

/// Joins `items` with `sep` into `sink` without an intermediate string.
pub(crate) fn write_joined<I, T>(sink: &mut dyn Write, items: I, sep: &str) -> std::io::Result<()>
where
    I: IntoIterator<Item = T>,
    T: std::fmt::Display,
{
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            sink.write_all(sep.as_bytes())?;
        }
        write!(sink, "{}", item)?;
    }
    Ok(())
}
