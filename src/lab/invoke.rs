//! Command lines of the external tools and collection of their output.

use crate::diagnostics::LabError;
use crate::encode::jenny;
use crate::lab::experiment::ExperimentKind;
use crate::lab::files::scratch_path;
use crate::lab::process::Invocation;
use crate::lab::RunContext;
use crate::problem::Problem;
use crate::tool::ToolId;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the interesting output of a run ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capture {
    Stdout,
    /// The tool writes its suite to a file; only its first line matters.
    FirstLineOf(PathBuf),
}

/// A ready-to-run tool invocation plus the scratch files it owns.
#[derive(Debug, Clone)]
pub struct PreparedRun {
    pub invocation: Invocation,
    pub capture: Capture,
    scratch: Vec<PathBuf>,
}

impl PreparedRun {
    fn new(invocation: Invocation) -> Self {
        Self {
            invocation,
            capture: Capture::Stdout,
            scratch: Vec::new(),
        }
    }

    /// Turns the captured stdout into the text handed to the size parser,
    /// then removes scratch files.
    pub fn collect(self, stdout: String) -> Result<String, LabError> {
        let result = match &self.capture {
            Capture::Stdout => Ok(stdout),
            Capture::FirstLineOf(path) => match fs::read_to_string(path) {
                Ok(content) => Ok(content.lines().next().unwrap_or_default().to_string()),
                // No output file means the tool produced nothing.
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
                Err(e) => Err(LabError::io("read", path, e)),
            },
        };
        self.cleanup();
        result
    }

    pub fn cleanup(self) {
        for path in &self.scratch {
            if path.exists() {
                if let Err(e) = fs::remove_file(path) {
                    tracing::debug!(path = %path.display(), "could not remove scratch file: {}", e);
                }
            }
        }
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

fn read_argument_file(path: &Path, with_exclusions: bool) -> Result<Vec<String>, LabError> {
    let content = fs::read_to_string(path).map_err(|e| LabError::io("read", path, e))?;
    if with_exclusions {
        return Ok(jenny::read_arguments(&content));
    }
    // Header only: strength and domain sizes.
    let header: String = content.lines().take(2).collect::<Vec<_>>().join("\n");
    Ok(jenny::read_arguments(&header))
}

/// Builds the invocation of `tool` on the input file of `problem`.
pub fn prepare(
    problem: &Problem,
    tool: ToolId,
    kind: ExperimentKind,
    ctx: &RunContext<'_>,
) -> Result<PreparedRun, LabError> {
    let paths = &ctx.config.paths;
    let data = &ctx.config.data_folder;
    let input = problem.filename_for(tool, data);
    let t = problem.shape().t().to_string();

    let prepared = match tool {
        ToolId::Jenny => {
            let with_exclusions = kind == ExperimentKind::JennyExclusions;
            let mut invocation =
                Invocation::new(&paths.jenny).args(read_argument_file(&input, with_exclusions)?);
            if kind == ExperimentKind::JennyCompletion {
                if let Some(seeds) = problem.jenny_seed_filename(data) {
                    invocation = invocation.arg(format!("-o{}", display(&seeds)));
                }
            }
            PreparedRun::new(invocation)
        }
        ToolId::Tcases => PreparedRun::new(
            Invocation::new(&paths.java)
                .arg("-jar")
                .arg(display(&paths.tcases_jar))
                .arg("-g")
                .arg(display(&tcases_generators(data, problem.shape().t())))
                .arg("-t")
                .arg(display(&input)),
        ),
        ToolId::Acts => {
            let out = scratch_path(&ctx.scratch_dir, "acts", "out");
            let mut run = PreparedRun::new(
                Invocation::new(&paths.java)
                    .arg("-Dmode=extend")
                    .arg("-Doutput=numeric")
                    .arg(format!("-Ddoi={}", t))
                    .arg("-jar")
                    .arg(display(&paths.acts_jar))
                    .arg(display(&input))
                    .arg(display(&out)),
            );
            run.scratch.push(out);
            run
        }
        ToolId::Casa => {
            let out = scratch_path(&ctx.scratch_dir, "casa", "out");
            let mut run = PreparedRun::new(
                Invocation::new(&paths.casa)
                    .arg("--output")
                    .arg(display(&out))
                    .arg(display(&input)),
            );
            run.capture = Capture::FirstLineOf(out.clone());
            run.scratch.push(out);
            run
        }
        ToolId::Coloring => {
            PreparedRun::new(Invocation::new(&paths.dsatur).arg(display(&input)))
        }
        ToolId::Hypergraph => PreparedRun::new(
            Invocation::new(&paths.java)
                .arg("-jar")
                .arg(display(&paths.hitting_set_jar))
                .arg(display(&input)),
        ),
        ToolId::Gbga => {
            return Err(LabError::UnsupportedCombination {
                problem: problem.kind().name().to_string(),
                tool: "GBGA (no executable)".to_string(),
            })
        }
    };
    Ok(prepared)
}

/// Generator definition shared by every Tcases input of strength `t`.
pub fn tcases_generators(data_folder: &Path, t: usize) -> PathBuf {
    data_folder.join(format!("Tcases-t-{}.xml", t))
}
