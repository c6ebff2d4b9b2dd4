//! The `combilab` command-line interface.
//!
//! Loads the configuration, applies flag overrides, and hands off to the
//! library. Output meant for people goes through [`output`].

use crate::cli::args::{Command, LabArgs};
use crate::config::LabConfig;
use crate::diagnostics::LabError;
use crate::encode::EncodeContext;
use crate::lab::environment::check_environment;
use crate::lab::files::find_stale;
use crate::lab::gbga::GbgaTable;
use crate::lab::process::SystemRunner;
use crate::lab::report::{JsonLinesSink, RecordBuffer};
use crate::lab::{Laboratory, RunContext};
use crate::logging;
use crate::problem::{Problem, ProblemKind, TWayShape};
use crate::tool::ToolId;
use clap::Parser;
use std::io::Write;
use std::path::Path;

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() -> miette::Result<()> {
    let args = LabArgs::parse();
    logging::init(args.verbose);
    let mut config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Run {
            dry_run,
            timeout_ms,
            output,
            group,
        } => {
            config.dry_run |= dry_run;
            if let Some(ms) = timeout_ms {
                config.timeout_ms = ms;
            }
            config.validate()?;
            handle_run(&config, output.as_deref(), group.as_deref())?;
        }
        Command::Generate { group } => handle_generate(&config, group.as_deref())?,
        Command::List { group } => {
            let lab = build_lab(&config, group.as_deref())?;
            output::print_listing(&lab, &config.data_folder);
        }
        Command::CheckEnv => {
            let report = check_environment(&config);
            output::print_environment(report.as_ref());
        }
        Command::Encode {
            problem,
            tool,
            t,
            v,
            n,
            fraction_params,
            fraction_values,
            num_tests,
            seed,
        } => {
            let kind: ProblemKind = problem.parse().map_err(LabError::config)?;
            let tool: ToolId = tool.parse().map_err(LabError::config)?;
            let shape = TWayShape::new(t, v, n)?;
            let problem = match kind {
                ProblemKind::TWay => Problem::tway(shape),
                ProblemKind::ForbiddenTuples => {
                    Problem::forbidden_tuples(shape, fraction_params, fraction_values)?
                }
                ProblemKind::IncreasingValues => Problem::increasing_values(shape)?,
                ProblemKind::TestSuiteCompletion => {
                    Problem::test_suite_completion(shape, num_tests, seed.unwrap_or(config.seed))
                }
            };
            handle_encode(&config, &problem, tool)?;
        }
        Command::Clean => handle_clean(&config)?,
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<LabConfig, LabError> {
    match path {
        Some(path) => LabConfig::load(path),
        None => Ok(LabConfig::default()),
    }
}

fn load_gbga(config: &LabConfig) -> Result<GbgaTable, LabError> {
    match &config.gbga_table {
        Some(path) => GbgaTable::load(path),
        None => Ok(GbgaTable::default()),
    }
}

fn build_lab(config: &LabConfig, group: Option<&str>) -> Result<Laboratory, LabError> {
    let mut lab = Laboratory::setup(config);
    if let Some(group) = group {
        let kind: ProblemKind = group.parse().map_err(LabError::config)?;
        lab.retain_group(kind);
    }
    Ok(lab)
}

fn handle_run(config: &LabConfig, out: Option<&Path>, group: Option<&str>) -> Result<(), LabError> {
    // Missing tools are reported once; their experiments then fail individually.
    if !config.dry_run {
        if let Some(report) = check_environment(config) {
            output::print_environment(Some(&report));
        }
    }
    let runner = SystemRunner;
    let ctx = RunContext::new(config, &runner, load_gbga(config)?);
    let mut lab = build_lab(config, group)?;

    let summary = match out {
        Some(path) => {
            let mut sink = JsonLinesSink::create(path)?;
            lab.run_all(&ctx, &mut sink)
        }
        None => lab.run_all(&ctx, &mut RecordBuffer::new()),
    };
    output::print_summary(&lab, &summary);
    Ok(())
}

fn handle_generate(config: &LabConfig, group: Option<&str>) -> Result<(), LabError> {
    let runner = SystemRunner;
    let ctx = RunContext::new(config, &runner, GbgaTable::default());
    let mut lab = build_lab(config, group)?;
    let summary = lab.generate_all(&ctx);
    output::print_generate(&summary);
    Ok(())
}

fn handle_encode(config: &LabConfig, problem: &Problem, tool: ToolId) -> Result<(), LabError> {
    let runner = SystemRunner;
    let scratch = std::env::temp_dir();
    let ctx = EncodeContext {
        paths: &config.paths,
        runner: &runner,
        timeout: config.timeout(),
        scratch_dir: &scratch,
    };
    let mut buffer = Vec::new();
    problem.generate_for(tool, &mut buffer, &ctx)?;
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    lock.write_all(&buffer)
        .and_then(|()| lock.flush())
        .map_err(|e| LabError::io("write", "<stdout>", e))?;
    Ok(())
}

fn handle_clean(config: &LabConfig) -> Result<(), LabError> {
    let stale = find_stale(&config.data_folder)?;
    for path in &stale {
        std::fs::remove_file(path).map_err(|e| LabError::io("remove", path, e))?;
    }
    output::print_removed(&stale);
    Ok(())
}
