//! The laboratory: sweeps, experiments, and their execution.

pub mod environment;
pub mod experiment;
pub mod factory;
pub mod files;
pub mod gbga;
pub mod invoke;
pub mod process;
pub mod region;
pub mod report;

use crate::config::LabConfig;
use crate::diagnostics::{FailureKind, LabError};
use crate::lab::experiment::{Experiment, Status};
use crate::lab::factory::ExperimentFactory;
use crate::lab::gbga::GbgaTable;
use crate::lab::process::ProcessRunner;
use crate::lab::region::{Region, RegionFilter, TWayFilter};
use crate::lab::report::ResultSink;
use crate::problem::{inputs, ProblemKind};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Everything an experiment needs from its surroundings.
pub struct RunContext<'a> {
    pub config: &'a LabConfig,
    pub runner: &'a dyn ProcessRunner,
    pub gbga: GbgaTable,
    pub scratch_dir: PathBuf,
}

impl<'a> RunContext<'a> {
    pub fn new(config: &'a LabConfig, runner: &'a dyn ProcessRunner, gbga: GbgaTable) -> Self {
        Self {
            config,
            runner,
            gbga,
            scratch_dir: std::env::temp_dir(),
        }
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }
}

/// The experiments of one testing problem.
#[derive(Debug, Clone)]
pub struct Group {
    pub kind: ProblemKind,
    pub experiments: Vec<Experiment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub failures: BTreeMap<FailureKind, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateSummary {
    pub written: usize,
    pub reused: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Laboratory {
    groups: Vec<Group>,
}

/// The axes shared by every sweep.
fn base_region(config: &LabConfig, kind: ProblemKind) -> Region {
    let mut r = Region::new();
    r.add(inputs::PROBLEM, [kind.name()])
        .add_range(inputs::T, config.t.min.into(), config.t.max.into())
        .add_range(inputs::V, config.v.min.into(), config.v.max.into())
        .add_range(inputs::N, config.n.min.into(), config.n.max.into())
        .add(inputs::TOOL, config.tools.iter().map(|t| t.name()));
    r
}

impl Laboratory {
    /// Builds every enabled sweep of `config`.
    pub fn setup(config: &LabConfig) -> Self {
        let factory = ExperimentFactory::new(config.seed);
        let mut lab = Laboratory::default();
        let p = &config.problems;

        if p.t_way {
            let region = base_region(config, ProblemKind::TWay).with_filter(TWayFilter);
            lab.add_sweep(ProblemKind::TWay, &factory, &region, &["n", "v"], &["t", "Tool"]);
        }
        if p.forbidden_tuples {
            let mut region = base_region(config, ProblemKind::ForbiddenTuples);
            region
                .add(inputs::FRACTION_PARAMS, config.fractions.iter().copied())
                .add(inputs::FRACTION_VALUES, config.fractions.iter().copied());
            // Only equal fractions are swept.
            let region = region.with_filter(|r: &Region| {
                TWayFilter.admits(r)
                    && match (r.float(inputs::FRACTION_PARAMS), r.float(inputs::FRACTION_VALUES)) {
                        (Some(fp), Some(fv)) => fp == fv,
                        _ => true,
                    }
            });
            lab.add_sweep(
                ProblemKind::ForbiddenTuples,
                &factory,
                &region,
                &["n", "v", "t"],
                &["Tool", inputs::FRACTION_VALUES, inputs::FRACTION_PARAMS],
            );
        }
        if p.increasing_values {
            let region = base_region(config, ProblemKind::IncreasingValues).with_filter(TWayFilter);
            lab.add_sweep(
                ProblemKind::IncreasingValues,
                &factory,
                &region,
                &["t", "v"],
                &["n", "Tool"],
            );
        }
        if p.test_suite_completion {
            let mut region = base_region(config, ProblemKind::TestSuiteCompletion);
            let k = config.num_tests;
            region.add_range_step(inputs::NUM_TESTS, k.min.into(), k.max.into(), k.step.into());
            let region = region.with_filter(TWayFilter);
            lab.add_sweep(
                ProblemKind::TestSuiteCompletion,
                &factory,
                &region,
                &["n", "v", "t"],
                &["Tool", inputs::NUM_TESTS],
            );
        }

        tracing::info!(
            groups = lab.groups.len(),
            experiments = lab.len(),
            "laboratory set up"
        );
        lab
    }

    fn add_sweep(
        &mut self,
        kind: ProblemKind,
        factory: &ExperimentFactory,
        region: &Region,
        outer: &[&str],
        inner: &[&str],
    ) {
        let mut next_id = self.len() + 1;
        let mut experiments = Vec::new();
        for sub in region.all(outer) {
            for point in sub.all(inner) {
                if let Some(exp) = factory.create(&point) {
                    experiments.push(exp.with_id(next_id));
                    next_id += 1;
                }
            }
        }
        tracing::debug!(problem = %kind, experiments = experiments.len(), "sweep built");
        self.groups.push(Group { kind, experiments });
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Keeps only the group of `kind`.
    pub fn retain_group(&mut self, kind: ProblemKind) {
        self.groups.retain(|g| g.kind == kind);
    }

    pub fn experiments(&self) -> impl Iterator<Item = &Experiment> {
        self.groups.iter().flat_map(|g| g.experiments.iter())
    }

    fn experiments_mut(&mut self) -> impl Iterator<Item = &mut Experiment> {
        self.groups.iter_mut().flat_map(|g| g.experiments.iter_mut())
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.experiments.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs every experiment in order and hands each record to `sink`.
    pub fn run_all(&mut self, ctx: &RunContext<'_>, sink: &mut dyn ResultSink) -> RunSummary {
        let mut summary = RunSummary::default();
        for exp in self.experiments_mut() {
            let status = exp.run(ctx);
            summary.total += 1;
            match status {
                Status::Completed => summary.completed += 1,
                _ => {
                    summary.failed += 1;
                    if let Some(kind) = exp.error().map(LabError::kind) {
                        *summary.failures.entry(kind).or_default() += 1;
                    }
                }
            }
            sink.record(&exp.record());
        }
        sink.finish();
        summary
    }

    /// Writes the input files of every experiment without running anything.
    pub fn generate_all(&mut self, ctx: &RunContext<'_>) -> GenerateSummary {
        let mut summary = GenerateSummary::default();
        for exp in self.experiments_mut() {
            exp.reset();
            match exp.check_prerequisites(ctx) {
                Ok(true) => summary.reused += 1,
                Ok(false) => match exp.fulfill_prerequisites(ctx) {
                    Ok(()) => summary.written += 1,
                    Err(_) => summary.failed += 1,
                },
                Err(_) => summary.failed += 1,
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProblemToggles;
    use crate::tool::ToolId;

    fn small_config() -> LabConfig {
        LabConfig {
            t: crate::config::IntRange::new(2, 3),
            v: crate::config::IntRange::new(2, 3),
            n: crate::config::IntRange::new(2, 4),
            tools: vec![ToolId::Jenny, ToolId::Casa],
            ..LabConfig::default()
        }
    }

    #[test]
    fn tway_sweep_respects_filter() {
        let lab = Laboratory::setup(&small_config());
        assert_eq!(lab.groups().len(), 1);
        // (t, n) in {(2,3), (2,4), (3,4)} x v in {2,3} x 2 tools.
        assert_eq!(lab.len(), 12);
        assert!(lab.experiments().all(|e| e.problem().shape().t() < e.problem().shape().n()));
        let ids: Vec<_> = lab.experiments().map(|e| e.id()).collect();
        assert_eq!(ids, (1..=12).collect::<Vec<_>>());
    }

    #[test]
    fn constrained_sweeps_drop_unsupported_tools() {
        let config = LabConfig {
            problems: ProblemToggles {
                t_way: false,
                forbidden_tuples: true,
                increasing_values: true,
                test_suite_completion: true,
            },
            fractions: vec![0.0, 0.5],
            ..small_config()
        };
        let lab = Laboratory::setup(&config);
        assert_eq!(lab.groups().len(), 3);
        assert!(lab.experiments().all(|e| e.tool() == ToolId::Jenny));
        let forbidden = &lab.groups()[0];
        assert_eq!(forbidden.kind, ProblemKind::ForbiddenTuples);
        // 6 shapes x 2 equal fraction pairs.
        assert_eq!(forbidden.experiments.len(), 12);
        let increasing = &lab.groups()[1];
        assert!(increasing
            .experiments
            .iter()
            .all(|e| e.problem().shape().n() <= e.problem().shape().v()));
    }
}
