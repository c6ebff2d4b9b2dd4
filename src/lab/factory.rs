//! Turns points of a parameter region into experiments.

use crate::lab::experiment::Experiment;
use crate::lab::region::Region;
use crate::problem::{inputs, Problem, ProblemKind, TWayShape};
use crate::tool::ToolId;

#[derive(Debug, Clone, Copy, Default)]
pub struct ExperimentFactory {
    seed: u64,
}

impl ExperimentFactory {
    /// `seed` drives the pre-existing tests of completion problems.
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// The experiment at a fully bound point, if the point describes a
    /// valid problem that its tool supports.
    pub fn create(&self, region: &Region) -> Option<Experiment> {
        let tool: ToolId = region.text(inputs::TOOL)?.parse().ok()?;
        let kind: ProblemKind = region.text(inputs::PROBLEM)?.parse().ok()?;
        let problem = self.problem(kind, region)?;
        if !problem.supported_by(tool) {
            tracing::trace!(%tool, %problem, "unsupported combination skipped");
            return None;
        }
        Some(Experiment::new(problem, tool))
    }

    fn problem(&self, kind: ProblemKind, region: &Region) -> Option<Problem> {
        let dim = |name: &str| region.int(name).and_then(|x| usize::try_from(x).ok());
        let shape = TWayShape::new(dim(inputs::T)?, dim(inputs::V)?, dim(inputs::N)?).ok()?;
        match kind {
            ProblemKind::TWay => Some(Problem::tway(shape)),
            ProblemKind::ForbiddenTuples => Problem::forbidden_tuples(
                shape,
                region.float(inputs::FRACTION_PARAMS)?,
                region.float(inputs::FRACTION_VALUES)?,
            )
            .ok(),
            ProblemKind::IncreasingValues => Problem::increasing_values(shape).ok(),
            ProblemKind::TestSuiteCompletion => Some(Problem::test_suite_completion(
                shape,
                dim(inputs::NUM_TESTS)?,
                self.seed,
            )),
        }
    }
}
