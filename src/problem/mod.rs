//! Abstract combinatorial testing problems.
//!
//! A [`Problem`] is a t-way shape plus an optional [`Constraint`]. It knows
//! which tools can solve it, where each tool's input file lives, and how to
//! write that input file. Problems are immutable once built.

pub mod enumerate;

use crate::diagnostics::LabError;
use crate::encode::{self, EncodeContext};
use crate::lab::region::ParamValue;
use crate::tool::ToolId;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Names of the experiment inputs a problem declares.
pub mod inputs {
    pub const TOOL: &str = "Tool";
    pub const PROBLEM: &str = "Testing problem";
    pub const T: &str = "t";
    pub const V: &str = "v";
    pub const N: &str = "n";
    pub const FRACTION_PARAMS: &str = "fp";
    pub const FRACTION_VALUES: &str = "fv";
    pub const NUM_TESTS: &str = "Number of existing tests";
}

/// Feature letters Jenny uses to name values; also bounds its domain size.
pub const JENNY_FEATURES: &[u8; 52] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

// Guards against `0.3 * 10` landing just below 3.
const FRACTION_EPSILON: f64 = 1e-9;

/// Interaction strength `t`, domain size `v` and parameter count `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TWayShape {
    t: usize,
    v: usize,
    n: usize,
}

impl TWayShape {
    pub fn new(t: usize, v: usize, n: usize) -> Result<Self, LabError> {
        if t < 1 {
            return Err(LabError::invalid_problem("t must be at least 1"));
        }
        if t > n {
            return Err(LabError::invalid_problem(format!(
                "t = {} exceeds the number of parameters n = {}",
                t, n
            )));
        }
        if v < 2 {
            return Err(LabError::invalid_problem(format!(
                "domain size v = {} is below 2",
                v
            )));
        }
        Ok(Self { t, v, n })
    }

    pub fn t(&self) -> usize {
        self.t
    }

    pub fn v(&self) -> usize {
        self.v
    }

    pub fn n(&self) -> usize {
        self.n
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintScope {
    Unconstrained,
    /// Must hold in every test.
    Universal,
    /// Requires specific tests to be present.
    Existential,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint {
    None,
    ForbiddenTuples {
        fraction_params: f64,
        fraction_values: f64,
    },
    IncreasingValues,
    TestSuiteCompletion {
        num_tests: usize,
        seed: u64,
    },
}

impl Constraint {
    pub fn scope(&self) -> ConstraintScope {
        match self {
            Constraint::None => ConstraintScope::Unconstrained,
            Constraint::ForbiddenTuples { .. } | Constraint::IncreasingValues => {
                ConstraintScope::Universal
            }
            Constraint::TestSuiteCompletion { .. } => ConstraintScope::Existential,
        }
    }

    pub fn kind(&self) -> ProblemKind {
        match self {
            Constraint::None => ProblemKind::TWay,
            Constraint::ForbiddenTuples { .. } => ProblemKind::ForbiddenTuples,
            Constraint::IncreasingValues => ProblemKind::IncreasingValues,
            Constraint::TestSuiteCompletion { .. } => ProblemKind::TestSuiteCompletion,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProblemKind {
    TWay,
    ForbiddenTuples,
    IncreasingValues,
    TestSuiteCompletion,
}

impl ProblemKind {
    pub const ALL: [ProblemKind; 4] = [
        ProblemKind::TWay,
        ProblemKind::ForbiddenTuples,
        ProblemKind::IncreasingValues,
        ProblemKind::TestSuiteCompletion,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProblemKind::TWay => "t-way test generation",
            ProblemKind::ForbiddenTuples => "Forbidden tuples",
            ProblemKind::IncreasingValues => "Increasing values",
            ProblemKind::TestSuiteCompletion => "Test suite completion",
        }
    }

    /// File name component.
    pub fn slug(&self) -> &'static str {
        match self {
            ProblemKind::TWay => "comb",
            ProblemKind::ForbiddenTuples => "forbidden",
            ProblemKind::IncreasingValues => "increasing",
            ProblemKind::TestSuiteCompletion => "completion",
        }
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProblemKind {
    type Err = String;

    /// Accepts the display name, the slug, or a kebab-case spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        ProblemKind::ALL
            .into_iter()
            .find(|k| {
                key == k.name().to_ascii_lowercase()
                    || key == k.slug()
                    || key == k.name().to_ascii_lowercase().replace(' ', "-")
            })
            .or(match key.as_str() {
                "t-way" | "tway" => Some(ProblemKind::TWay),
                _ => None,
            })
            .ok_or_else(|| format!("unknown testing problem '{}'", s))
    }
}

/// One testing problem instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    shape: TWayShape,
    constraint: Constraint,
}

impl Problem {
    pub fn tway(shape: TWayShape) -> Self {
        Self {
            shape,
            constraint: Constraint::None,
        }
    }

    pub fn forbidden_tuples(
        shape: TWayShape,
        fraction_params: f64,
        fraction_values: f64,
    ) -> Result<Self, LabError> {
        for (name, f) in [("fp", fraction_params), ("fv", fraction_values)] {
            if !(0.0..=1.0).contains(&f) {
                return Err(LabError::invalid_problem(format!(
                    "fraction {} = {} is outside [0, 1]",
                    name, f
                )));
            }
        }
        Ok(Self {
            shape,
            constraint: Constraint::ForbiddenTuples {
                fraction_params,
                fraction_values,
            },
        })
    }

    /// Fails when `n > v`: no non-decreasing test can then cover every tuple.
    pub fn increasing_values(shape: TWayShape) -> Result<Self, LabError> {
        if shape.n > shape.v {
            return Err(LabError::invalid_problem(format!(
                "increasing values need n <= v (n = {}, v = {})",
                shape.n, shape.v
            )));
        }
        Ok(Self {
            shape,
            constraint: Constraint::IncreasingValues,
        })
    }

    pub fn test_suite_completion(shape: TWayShape, num_tests: usize, seed: u64) -> Self {
        Self {
            shape,
            constraint: Constraint::TestSuiteCompletion { num_tests, seed },
        }
    }

    pub fn shape(&self) -> &TWayShape {
        &self.shape
    }

    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    pub fn kind(&self) -> ProblemKind {
        self.constraint.kind()
    }

    pub fn supported_by(&self, tool: ToolId) -> bool {
        if tool == ToolId::Jenny && self.shape.v > JENNY_FEATURES.len() {
            return false;
        }
        match self.kind() {
            ProblemKind::TWay => true,
            ProblemKind::ForbiddenTuples => matches!(
                tool,
                ToolId::Hypergraph | ToolId::Jenny | ToolId::Acts | ToolId::Tcases
            ),
            ProblemKind::IncreasingValues => {
                matches!(tool, ToolId::Hypergraph | ToolId::Jenny | ToolId::Acts)
            }
            ProblemKind::TestSuiteCompletion => matches!(
                tool,
                ToolId::Hypergraph | ToolId::Coloring | ToolId::Jenny | ToolId::Acts
            ),
        }
    }

    /// Input file of `tool` for this problem, inside `data_folder`.
    ///
    /// Distinct problems and tools never share a file name, so an existing
    /// file can be reused as is.
    pub fn filename_for(&self, tool: ToolId, data_folder: &Path) -> PathBuf {
        data_folder.join(format!("{}.{}", self.file_stem(tool), tool.extension()))
    }

    /// Seed file for Jenny completion problems.
    pub fn jenny_seed_filename(&self, data_folder: &Path) -> Option<PathBuf> {
        match self.constraint {
            Constraint::TestSuiteCompletion { .. } => Some(
                data_folder.join(format!("{}-seed.txt", self.file_stem(ToolId::Jenny))),
            ),
            _ => None,
        }
    }

    fn file_stem(&self, tool: ToolId) -> String {
        let s = &self.shape;
        let mut stem = format!(
            "{}-{}-{}-{}-{}",
            tool.name(),
            self.kind().slug(),
            s.t,
            s.v,
            s.n
        );
        match self.constraint {
            Constraint::ForbiddenTuples {
                fraction_params,
                fraction_values,
            } => stem.push_str(&format!("-{}-{}", fraction_params, fraction_values)),
            Constraint::TestSuiteCompletion { num_tests, seed } => {
                stem.push_str(&format!("-{}-{}", num_tests, seed))
            }
            Constraint::None | Constraint::IncreasingValues => {}
        }
        stem
    }

    /// Writes the input of `tool` for this problem into `sink`.
    pub fn generate_for(
        &self,
        tool: ToolId,
        sink: &mut dyn Write,
        ctx: &EncodeContext<'_>,
    ) -> Result<(), LabError> {
        if !self.supported_by(tool) {
            return Err(LabError::UnsupportedCombination {
                problem: self.kind().name().to_string(),
                tool: tool.name().to_string(),
            });
        }
        encode::encode(self, tool, sink, ctx)
    }

    /// Pre-existing tests of a completion problem; empty otherwise.
    pub fn seed_tests(&self) -> Vec<Vec<usize>> {
        match self.constraint {
            Constraint::TestSuiteCompletion { num_tests, seed } => {
                enumerate::seed_tests(&self.shape, num_tests, seed)
            }
            _ => Vec::new(),
        }
    }

    /// Number of adjacent parameter pairs carrying forbidden tuples.
    pub fn selected_pairs(&self) -> usize {
        match self.constraint {
            Constraint::ForbiddenTuples {
                fraction_params, ..
            } => {
                let raw = (fraction_params * self.shape.n as f64 + FRACTION_EPSILON).floor();
                (raw as usize).min(self.shape.n.saturating_sub(1))
            }
            _ => 0,
        }
    }

    /// Number of values per constrained parameter that are forbidden.
    pub fn selected_values(&self) -> usize {
        match self.constraint {
            Constraint::ForbiddenTuples {
                fraction_values, ..
            } => {
                let raw = (fraction_values * self.shape.v as f64 + FRACTION_EPSILON).floor();
                (raw as usize).min(self.shape.v)
            }
            _ => 0,
        }
    }

    /// Fills the declared experiment inputs of this problem.
    pub fn describe_inputs(&self, declared: &mut BTreeMap<String, ParamValue>) {
        declared.insert(
            inputs::PROBLEM.to_string(),
            ParamValue::Text(self.kind().name().to_string()),
        );
        declared.insert(inputs::T.to_string(), ParamValue::Int(self.shape.t as i64));
        declared.insert(inputs::V.to_string(), ParamValue::Int(self.shape.v as i64));
        declared.insert(inputs::N.to_string(), ParamValue::Int(self.shape.n as i64));
        match self.constraint {
            Constraint::ForbiddenTuples {
                fraction_params,
                fraction_values,
            } => {
                declared.insert(
                    inputs::FRACTION_PARAMS.to_string(),
                    ParamValue::Float(fraction_params),
                );
                declared.insert(
                    inputs::FRACTION_VALUES.to_string(),
                    ParamValue::Float(fraction_values),
                );
            }
            Constraint::TestSuiteCompletion { num_tests, .. } => {
                declared.insert(
                    inputs::NUM_TESTS.to_string(),
                    ParamValue::Int(num_tests as i64),
                );
            }
            Constraint::None | Constraint::IncreasingValues => {}
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.shape;
        write!(f, "{} (t={}, v={}, n={}", self.kind(), s.t, s.v, s.n)?;
        match self.constraint {
            Constraint::ForbiddenTuples {
                fraction_params,
                fraction_values,
            } => write!(f, ", fp={}, fv={}", fraction_params, fraction_values)?,
            Constraint::TestSuiteCompletion { num_tests, seed } => {
                write!(f, ", tests={}, seed={}", num_tests, seed)?
            }
            Constraint::None | Constraint::IncreasingValues => {}
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn shape(t: usize, v: usize, n: usize) -> TWayShape {
        TWayShape::new(t, v, n).unwrap()
    }

    #[test]
    fn shape_invariants() {
        assert!(TWayShape::new(0, 3, 3).is_err());
        assert!(TWayShape::new(4, 3, 3).is_err());
        assert!(TWayShape::new(2, 1, 3).is_err());
        assert!(TWayShape::new(3, 2, 3).is_ok());
    }

    #[test]
    fn increasing_values_need_enough_values() {
        assert!(Problem::increasing_values(shape(2, 3, 4)).is_err());
        assert!(Problem::increasing_values(shape(2, 4, 4)).is_ok());
    }

    #[test]
    fn fractions_are_validated() {
        assert!(Problem::forbidden_tuples(shape(2, 3, 3), 1.2, 0.0).is_err());
        assert!(Problem::forbidden_tuples(shape(2, 3, 3), 0.5, -0.1).is_err());
    }

    #[test]
    fn support_matrix() {
        let tway = Problem::tway(shape(2, 3, 3));
        assert!(ToolId::ALL.iter().all(|&t| tway.supported_by(t)));

        let wide = Problem::tway(shape(2, 60, 3));
        assert!(!wide.supported_by(ToolId::Jenny));
        assert!(wide.supported_by(ToolId::Casa));

        let forbidden = Problem::forbidden_tuples(shape(2, 3, 3), 0.5, 0.5).unwrap();
        let supported: Vec<_> = ToolId::ALL
            .into_iter()
            .filter(|&t| forbidden.supported_by(t))
            .collect();
        assert_eq!(
            supported,
            vec![ToolId::Jenny, ToolId::Tcases, ToolId::Acts, ToolId::Hypergraph]
        );

        let increasing = Problem::increasing_values(shape(2, 3, 3)).unwrap();
        assert!(!increasing.supported_by(ToolId::Tcases));
        assert!(!increasing.supported_by(ToolId::Coloring));

        let completion = Problem::test_suite_completion(shape(2, 3, 3), 2, 0);
        assert!(completion.supported_by(ToolId::Coloring));
        assert!(!completion.supported_by(ToolId::Casa));
        assert!(!completion.supported_by(ToolId::Gbga));
    }

    #[test]
    fn file_names_follow_layout() {
        let data = Path::new("data");
        let p = Problem::tway(shape(2, 3, 4));
        assert_eq!(
            p.filename_for(ToolId::Acts, data),
            PathBuf::from("data/IPOG-comb-2-3-4.txt")
        );
        let f = Problem::forbidden_tuples(shape(2, 3, 4), 0.1, 0.5).unwrap();
        assert_eq!(
            f.filename_for(ToolId::Hypergraph, data),
            PathBuf::from("data/Hypergraph-forbidden-2-3-4-0.1-0.5.edn")
        );
        let c = Problem::test_suite_completion(shape(2, 3, 4), 6, 7);
        assert_eq!(
            c.jenny_seed_filename(data),
            Some(PathBuf::from("data/Jenny-completion-2-3-4-6-7-seed.txt"))
        );
        assert_eq!(p.jenny_seed_filename(data), None);
    }

    #[test]
    fn file_names_are_injective() {
        let data = Path::new("data");
        let problems = vec![
            Problem::tway(shape(2, 3, 4)),
            Problem::tway(shape(2, 4, 3)),
            Problem::tway(shape(3, 3, 4)),
            Problem::forbidden_tuples(shape(2, 3, 4), 0.0, 0.0).unwrap(),
            Problem::forbidden_tuples(shape(2, 3, 4), 0.1, 0.0).unwrap(),
            Problem::forbidden_tuples(shape(2, 3, 4), 0.0, 0.1).unwrap(),
            Problem::increasing_values(shape(2, 4, 4)).unwrap(),
            Problem::test_suite_completion(shape(2, 3, 4), 2, 0),
            Problem::test_suite_completion(shape(2, 3, 4), 2, 1),
            Problem::test_suite_completion(shape(2, 3, 4), 4, 0),
        ];
        let mut seen = HashSet::new();
        for p in &problems {
            for tool in ToolId::ALL {
                assert!(seen.insert(p.filename_for(tool, data)), "{} {}", p, tool);
            }
        }
    }

    #[test]
    fn selection_counts_floor_and_clamp() {
        let f = Problem::forbidden_tuples(shape(2, 10, 10), 0.3, 0.2).unwrap();
        assert_eq!(f.selected_pairs(), 3);
        assert_eq!(f.selected_values(), 2);
        let all = Problem::forbidden_tuples(shape(2, 3, 4), 1.0, 1.0).unwrap();
        assert_eq!(all.selected_pairs(), 3);
        assert_eq!(all.selected_values(), 3);
        let none = Problem::forbidden_tuples(shape(2, 3, 4), 0.0, 0.5).unwrap();
        assert_eq!(none.selected_pairs(), 0);
    }

    #[test]
    fn declared_inputs_per_kind() {
        let mut inputs = BTreeMap::new();
        Problem::forbidden_tuples(shape(2, 3, 4), 0.1, 0.2)
            .unwrap()
            .describe_inputs(&mut inputs);
        assert_eq!(inputs.get("fp"), Some(&ParamValue::Float(0.1)));
        assert_eq!(inputs.get("n"), Some(&ParamValue::Int(4)));
        assert_eq!(
            inputs.get("Testing problem"),
            Some(&ParamValue::Text("Forbidden tuples".to_string()))
        );

        let mut inputs = BTreeMap::new();
        Problem::test_suite_completion(shape(2, 3, 4), 6, 1).describe_inputs(&mut inputs);
        assert_eq!(
            inputs.get("Number of existing tests"),
            Some(&ParamValue::Int(6))
        );
        assert!(!inputs.contains_key("fp"));
    }

    #[test]
    fn problem_kinds_parse_from_names_and_slugs() {
        for kind in ProblemKind::ALL {
            assert_eq!(kind.name().parse::<ProblemKind>(), Ok(kind));
            assert_eq!(kind.slug().parse::<ProblemKind>(), Ok(kind));
        }
        assert_eq!(
            "test-suite-completion".parse::<ProblemKind>(),
            Ok(ProblemKind::TestSuiteCompletion)
        );
        assert_eq!("t-way".parse::<ProblemKind>(), Ok(ProblemKind::TWay));
        assert!("pairwise".parse::<ProblemKind>().is_err());
    }
}
