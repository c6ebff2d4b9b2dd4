//! Jenny argument files and seed files.
//!
//! Jenny takes everything on its command line, so the "input file" is the
//! argument list, one argument group per line: `-n<t>`, the domain sizes,
//! then one `-w` exclusion per line. Values are named by feature letters.

use crate::diagnostics::LabError;
use crate::encode::write_joined;
use crate::problem::enumerate::{is_non_decreasing, Odometer};
use crate::problem::{Constraint, Problem, JENNY_FEATURES};
use std::io::Write;

fn feature(value: usize) -> char {
    JENNY_FEATURES[value] as char
}

fn check_domain(problem: &Problem) -> Result<(), LabError> {
    let v = problem.shape().v();
    if v > JENNY_FEATURES.len() {
        return Err(LabError::InputGeneration {
            target: "Jenny arguments".to_string(),
            reason: format!(
                "domain size {} exceeds the {} feature letters",
                v,
                JENNY_FEATURES.len()
            ),
        });
    }
    Ok(())
}

/// `-w` argument excluding one full assignment.
fn without(values: &[usize]) -> String {
    let mut arg = String::from("-w");
    for (i, &x) in values.iter().enumerate() {
        arg.push_str(&(i + 1).to_string());
        arg.push(feature(x));
    }
    arg
}

/// Exclusion arguments for universal constraints; empty otherwise.
pub fn exclusions(problem: &Problem) -> Vec<String> {
    match problem.constraint() {
        Constraint::ForbiddenTuples { .. } => {
            let mut out = Vec::new();
            for i in 1..=problem.selected_pairs() {
                for x in 0..problem.selected_values() {
                    out.push(format!("-w{}{}{}{}", i, feature(x), i + 1, feature(0)));
                }
            }
            out
        }
        Constraint::IncreasingValues => {
            let s = problem.shape();
            Odometer::uniform(s.n(), s.v())
                .filter(|values| !is_non_decreasing(values))
                .map(|values| without(&values))
                .collect()
        }
        Constraint::None | Constraint::TestSuiteCompletion { .. } => Vec::new(),
    }
}

pub fn write_arguments(problem: &Problem, sink: &mut dyn Write) -> Result<(), LabError> {
    check_domain(problem)?;
    let s = problem.shape();
    writeln!(sink, "-n{}", s.t())?;
    write_joined(sink, std::iter::repeat(s.v()).take(s.n()), " ")?;
    writeln!(sink)?;
    for arg in exclusions(problem) {
        writeln!(sink, "{}", arg)?;
    }
    Ok(())
}

/// One seed test per line, in Jenny's `1a 2b ...` notation.
pub fn write_seeds(problem: &Problem, sink: &mut dyn Write) -> Result<(), LabError> {
    check_domain(problem)?;
    for test in problem.seed_tests() {
        write_joined(
            sink,
            test.iter()
                .enumerate()
                .map(|(i, &x)| format!("{}{}", i + 1, feature(x))),
            " ",
        )?;
        writeln!(sink)?;
    }
    Ok(())
}

/// Splits an argument file back into command-line arguments.
pub fn read_arguments(content: &str) -> Vec<String> {
    content.split_whitespace().map(str::to_string).collect()
}
