//! QICT condition files, read by the graph reduction scripts.
//!
//! Parameters are `p0..p{n-1}` with values `0..v-1`. Universal constraints
//! become `Always` lines and seed tests become `Once` lines.

use crate::diagnostics::LabError;
use crate::encode::write_joined;
use crate::problem::{Constraint, Problem};
use std::io::Write;

pub fn write(problem: &Problem, sink: &mut dyn Write) -> Result<(), LabError> {
    write_domains(problem, sink)?;
    write_constraints(problem, sink)
}

pub fn write_domains(problem: &Problem, sink: &mut dyn Write) -> Result<(), LabError> {
    let s = problem.shape();
    for i in 0..s.n() {
        write!(sink, "p{}: ", i)?;
        write_joined(sink, 0..s.v(), ", ")?;
        writeln!(sink)?;
    }
    Ok(())
}

pub fn write_constraints(problem: &Problem, sink: &mut dyn Write) -> Result<(), LabError> {
    match problem.constraint() {
        Constraint::None => {}
        Constraint::ForbiddenTuples { .. } => {
            for i in 0..problem.selected_pairs() {
                for x in 0..problem.selected_values() {
                    writeln!(sink, "Always !(p{}=={} && p{} == 0)", i, x, i + 1)?;
                }
            }
        }
        Constraint::IncreasingValues => {
            let n = problem.shape().n();
            if n > 1 {
                write!(sink, "Always ")?;
                write_joined(
                    sink,
                    (0..n - 1).map(|i| format!("p{} <= p{}", i, i + 1)),
                    " && ",
                )?;
                writeln!(sink)?;
            }
        }
        Constraint::TestSuiteCompletion { .. } => {
            writeln!(sink)?;
            for test in problem.seed_tests() {
                write!(sink, "Once ")?;
                write_joined(
                    sink,
                    test.iter()
                        .enumerate()
                        .map(|(i, x)| format!("p{} == {}", i, x)),
                    " && ",
                )?;
                writeln!(sink)?;
            }
        }
    }
    Ok(())
}
