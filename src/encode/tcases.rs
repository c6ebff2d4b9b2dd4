//! Tcases system definitions and generator definitions.

use crate::diagnostics::LabError;
use crate::encode::write_joined;
use crate::problem::{Constraint, Problem};
use std::io::Write;

pub fn write_system(problem: &Problem, sink: &mut dyn Write) -> Result<(), LabError> {
    let s = problem.shape();
    let (pairs, values) = match problem.constraint() {
        Constraint::ForbiddenTuples { .. } => {
            (problem.selected_pairs(), problem.selected_values())
        }
        _ => (0, 0),
    };

    writeln!(sink, "<System name=\"foo\">")?;
    writeln!(sink, " <Function name=\"test\">")?;
    writeln!(sink, "  <Input>")?;
    for i in 1..=s.n() {
        writeln!(sink, "   <Var name=\"p{}\">", i)?;
        for j in 1..=s.v() {
            write!(sink, "     <Value name=\"{}\" ", j)?;
            if i <= pairs && j <= values {
                write!(sink, "property=\"p{}v{}\" ", i, j)?;
            }
            // Value 1 of a successor is excluded when its predecessor took
            // any forbidden value.
            if i > 1 && i <= pairs + 1 && j == 1 && values > 0 {
                write!(sink, "whenNot=\"")?;
                write_joined(sink, (1..=values).map(|vv| format!("p{}v{}", i - 1, vv)), ",")?;
                write!(sink, "\" ")?;
            }
            writeln!(sink, "/>")?;
        }
        writeln!(sink, "   </Var>")?;
    }
    writeln!(sink, "  </Input>")?;
    writeln!(sink, " </Function>")?;
    writeln!(sink, "</System>")?;
    Ok(())
}

/// Shared generator definition for strength `t`.
pub fn write_generators(t: usize, sink: &mut dyn Write) -> Result<(), LabError> {
    writeln!(sink, "<Generators>")?;
    writeln!(sink, " <TupleGenerator tuples=\"{}\" />", t)?;
    writeln!(sink, "</Generators>")?;
    Ok(())
}
