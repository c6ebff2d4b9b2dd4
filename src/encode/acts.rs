//! ACTS system files for the IPOG generator. Values are 1-based.

use crate::diagnostics::LabError;
use crate::encode::write_joined;
use crate::problem::{Constraint, Problem};
use std::io::Write;

pub fn write(problem: &Problem, sink: &mut dyn Write) -> Result<(), LabError> {
    let s = problem.shape();
    writeln!(sink, "[System]")?;
    writeln!(sink, "Name: foo")?;
    writeln!(sink)?;
    writeln!(sink, "[Parameter]")?;
    for i in 1..=s.n() {
        write!(sink, "p{} (int): ", i)?;
        write_joined(sink, 1..=s.v(), ",")?;
        writeln!(sink)?;
    }

    match problem.constraint() {
        Constraint::None => {}
        Constraint::ForbiddenTuples { .. } => {
            writeln!(sink)?;
            writeln!(sink, "[Constraints]")?;
            for i in 1..=problem.selected_pairs() {
                for x in 1..=problem.selected_values() {
                    writeln!(sink, "p{} != {} || p{} != 1", i, x, i + 1)?;
                }
            }
        }
        Constraint::IncreasingValues => {
            writeln!(sink)?;
            writeln!(sink, "[Constraints]")?;
            if s.n() > 1 {
                write_joined(
                    sink,
                    (1..s.n()).map(|i| format!("p{} <= p{}", i, i + 1)),
                    " && ",
                )?;
                writeln!(sink)?;
            }
        }
        Constraint::TestSuiteCompletion { .. } => {
            writeln!(sink)?;
            writeln!(sink, "[Test Set]")?;
            write_joined(sink, (1..=s.n()).map(|i| format!("p{}", i)), ",")?;
            writeln!(sink)?;
            for test in problem.seed_tests() {
                write_joined(sink, test.iter().map(|x| x + 1), ",")?;
                writeln!(sink)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::TWayShape;

    fn encode(p: &Problem) -> String {
        let mut out = Vec::new();
        write(p, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parameters_section() {
        let p = Problem::tway(TWayShape::new(2, 3, 2).unwrap());
        assert_eq!(
            encode(&p),
            "[System]\nName: foo\n\n[Parameter]\np1 (int): 1,2,3\np2 (int): 1,2,3\n"
        );
    }

    #[test]
    fn forbidden_constraints_are_disjunctions() {
        let p = Problem::forbidden_tuples(TWayShape::new(2, 4, 4).unwrap(), 0.5, 0.5).unwrap();
        let text = encode(&p);
        let section = text.split("[Constraints]\n").nth(1).unwrap();
        assert_eq!(
            section,
            "p1 != 1 || p2 != 1\np1 != 2 || p2 != 1\np2 != 1 || p3 != 1\np2 != 2 || p3 != 1\n"
        );
    }

    #[test]
    fn increasing_constraint_chain() {
        let p = Problem::increasing_values(TWayShape::new(2, 3, 3).unwrap()).unwrap();
        assert!(encode(&p).ends_with("[Constraints]\np1 <= p2 && p2 <= p3\n"));
    }

    #[test]
    fn completion_rows_are_shifted() {
        let p = Problem::test_suite_completion(TWayShape::new(2, 3, 3).unwrap(), 3, 11);
        let text = encode(&p);
        let rows: Vec<_> = text
            .split("[Test Set]\n")
            .nth(1)
            .unwrap()
            .lines()
            .collect();
        assert_eq!(rows[0], "p1,p2,p3");
        assert_eq!(rows.len(), 4);
        for (row, seed) in rows[1..].iter().zip(p.seed_tests()) {
            let expected: Vec<String> = seed.iter().map(|x| (x + 1).to_string()).collect();
            assert_eq!(*row, expected.join(","));
        }
    }
}
