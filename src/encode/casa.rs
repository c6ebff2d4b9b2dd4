//! CASA model files: strength, parameter count, then every domain size.

use crate::diagnostics::LabError;
use crate::encode::write_joined;
use crate::problem::Problem;
use std::io::Write;

pub fn write(problem: &Problem, sink: &mut dyn Write) -> Result<(), LabError> {
    let s = problem.shape();
    writeln!(sink, "{}", s.t())?;
    writeln!(sink, "{}", s.n())?;
    write_joined(sink, std::iter::repeat(s.v()).take(s.n()), " ")?;
    writeln!(sink)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::TWayShape;

    #[test]
    fn writes_strength_count_and_domains() {
        let p = Problem::tway(TWayShape::new(3, 4, 5).unwrap());
        let mut out = Vec::new();
        write(&p, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "3\n5\n4 4 4 4 4\n");
    }
}
