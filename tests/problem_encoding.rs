//! Encoding problems through the public API, one tool at a time.

mod common;

use combilab::config::ToolPaths;
use combilab::encode::EncodeContext;
use combilab::problem::{Problem, TWayShape};
use combilab::tool::{parse::parse_size, ToolId};
use combilab::FailureKind;
use common::{scratch_dir, FakeRunner};
use std::time::Duration;

fn encode(
    scratch: &str,
    problem: &Problem,
    tool: ToolId,
    runner: &FakeRunner,
) -> Result<String, combilab::LabError> {
    let paths = ToolPaths::default();
    let scratch = scratch_dir(scratch);
    let ctx = EncodeContext {
        paths: &paths,
        runner,
        timeout: Duration::from_secs(5),
        scratch_dir: &scratch,
    };
    let mut out = Vec::new();
    problem.generate_for(tool, &mut out, &ctx)?;
    Ok(String::from_utf8(out).unwrap())
}

#[test]
fn tway_for_jenny_end_to_end() {
    let problem = Problem::tway(TWayShape::new(2, 2, 3).unwrap());
    let text = encode("enc-jenny", &problem, ToolId::Jenny, &FakeRunner::new()).unwrap();
    assert_eq!(text, "-n2\n2 2 2\n");
    let size = parse_size(ToolId::Jenny, " 1a 2a 3a \n 1b 2b 3a \n 1a 2b 3b \n 1b 2a 3b \n").unwrap();
    assert_eq!(size, 4);
}

#[test]
fn unsupported_tool_is_rejected() {
    let problem = Problem::forbidden_tuples(TWayShape::new(2, 3, 4).unwrap(), 0.5, 0.5).unwrap();
    let err = encode("enc-unsupported", &problem, ToolId::Casa, &FakeRunner::new()).unwrap_err();
    assert_eq!(err.kind(), FailureKind::UnsupportedCombination);
}

#[test]
fn forbidden_tuples_without_pairs_are_stable_and_domain_only() {
    let problem = Problem::forbidden_tuples(TWayShape::new(2, 3, 3).unwrap(), 0.0, 0.5).unwrap();
    let runner = FakeRunner::new();
    let first = encode("enc-forbidden", &problem, ToolId::Acts, &runner).unwrap();
    let second = encode("enc-forbidden", &problem, ToolId::Acts, &runner).unwrap();
    assert_eq!(first, second);
    assert!(first.ends_with("p3 (int): 1,2,3\n\n[Constraints]\n"));

    let jenny = encode("enc-forbidden", &problem, ToolId::Jenny, &runner).unwrap();
    assert_eq!(jenny, "-n2\n3 3 3\n");
}

#[test]
fn completion_encodings_agree_on_seed_tests() {
    let shape = TWayShape::new(2, 4, 3).unwrap();
    let a = Problem::test_suite_completion(shape, 3, 99);
    let b = Problem::test_suite_completion(shape, 3, 99);
    let runner = FakeRunner::new();
    assert_eq!(
        encode("enc-completion", &a, ToolId::Acts, &runner).unwrap(),
        encode("enc-completion", &b, ToolId::Acts, &runner).unwrap()
    );
    assert_eq!(a.seed_tests(), b.seed_tests());
}

#[test]
fn coloring_goes_through_graph_script() {
    let runner = FakeRunner::new().reply("php", "graph G {\n 0 -- 1;\n}\n");
    let problem = Problem::test_suite_completion(TWayShape::new(2, 2, 3).unwrap(), 1, 0);
    let text = encode("enc-coloring", &problem, ToolId::Coloring, &runner).unwrap();
    assert!(text.starts_with("graph G"));
    let call = runner.calls.borrow()[0].clone();
    assert_eq!(call.args[0], "variables-to-graph.php");
    assert_eq!(call.args[1], "2");
}

#[test]
fn failing_graph_script_is_an_input_generation_error() {
    let runner = FakeRunner::new();
    let problem = Problem::tway(TWayShape::new(2, 2, 3).unwrap());
    let err = encode("enc-failing-graph", &problem, ToolId::Hypergraph, &runner).unwrap_err();
    assert_eq!(err.kind(), FailureKind::InputGeneration);
}

#[test]
fn casa_and_tcases_inputs() {
    let problem = Problem::tway(TWayShape::new(2, 3, 2).unwrap());
    let runner = FakeRunner::new();
    assert_eq!(encode("enc-casa-tcases", &problem, ToolId::Casa, &runner).unwrap(), "2\n2\n3 3\n");
    let xml = encode("enc-casa-tcases", &problem, ToolId::Tcases, &runner).unwrap();
    assert_eq!(xml.matches("<Var ").count(), 2);
    assert_eq!(xml.matches("<Value ").count(), 6);
}
