//! Running whole sweeps against scripted and real processes.

mod common;

use combilab::config::{IntRange, LabConfig, ProblemToggles};
use combilab::lab::experiment::{Experiment, Status};
use combilab::lab::gbga::GbgaTable;
use combilab::lab::report::{JsonLinesSink, RecordBuffer};
use combilab::lab::{Laboratory, RunContext};
use combilab::problem::{Problem, TWayShape};
use combilab::tool::ToolId;
use combilab::{FailureKind, LabError};
use common::{scratch_dir, FakeRunner};

fn config(name: &str, tools: Vec<ToolId>) -> LabConfig {
    LabConfig {
        data_folder: scratch_dir(name).join("data"),
        timeout_ms: 500,
        t: IntRange::new(2, 2),
        v: IntRange::new(2, 3),
        n: IntRange::new(3, 3),
        tools,
        ..LabConfig::default()
    }
}

#[test]
fn sweep_records_every_experiment_and_continues_after_failures() {
    let config = config("sweep", vec![ToolId::Jenny, ToolId::Acts]);
    let runner = FakeRunner::new()
        .reply("jenny", "1a 2a 3a\n1b 2b 3a\n1a 2b 3b\n1b 2a 3b\n")
        .reply("java", "Exception in thread \"main\"\n");
    let ctx = RunContext::new(&config, &runner, GbgaTable::default())
        .with_scratch_dir(scratch_dir("sweep-scratch"));
    let mut lab = Laboratory::setup(&config);
    assert_eq!(lab.len(), 4);

    let mut sink = RecordBuffer::new();
    let summary = lab.run_all(&ctx, &mut sink);
    assert_eq!(summary.total, 4);
    assert_eq!(summary.completed, 2);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.failures.get(&FailureKind::UnparsableOutput), Some(&2));

    assert_eq!(sink.records.len(), 4);
    for record in &sink.records {
        match record.tool.as_str() {
            "Jenny" => {
                assert_eq!(record.status, "completed");
                assert_eq!(record.outputs["Size"].as_int(), Some(4));
            }
            "IPOG" => {
                assert_eq!(record.status, "failed");
                assert_eq!(record.failure.as_deref(), Some("unparsable_output"));
            }
            other => panic!("unexpected tool {}", other),
        }
    }
}

#[test]
fn existing_input_files_are_reused() {
    let config = config("reuse", vec![ToolId::Casa]);
    let runner = FakeRunner::new().reply("casa-1.1b", "");
    let ctx = RunContext::new(&config, &runner, GbgaTable::default());
    let problem = Problem::tway(TWayShape::new(2, 2, 3).unwrap());
    let input = problem.filename_for(ToolId::Casa, &config.data_folder);
    std::fs::create_dir_all(&config.data_folder).unwrap();
    std::fs::write(&input, "handwritten\n").unwrap();

    let mut exp = Experiment::new(problem, ToolId::Casa);
    assert!(exp.check_prerequisites(&ctx).unwrap());
    exp.run(&ctx);
    assert_eq!(std::fs::read_to_string(&input).unwrap(), "handwritten\n");
    // CASA wrote no output file, so nothing could be read.
    assert_eq!(
        exp.error().map(LabError::kind),
        Some(FailureKind::ToolProducedNoOutput)
    );
}

#[test]
fn generate_writes_inputs_without_running() {
    let config = LabConfig {
        problems: ProblemToggles {
            t_way: true,
            increasing_values: true,
            ..ProblemToggles::default()
        },
        ..config("generate", vec![ToolId::Jenny, ToolId::Tcases])
    };
    let runner = FakeRunner::new();
    let ctx = RunContext::new(&config, &runner, GbgaTable::default());
    let mut lab = Laboratory::setup(&config);
    let first = lab.generate_all(&ctx);
    assert_eq!(first.failed, 0);
    assert_eq!(first.written, lab.len());
    assert!(runner.calls.borrow().is_empty());
    assert!(config.data_folder.join("Tcases-t-2.xml").is_file());
    assert!(config.data_folder.join("Jenny-increasing-2-3-3.txt").is_file());

    let second = lab.generate_all(&ctx);
    assert_eq!(second.reused, lab.len());
}

#[test]
fn results_are_appended_as_json_lines() {
    let config = config("jsonl", vec![ToolId::Jenny]);
    let runner = FakeRunner::new().reply("jenny", "1a 2a 3a\n");
    let ctx = RunContext::new(&config, &runner, GbgaTable::default());
    let out = config.data_folder.join("results.jsonl");
    let mut lab = Laboratory::setup(&config);
    {
        let mut sink = JsonLinesSink::create(&out).unwrap();
        lab.run_all(&ctx, &mut sink);
    }
    let content = std::fs::read_to_string(&out).unwrap();
    let records: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r["outputs"]["Size"] == 1));
    assert_eq!(records[0]["inputs"]["Testing problem"], "t-way test generation");
}

#[test]
fn dry_run_spawns_nothing_for_graph_reductions() {
    let config = LabConfig {
        dry_run: true,
        ..config(
            "dry-reductions",
            vec![ToolId::Hypergraph, ToolId::Coloring, ToolId::Jenny],
        )
    };
    let runner = FakeRunner::new().reply("php", "graph G {}\n");
    let ctx = RunContext::new(&config, &runner, GbgaTable::default());
    let mut lab = Laboratory::setup(&config);
    assert_eq!(lab.len(), 6);

    let summary = lab.run_all(&ctx, &mut RecordBuffer::new());
    assert_eq!(summary.failed, 6);
    assert_eq!(
        summary.failures.get(&FailureKind::ToolProducedNoOutput),
        Some(&6)
    );
    assert!(runner.programs().is_empty());
}

#[test]
fn timeout_marks_failure_with_bounded_duration() {
    let config = config("timeout", vec![ToolId::Jenny]);
    let runner = FakeRunner::new().fail(
        "jenny",
        LabError::ToolTimeout {
            program: "jenny".to_string(),
            timeout_ms: 500,
        },
    );
    let ctx = RunContext::new(&config, &runner, GbgaTable::default());
    let mut exp = Experiment::new(Problem::tway(TWayShape::new(2, 2, 3).unwrap()), ToolId::Jenny);
    assert_eq!(exp.run(&ctx), Status::Failed);
    assert_eq!(exp.duration_ms(), Some(500));
    assert_eq!(exp.size(), None);
}

#[cfg(unix)]
#[test]
fn real_process_is_killed_at_the_time_limit() {
    let mut config = config("real-timeout", vec![ToolId::Coloring]);
    config.timeout_ms = 150;
    config.paths.dsatur = "sh".into();
    let runner = combilab::lab::process::SystemRunner;
    let ctx = RunContext::new(&config, &runner, GbgaTable::default());
    let problem = Problem::tway(TWayShape::new(2, 2, 3).unwrap());
    let input = problem.filename_for(ToolId::Coloring, &config.data_folder);
    std::fs::create_dir_all(&config.data_folder).unwrap();
    // `sh <input>` runs the "graph" as a script.
    std::fs::write(&input, "exec sleep 5\n").unwrap();

    let mut exp = Experiment::new(problem, ToolId::Coloring);
    let started = std::time::Instant::now();
    assert_eq!(exp.run(&ctx), Status::Failed);
    assert!(started.elapsed() < std::time::Duration::from_secs(4));
    assert_eq!(exp.error().map(LabError::kind), Some(FailureKind::ToolTimeout));
    assert_eq!(exp.duration_ms(), Some(150));
}
