//! User-facing terminal output: listings, summaries, environment reports.

use crate::diagnostics::LabError;
use crate::lab::experiment::Status;
use crate::lab::{GenerateSummary, Laboratory, RunSummary};
use crate::tool::ToolId;
use std::collections::BTreeMap;
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

fn stdout() -> StandardStream {
    let choice = if atty::is(atty::Stream::Stdout) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

fn heading(out: &mut StandardStream, text: &str) {
    let _ = out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
    let _ = writeln!(out, "{}", text);
    let _ = out.reset();
}

/// One line per experiment, grouped by testing problem.
pub fn print_listing(lab: &Laboratory, data_folder: &std::path::Path) {
    let mut out = stdout();
    for group in lab.groups() {
        heading(
            &mut out,
            &format!("{} ({} experiments)", group.kind, group.experiments.len()),
        );
        for exp in &group.experiments {
            let _ = writeln!(
                out,
                "  #{:<5} {:<11} {}  {}",
                exp.id(),
                exp.tool().name(),
                exp.problem(),
                exp.problem().filename_for(exp.tool(), data_folder).display()
            );
        }
    }
}

/// Completed/total per problem and tool, then failure counts by kind.
pub fn print_summary(lab: &Laboratory, summary: &RunSummary) {
    let mut out = stdout();
    heading(&mut out, "Results");
    let _ = writeln!(
        out,
        "  {:<24} {:<11} {:>9} {:>7} {:>10}",
        "Testing problem", "Tool", "Completed", "Total", "Mean size"
    );
    for group in lab.groups() {
        let mut per_tool: BTreeMap<ToolId, (usize, usize, i64)> = BTreeMap::new();
        for exp in &group.experiments {
            let entry = per_tool.entry(exp.tool()).or_default();
            entry.1 += 1;
            if exp.status() == Status::Completed {
                entry.0 += 1;
                entry.2 += exp.size().unwrap_or_default();
            }
        }
        for (tool, (done, total, size_sum)) in per_tool {
            let mean = if done > 0 {
                format!("{:.1}", size_sum as f64 / done as f64)
            } else {
                "-".to_string()
            };
            let color = if done == total { Color::Green } else { Color::Yellow };
            let _ = out.set_color(ColorSpec::new().set_fg(Some(color)));
            let _ = writeln!(
                out,
                "  {:<24} {:<11} {:>9} {:>7} {:>10}",
                group.kind.name(),
                tool.name(),
                done,
                total,
                mean
            );
            let _ = out.reset();
        }
    }

    let _ = writeln!(out);
    let _ = out.set_color(ColorSpec::new().set_bold(true));
    let _ = writeln!(
        out,
        "{} experiments: {} completed, {} failed",
        summary.total, summary.completed, summary.failed
    );
    let _ = out.reset();
    for (kind, count) in &summary.failures {
        let _ = out.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
        let _ = writeln!(out, "  {:<24} {}", kind.as_str(), count);
        let _ = out.reset();
    }
}

pub fn print_generate(summary: &GenerateSummary) {
    let mut out = stdout();
    let _ = out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    let _ = writeln!(
        out,
        "{} written, {} reused, {} failed",
        summary.written, summary.reused, summary.failed
    );
    let _ = out.reset();
}

pub fn print_environment(report: Option<&LabError>) {
    let mut out = stdout();
    match report {
        None => {
            let _ = out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
            let _ = writeln!(out, "All external tools found.");
        }
        Some(LabError::MissingExecutable { missing }) => {
            let _ = out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true));
            let _ = writeln!(out, "Missing external tools:");
            let _ = out.reset();
            for line in missing {
                let _ = writeln!(out, "  {}", line);
            }
        }
        Some(other) => {
            let _ = out.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
            let _ = writeln!(out, "{}", other);
        }
    }
    let _ = out.reset();
}

pub fn print_removed(paths: &[std::path::PathBuf]) {
    let mut out = stdout();
    for path in paths {
        let _ = writeln!(out, "removed {}", path.display());
    }
    let _ = out.set_color(ColorSpec::new().set_bold(true));
    let _ = writeln!(out, "{} stale files removed", paths.len());
    let _ = out.reset();
}
