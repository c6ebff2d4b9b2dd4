//! Extraction of a test suite size from raw tool output.

use crate::diagnostics::LabError;
use crate::tool::{SizeRule, ToolId};
use once_cell::sync::Lazy;
use regex::Regex;

pub(crate) const ACTS_LABEL: &str = "Number of Tests";
pub(crate) const COLORING_LABEL: &str = "permutation is";

static ACTS_SIZE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Number of Tests\s*:\s*(\d+)").expect("valid regex"));
static COLORING_SIZE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"permutation is\s*(\d+)").expect("valid regex"));

const EXCERPT_LEN: usize = 120;

/// Reads the size of the generated suite out of `output`.
///
/// Empty output is reported as [`LabError::ToolProducedNoOutput`]; output that
/// does not match the tool's rule as [`LabError::UnparsableOutput`].
pub fn parse_size(tool: ToolId, output: &str) -> Result<usize, LabError> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Err(LabError::ToolProducedNoOutput {
            tool: tool.name().to_string(),
        });
    }

    let size = match tool.size_rule() {
        SizeRule::CountLines => Some(count_lines(trimmed)),
        SizeRule::CountMarker(marker) => match trimmed.matches(marker).count() {
            0 => None,
            n => Some(n),
        },
        SizeRule::Labelled(label) => {
            let re = if label == ACTS_LABEL {
                &*ACTS_SIZE
            } else {
                &*COLORING_SIZE
            };
            re.captures(trimmed)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse().ok())
        }
        SizeRule::FirstLine => trimmed
            .lines()
            .next()
            .and_then(|line| line.trim().parse().ok()),
        SizeRule::HittingSet => {
            if trimmed.starts_with('#') {
                Some(trimmed.matches(' ').count() + 1)
            } else {
                Some(count_lines(trimmed))
            }
        }
        SizeRule::Table => None,
    };

    size.ok_or_else(|| LabError::UnparsableOutput {
        tool: tool.name().to_string(),
        excerpt: Some(excerpt(trimmed)),
    })
}

fn count_lines(text: &str) -> usize {
    text.lines().filter(|l| !l.trim().is_empty()).count()
}

fn excerpt(text: &str) -> String {
    let first = text.lines().next().unwrap_or_default();
    if first.chars().count() > EXCERPT_LEN {
        let cut: String = first.chars().take(EXCERPT_LEN).collect();
        format!("output starts with: {}...", cut)
    } else {
        format!("output starts with: {}", first)
    }
}
