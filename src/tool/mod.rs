//! External test-suite generators and their fixed properties.
//!
//! Every tool is a black box: the lab writes its input file, runs it, and
//! reads one number back. What differs per tool is captured here: display
//! name, input file extension, and how its size is read from the output.

pub mod parse;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies one external generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ToolId {
    Jenny,
    Tcases,
    #[serde(rename = "IPOG", alias = "ACTS", alias = "Acts")]
    Acts,
    #[serde(rename = "CASA", alias = "Casa")]
    Casa,
    Coloring,
    Hypergraph,
    #[serde(rename = "GBGA", alias = "Gbga")]
    Gbga,
}

/// How a tool's output is turned into a test suite size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeRule {
    /// One test per non-empty line.
    CountLines,
    /// One test per occurrence of a marker.
    CountMarker(&'static str),
    /// A decimal following a fixed label.
    Labelled(&'static str),
    /// The first line is the size.
    FirstLine,
    /// Hitting-set output: a `#`-prefixed single line of space-separated
    /// vertices, or one test per line.
    HittingSet,
    /// Read from a precomputed table, never parsed.
    Table,
}

impl ToolId {
    pub const ALL: [ToolId; 7] = [
        ToolId::Jenny,
        ToolId::Tcases,
        ToolId::Acts,
        ToolId::Casa,
        ToolId::Coloring,
        ToolId::Hypergraph,
        ToolId::Gbga,
    ];

    /// Display name, also used as the file name prefix.
    pub fn name(&self) -> &'static str {
        match self {
            ToolId::Jenny => "Jenny",
            ToolId::Tcases => "Tcases",
            ToolId::Acts => "IPOG",
            ToolId::Casa => "CASA",
            ToolId::Coloring => "Coloring",
            ToolId::Hypergraph => "Hypergraph",
            ToolId::Gbga => "GBGA",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ToolId::Coloring => "dot",
            ToolId::Hypergraph => "edn",
            ToolId::Tcases => "xml",
            ToolId::Jenny | ToolId::Acts | ToolId::Casa | ToolId::Gbga => "txt",
        }
    }

    pub fn size_rule(&self) -> SizeRule {
        match self {
            ToolId::Jenny => SizeRule::CountLines,
            ToolId::Tcases => SizeRule::CountMarker("<TestCase"),
            ToolId::Acts => SizeRule::Labelled(parse::ACTS_LABEL),
            ToolId::Casa => SizeRule::FirstLine,
            ToolId::Coloring => SizeRule::Labelled(parse::COLORING_LABEL),
            ToolId::Hypergraph => SizeRule::HittingSet,
            ToolId::Gbga => SizeRule::Table,
        }
    }

    /// Whether writing this tool's input file runs an external reduction.
    pub fn encodes_via_process(&self) -> bool {
        matches!(self, ToolId::Coloring | ToolId::Hypergraph)
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ToolId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jenny" => Ok(ToolId::Jenny),
            "tcases" => Ok(ToolId::Tcases),
            "ipog" | "acts" => Ok(ToolId::Acts),
            "casa" => Ok(ToolId::Casa),
            "coloring" => Ok(ToolId::Coloring),
            "hypergraph" => Ok(ToolId::Hypergraph),
            "gbga" => Ok(ToolId::Gbga),
            other => Err(format!("unknown tool '{}'", other)),
        }
    }
}
