pub use crate::diagnostics::{FailureKind, LabError};

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod encode;
pub mod lab;
pub mod logging;
pub mod problem;
pub mod tool;
