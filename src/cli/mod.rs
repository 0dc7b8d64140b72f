//! Command-line interface

pub mod args;
pub mod commands;

pub use args::{Cli, Commands};

use std::process::ExitCode;

/// How a successful command run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    /// The run finished but at least one removal failed
    RemovalsFailed,
}

impl RunStatus {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::Success => ExitCode::SUCCESS,
            Self::RemovalsFailed => ExitCode::from(2),
        }
    }
}
