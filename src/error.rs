// s5cmd-bench - Build comparison benchmarks for s5cmd
// Copyright (c) 2025 Oliver Seifert
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Error types shared by every stage of a benchmark run.
//!
//! None of these are recovered from. They travel up to the binary, which
//! performs the final cleanup and exits non-zero.

use std::io;
use std::path::Path;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BenchError>;

#[derive(Debug, Error)]
pub enum BenchError {
    /// Invalid user or scenario configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required external binary is not on `PATH`.
    #[error("{tool} is not found. Please install it to your system and run the script again.")]
    DependencyMissing { tool: String },

    /// Fetching, checking out or compiling a reference failed.
    #[error("failed to build '{reference}': {reason}")]
    Build { reference: String, reason: String },

    /// The timing driver exited non-zero or produced output we cannot read.
    #[error("timing driver error: {0}")]
    Driver(String),

    /// A scenario lifecycle method was called out of order.
    #[error("scenario '{scenario}' cannot {action} while {state}")]
    InvalidTransition {
        scenario: String,
        state: String,
        action: &'static str,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl BenchError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn io_at(action: &str, path: &Path, source: io::Error) -> Self {
        Self::io(format!("Failed to {} {}", action, path.display()), source)
    }
}

/// A child process that could not be spawned or exited unsuccessfully.
#[derive(Debug, Error)]
#[error("`{program}` {outcome}")]
pub struct ProcessFailure {
    pub program: String,
    pub outcome: String,
}

impl ProcessFailure {
    pub(crate) fn spawn(program: impl Into<String>, source: &io::Error) -> Self {
        Self {
            program: program.into(),
            outcome: format!("could not be started: {}", source),
        }
    }

    pub(crate) fn exit(program: impl Into<String>, code: Option<i32>, stderr: &str) -> Self {
        let status = match code {
            Some(code) => format!("exited with status {}", code),
            None => "was terminated by a signal".to_string(),
        };
        let stderr = stderr.trim();
        let outcome = if stderr.is_empty() {
            status
        } else {
            format!("{}: {}", status, stderr)
        };
        Self {
            program: program.into(),
            outcome,
        }
    }
}
