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

//! Blocking child-process helpers and the startup dependency check.

use crate::error::{BenchError, ProcessFailure, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// External binaries a benchmark run cannot do without.
pub const REQUIRED_TOOLS: &[&str] = &["go", "hyperfine"];

/// Run `command` to completion and return its stdout.
///
/// A spawn error or a non-zero exit is reported as a [`ProcessFailure`]
/// carrying the child's stderr.
pub fn run_checked(command: &mut Command) -> std::result::Result<String, ProcessFailure> {
    let program = command.get_program().to_string_lossy().into_owned();
    log::debug!("Running: {:?}", command);

    let output = command
        .output()
        .map_err(|e| ProcessFailure::spawn(&program, &e))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr);

    if !stderr.trim().is_empty() {
        log::debug!("{} stderr:\n{}", program, stderr.trim_end());
    }

    if !output.status.success() {
        return Err(ProcessFailure::exit(program, output.status.code(), &stderr));
    }

    Ok(stdout)
}

/// Locate `tool` on `PATH` the way a shell would.
pub fn which(tool: &str) -> Option<PathBuf> {
    let tool_path = Path::new(tool);
    if tool_path.components().count() > 1 {
        return is_executable(tool_path).then(|| tool_path.to_path_buf());
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(tool))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}

/// Fail with the first of `tools` that is not installed.
pub fn check_dependencies(tools: &[&str]) -> Result<()> {
    log::info!("🔍 Checking dependencies...");
    for tool in tools {
        match which(tool) {
            Some(path) => log::debug!("Found {} at {}", tool, path.display()),
            None => {
                return Err(BenchError::DependencyMissing {
                    tool: tool.to_string(),
                });
            }
        }
    }
    Ok(())
}
