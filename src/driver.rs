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

//! Invoking hyperfine and reading what it reports.
//!
//! Hyperfine's text output is not a versioned interface. Everything that
//! depends on its layout lives in [`parse_summary`] and
//! [`parse_detailed_rows`].

use crate::error::{BenchError, Result};
use crate::exec;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// One hyperfine comparison of an old and a new command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Display names, in the same order as `commands`.
    pub names: [String; 2],
    pub commands: [String; 2],
    /// `--prepare` commands, one per benchmarked command when present.
    pub prepare: Vec<String>,
    pub runs: u32,
    pub warmup: u32,
    pub export_markdown: PathBuf,
    pub extra_flags: Vec<String>,
}

impl Invocation {
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--export-markdown".into(),
            self.export_markdown.clone().into_os_string(),
            "-u".into(),
            "second".into(),
            "--runs".into(),
            self.runs.to_string().into(),
            "--warmup".into(),
            self.warmup.to_string().into(),
        ];

        for name in &self.names {
            args.push("-n".into());
            args.push(name.into());
        }
        for prepare in &self.prepare {
            args.push("--prepare".into());
            args.push(prepare.into());
        }
        args.extend(self.commands.iter().map(OsString::from));
        args.extend(self.extra_flags.iter().map(OsString::from));
        args
    }
}

/// Something that can time a pair of shell commands.
pub trait TimingDriver {
    /// Run `invocation` with `cwd` as the working directory and return stdout.
    /// The Markdown export must be written to `invocation.export_markdown`.
    fn compare(&self, invocation: &Invocation, cwd: &Path) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct Hyperfine {
    program: PathBuf,
}

impl Hyperfine {
    pub fn new() -> Self {
        Self::with_program("hyperfine")
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for Hyperfine {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingDriver for Hyperfine {
    fn compare(&self, invocation: &Invocation, cwd: &Path) -> Result<String> {
        exec::run_checked(
            Command::new(&self.program)
                .args(invocation.args())
                .current_dir(cwd)
                .stderr(Stdio::inherit()),
        )
        .map_err(|e| BenchError::Driver(e.to_string()))
    }
}

/// Extract the relative-speed sentence from hyperfine's stdout.
///
/// Takes the last line containing `Summary` and joins the two lines after
/// it, e.g. `new ran 1.05 ± 0.02 times faster than old`.
pub fn parse_summary(output: &str) -> Result<String> {
    let lines: Vec<&str> = output.lines().collect();
    let marker = lines
        .iter()
        .rposition(|line| line.contains("Summary"))
        .ok_or_else(|| BenchError::Driver("output has no 'Summary' section".to_string()))?;

    match (lines.get(marker + 1), lines.get(marker + 2)) {
        (Some(first), Some(second)) => Ok(format!("{} {}", first.trim(), second.trim())),
        _ => Err(BenchError::Driver(
            "'Summary' section is shorter than two lines".to_string(),
        )),
    }
}

/// The two per-command rows at the end of hyperfine's Markdown export, last
/// row first. With commands given as old then new, the new build leads.
pub fn parse_detailed_rows(markdown: &str) -> Result<[String; 2]> {
    let lines: Vec<&str> = markdown
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect();

    // Header, separator, then one row per command.
    if lines.len() < 4 {
        return Err(BenchError::Driver(format!(
            "markdown export has {} lines, expected a table with two rows",
            lines.len()
        )));
    }

    let rows = [lines[lines.len() - 1], lines[lines.len() - 2]];
    if let Some(bad) = rows.iter().find(|row| !row.starts_with('|')) {
        return Err(BenchError::Driver(format!(
            "unexpected line in markdown export: {}",
            bad
        )));
    }

    Ok(rows.map(str::to_string))
}
