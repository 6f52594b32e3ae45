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

//! Workload scenarios and their setup → run → teardown lifecycle.

use crate::driver::{self, Invocation, TimingDriver};
use crate::error::{BenchError, Result};
use crate::report::Report;
use crate::size::parse_size;
use crate::source::Build;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Seconds to wait after re-uploading objects for a timed delete.
const PREPARE_SETTLE_SECS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Upload,
    Download,
    Remove,
}

impl Operation {
    /// Execution order within a scenario. Download reads what upload wrote,
    /// remove deletes it.
    pub const ALL: [Operation; 3] = [Operation::Upload, Operation::Download, Operation::Remove];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Upload => "upload",
            Operation::Download => "download",
            Operation::Remove => "remove",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How hyperfine repeats each comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingConfig {
    pub runs: u32,
    pub warmup: u32,
    /// Passed to hyperfine after the benchmarked commands, split on whitespace.
    pub extra_flags: Option<String>,
}

impl TimingConfig {
    pub fn new(runs: u32, warmup: u32) -> Self {
        Self {
            runs,
            warmup,
            extra_flags: None,
        }
    }

    pub fn with_extra_flags(mut self, flags: Option<String>) -> Self {
        self.extra_flags = flags.filter(|f| !f.trim().is_empty());
        self
    }

    /// A repeated timed delete needs the objects re-uploaded before every
    /// execution after the first.
    pub fn needs_remove_preparation(&self) -> bool {
        self.runs > 1 || self.warmup >= 1
    }

    fn extra_flag_list(&self) -> Vec<String> {
        self.extra_flags
            .as_deref()
            .map(|flags| flags.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioState {
    Created,
    SetUp,
    Ran,
    TornDown,
}

impl fmt::Display for ScenarioState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScenarioState::Created => "created",
            ScenarioState::SetUp => "set up",
            ScenarioState::Ran => "ran",
            ScenarioState::TornDown => "torn down",
        })
    }
}

/// Everything a scenario run needs from the surrounding benchmark.
#[derive(Debug, Clone, Copy)]
pub struct RunContext<'a> {
    pub old: &'a Build,
    pub new: &'a Build,
    /// `s3://bucket/prefix/suffix` the builds upload into.
    pub remote_path: &'a str,
    /// Where hyperfine writes its Markdown export.
    pub export_path: &'a Path,
}

/// The s5cmd command lines for one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commands {
    pub upload: String,
    pub download: String,
    pub remove: String,
    pub prepare_remove: String,
}

impl Commands {
    pub fn for_build(build: &Build, s5cmd_flags: &str, remote_path: &str) -> Self {
        let command = |args: &[&str]| {
            let mut parts = vec![build.path.display().to_string()];
            if !s5cmd_flags.trim().is_empty() {
                parts.push(s5cmd_flags.trim().to_string());
            }
            parts.extend(args.iter().map(|a| a.to_string()));
            parts.join(" ")
        };

        let side = &build.name;
        let upload = command(&["cp", "\"*\"", &format!("{}/{}/", remote_path, side)]);
        let download = command(&[
            "cp",
            &format!("\"{}/{}/*\"", remote_path, side),
            &format!("{}/", side),
        ]);
        let remove = command(&["rm", &format!("\"{}/{}/*\"", remote_path, side)]);
        let prepare_remove = format!("{} && sleep {}", upload, PREPARE_SETTLE_SECS);

        Self {
            upload,
            download,
            remove,
            prepare_remove,
        }
    }

    fn get(&self, operation: Operation) -> &str {
        match operation {
            Operation::Upload => &self.upload,
            Operation::Download => &self.download,
            Operation::Remove => &self.remove,
        }
    }
}

#[derive(Debug)]
pub struct Scenario {
    name: String,
    file_size: String,
    file_count: Option<i64>,
    timing: TimingConfig,
    s5cmd_flags: String,
    state: ScenarioState,
    work_dir: Option<PathBuf>,
    owns_work_dir: bool,
}

impl Scenario {
    /// A scenario without a file count reuses the shared workspace
    /// directory, for workloads that consume an earlier scenario's files.
    pub fn new(
        name: impl Into<String>,
        file_size: impl Into<String>,
        file_count: Option<i64>,
        timing: TimingConfig,
    ) -> Self {
        Self {
            name: name.into(),
            file_size: file_size.into(),
            file_count,
            timing,
            s5cmd_flags: String::new(),
            state: ScenarioState::Created,
            work_dir: None,
            owns_work_dir: false,
        }
    }

    pub fn with_s5cmd_flags(mut self, flags: Option<String>) -> Self {
        self.s5cmd_flags = flags.unwrap_or_default();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory-safe form of the name, e.g. `small-files`.
    pub fn slug(&self) -> String {
        self.name.replace(' ', "-")
    }

    pub fn file_size(&self) -> &str {
        &self.file_size
    }

    pub fn file_count(&self) -> Option<i64> {
        self.file_count
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    pub fn state(&self) -> ScenarioState {
        self.state
    }

    pub fn work_dir(&self) -> Option<&Path> {
        self.work_dir.as_deref()
    }

    fn expect_state(&self, expected: ScenarioState, action: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(BenchError::InvalidTransition {
                scenario: self.name.clone(),
                state: self.state.to_string(),
                action,
            })
        }
    }

    /// Materialize the fixture files under `local_dir`.
    pub fn setup(&mut self, local_dir: &Path) -> Result<()> {
        self.expect_state(ScenarioState::Created, "set up")?;
        let size = parse_size(&self.file_size)?;

        match self.file_count {
            None => {
                self.work_dir = Some(local_dir.to_path_buf());
                self.owns_work_dir = false;
            }
            Some(count) if count <= 0 => {
                return Err(BenchError::config(format!(
                    "file count for '{}' must be positive, got {}",
                    self.name, count
                )));
            }
            Some(count) => {
                let dir = local_dir.join(self.slug());
                fs::create_dir(&dir).map_err(|e| BenchError::io_at("create", &dir, e))?;
                self.work_dir = Some(dir.clone());
                self.owns_work_dir = true;
                create_files(&dir, count as u64, size)?;
            }
        }

        self.state = ScenarioState::SetUp;
        Ok(())
    }

    /// The hyperfine invocation for `operation`.
    pub fn invocation(&self, operation: Operation, ctx: &RunContext<'_>) -> Invocation {
        let old = Commands::for_build(ctx.old, &self.s5cmd_flags, ctx.remote_path);
        let new = Commands::for_build(ctx.new, &self.s5cmd_flags, ctx.remote_path);

        let prepare = if operation == Operation::Remove && self.timing.needs_remove_preparation() {
            vec![old.prepare_remove.clone(), new.prepare_remove.clone()]
        } else {
            Vec::new()
        };

        Invocation {
            names: [ctx.old.label.clone(), ctx.new.label.clone()],
            commands: [old.get(operation).to_string(), new.get(operation).to_string()],
            prepare,
            runs: self.timing.runs,
            warmup: self.timing.warmup,
            export_markdown: ctx.export_path.to_path_buf(),
            extra_flags: self.timing.extra_flag_list(),
        }
    }

    /// Time every operation for both builds and append the results to `report`.
    pub fn run<D: TimingDriver + ?Sized>(
        &mut self,
        ctx: &RunContext<'_>,
        driver: &D,
        report: &Report,
    ) -> Result<()> {
        self.expect_state(ScenarioState::SetUp, "run")?;
        let work_dir = self
            .work_dir
            .clone()
            .ok_or_else(|| BenchError::config(format!("'{}' has no working directory", self.name)))?;

        for operation in Operation::ALL {
            let run_name = format!("{} {}", operation, self.name);
            log::info!("⏱️  Running: {}", run_name);

            let invocation = self.invocation(operation, ctx);
            remove_stale_export(ctx.export_path)?;
            let output = driver.compare(&invocation, &work_dir)?;
            log::info!("{}", output.trim_end());

            let summary = driver::parse_summary(&output)?;
            report.append_summary(&run_name, &summary)?;

            let export = match fs::read_to_string(ctx.export_path) {
                Ok(export) => export,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Err(BenchError::Driver(format!(
                        "no markdown export written to {}",
                        ctx.export_path.display()
                    )));
                }
                Err(e) => return Err(BenchError::io_at("read", ctx.export_path, e)),
            };
            let rows = driver::parse_detailed_rows(&export)?;
            report.append_detailed(&run_name, &rows)?;
        }

        self.state = ScenarioState::Ran;
        Ok(())
    }

    /// Delete the fixture directory this scenario created, if any.
    pub fn teardown(&mut self) -> Result<()> {
        self.expect_state(ScenarioState::Ran, "tear down")?;

        if self.owns_work_dir {
            if let Some(dir) = &self.work_dir {
                fs::remove_dir_all(dir).map_err(|e| BenchError::io_at("remove", dir, e))?;
            }
        }

        self.state = ScenarioState::TornDown;
        Ok(())
    }
}

fn remove_stale_export(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(BenchError::io_at("remove", path, e)),
    }
}

/// Create `tmp0`..`tmp{count-1}`, each a sparse file of `size` bytes.
fn create_files(dir: &Path, count: u64, size: u64) -> Result<()> {
    log::info!(
        "📁 Creating {} file(s) of {} bytes in {}",
        count,
        size,
        dir.display()
    );

    let pb = ProgressBar::new(count);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("  {bar:40.cyan/blue} {pos}/{len} files | {elapsed_precise}")
    {
        pb.set_style(style.progress_chars("█▓░"));
    }

    for i in 0..count {
        let path = dir.join(format!("tmp{}", i));
        let file = File::create(&path).map_err(|e| BenchError::io_at("create", &path, e))?;
        file.set_len(size)
            .map_err(|e| BenchError::io_at("resize", &path, e))?;
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(())
}

/// The built-in workload catalog, in execution order.
pub fn default_scenarios(timing: &TimingConfig, s5cmd_flags: Option<&str>) -> Vec<Scenario> {
    let flags = s5cmd_flags.map(str::to_string);
    let single_shot = TimingConfig {
        runs: 1,
        warmup: 0,
        extra_flags: timing.extra_flags.clone(),
    };

    vec![
        Scenario::new("small files", "1M", Some(10000), timing.clone())
            .with_s5cmd_flags(flags.clone()),
        Scenario::new("large file", "10G", Some(1), timing.clone())
            .with_s5cmd_flags(flags.clone()),
        Scenario::new("very large file", "300G", Some(1), single_shot).with_s5cmd_flags(flags),
    ]
}

/// Keep the scenarios whose slug is in `selected`; an empty selection keeps all.
/// Any slug outside the catalog is an error.
pub fn select_scenarios(scenarios: Vec<Scenario>, selected: &[String]) -> Result<Vec<Scenario>> {
    if selected.is_empty() {
        return Ok(scenarios);
    }

    let available: Vec<String> = scenarios.iter().map(Scenario::slug).collect();
    let unknown: Vec<&str> = selected
        .iter()
        .filter(|slug| !available.contains(slug))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        return Err(BenchError::config(format!(
            "Unknown scenario(s): {}. Choose from: {}",
            unknown.join(", "),
            available.join(", ")
        )));
    }

    Ok(scenarios
        .into_iter()
        .filter(|s| selected.contains(&s.slug()))
        .collect())
}
