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

//! Markdown report output.
//!
//! Two documents are written side by side:
//! - the summary (user named), one row per scenario and operation
//! - `detailed_summary.md`, one row per build per scenario and operation
//!
//! Both are append-only while scenarios run. [`Report::finalize`] moves the
//! detailed table to the end of the summary.

use crate::error::{BenchError, Result};
use crate::scenario::Scenario;
use crate::source::Build;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use sysinfo::System;

pub const DETAILED_FILE_NAME: &str = "detailed_summary.md";

/// Machine the benchmark ran on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    pub os: String,
    pub cpu: String,
    pub cores: usize,
    pub memory_bytes: u64,
}

impl HostInfo {
    pub fn collect() -> Self {
        let mut system = System::new();
        system.refresh_cpu_all();
        system.refresh_memory();

        let cpu = system
            .cpus()
            .first()
            .map_or_else(|| "unknown".to_string(), |cpu| cpu.brand().trim().to_string());

        Self {
            os: System::long_os_version().unwrap_or_else(|| std::env::consts::OS.to_string()),
            cpu,
            cores: system.cpus().len(),
            memory_bytes: system.total_memory(),
        }
    }

    fn markdown(&self) -> String {
        format!(
            "Host: {} | {} ({} cores) | {:.1} GiB RAM",
            self.os,
            self.cpu,
            self.cores,
            self.memory_bytes as f64 / 1024.0 / 1024.0 / 1024.0
        )
    }
}

#[derive(Debug, Clone)]
pub struct Report {
    summary_path: PathBuf,
    detailed_path: PathBuf,
}

impl Report {
    /// Paths for a report whose summary is written to `summary_path`.
    /// Nothing is touched on disk.
    pub fn at(summary_path: impl Into<PathBuf>) -> Self {
        let summary_path = summary_path.into();
        let detailed_path = summary_path
            .parent()
            .map(|dir| dir.join(DETAILED_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(DETAILED_FILE_NAME));
        Self {
            summary_path,
            detailed_path,
        }
    }

    pub fn summary_path(&self) -> &Path {
        &self.summary_path
    }

    pub fn detailed_path(&self) -> &Path {
        &self.detailed_path
    }

    /// Truncate both documents and write their headers.
    pub fn initialize(
        &self,
        scenarios: &[Scenario],
        builds: [&Build; 2],
        host: &HostInfo,
    ) -> Result<()> {
        let mut summary = String::from("### Benchmark summary: \n");
        summary.push_str(&host.markdown());
        summary.push_str("\n\n| Build | Reference | Label | Tag |\n|:---|:---|:---|:---|\n");
        for build in builds {
            summary.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                build.name, build.reference, build.label, build.tag
            ));
        }

        summary.push_str("\n| Scenario | File Size | File Count |\n|:---|:---|:---|\n");
        for scenario in scenarios {
            summary.push_str(&scenario_detail(scenario));
            summary.push('\n');
        }
        summary.push_str("\n|Scenario| Summary |\n|:---|:---|\n");

        let detailed = "\n### Detailed summary: \
            \n|Scenario| Command | Mean [s] | Min [s] | Max [s] | Relative |\
            \n|:---|:---|---:|---:|---:|---:|\n";

        fs::write(&self.summary_path, summary)
            .map_err(|e| BenchError::io_at("write", &self.summary_path, e))?;
        fs::write(&self.detailed_path, detailed)
            .map_err(|e| BenchError::io_at("write", &self.detailed_path, e))?;

        log::info!("📝 Report initialized at {}", self.summary_path.display());
        Ok(())
    }

    pub fn append_summary(&self, run_name: &str, summary: &str) -> Result<()> {
        append(&self.summary_path, &format!("| {} | {} |\n", run_name, summary))
    }

    pub fn append_detailed(&self, run_name: &str, rows: &[String]) -> Result<()> {
        let text: String = rows
            .iter()
            .map(|row| format!("| {} {}\n", run_name, row))
            .collect();
        append(&self.detailed_path, &text)
    }

    /// Append the detailed table to the summary and delete the detailed file.
    pub fn finalize(&self) -> Result<()> {
        let detailed = fs::read_to_string(&self.detailed_path)
            .map_err(|e| BenchError::io_at("read", &self.detailed_path, e))?;
        append(&self.summary_path, &detailed)?;
        fs::remove_file(&self.detailed_path)
            .map_err(|e| BenchError::io_at("remove", &self.detailed_path, e))?;
        Ok(())
    }

    /// Best-effort removal of the intermediate detailed file.
    pub fn discard_detailed(&self) {
        if self.detailed_path.is_file() {
            if let Err(e) = fs::remove_file(&self.detailed_path) {
                log::warn!(
                    "Failed to remove {}: {}",
                    self.detailed_path.display(),
                    e
                );
            }
        }
    }
}

fn scenario_detail(scenario: &Scenario) -> String {
    let count = scenario
        .file_count()
        .map(|c| c.to_string())
        .unwrap_or_default();
    format!("| {} | {} | {} |", scenario.name(), scenario.file_size(), count)
}

fn append(path: &Path, text: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|e| BenchError::io_at("open", path, e))?;
    file.write_all(text.as_bytes())
        .map_err(|e| BenchError::io_at("append to", path, e))
}
