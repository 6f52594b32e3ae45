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

use crate::error::{BenchError, Result};
use crate::reference::{LATEST_RELEASE, MASTER};
use crate::scenario::{self, Scenario, TimingConfig};
use crate::source::DEFAULT_REPO_URL;
use std::path::PathBuf;

pub const DEFAULT_PREFIX: &str = "s5cmd-benchmarks-";
pub const DEFAULT_OUTPUT: &str = "summary.md";

/// Settings for one benchmark run, independent of how they were collected.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// References for the old and new build.
    pub references: [String; 2],
    pub warmup: u32,
    pub runs: u32,
    pub output: PathBuf,
    pub bucket: String,
    /// Parent for the staging directory; the system temp dir when unset.
    pub local_path: Option<PathBuf>,
    pub prefix: String,
    pub hyperfine_extra_flags: Option<String>,
    pub s5cmd_extra_flags: Option<String>,
    pub repo_url: String,
    /// Scenario slugs to run; empty runs the whole catalog.
    pub scenarios: Vec<String>,
}

impl BenchConfig {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            references: [LATEST_RELEASE.to_string(), MASTER.to_string()],
            warmup: 2,
            runs: 10,
            output: PathBuf::from(DEFAULT_OUTPUT),
            bucket: bucket.into(),
            local_path: None,
            prefix: DEFAULT_PREFIX.to_string(),
            hyperfine_extra_flags: None,
            s5cmd_extra_flags: None,
            repo_url: DEFAULT_REPO_URL.to_string(),
            scenarios: Vec::new(),
        }
    }

    /// Reject settings that would only fail after the expensive clone and build.
    pub fn validate(&self) -> Result<()> {
        if self.bucket.trim().is_empty() {
            return Err(BenchError::config("a bucket name is required"));
        }
        if self.runs == 0 {
            return Err(BenchError::config("--runs must be at least 1"));
        }
        if let Some(path) = &self.local_path {
            if !path.is_dir() {
                return Err(BenchError::config(format!(
                    "local path is not a directory: {}",
                    path.display()
                )));
            }
        }
        if self.references.iter().any(|r| r.trim().is_empty()) {
            return Err(BenchError::config("references must not be empty"));
        }
        self.scenarios().map(|_| ())
    }

    pub fn timing(&self) -> TimingConfig {
        TimingConfig::new(self.runs, self.warmup)
            .with_extra_flags(self.hyperfine_extra_flags.clone())
    }

    /// The selected scenarios, freshly constructed in declaration order.
    pub fn scenarios(&self) -> Result<Vec<Scenario>> {
        let all = scenario::default_scenarios(&self.timing(), self.s5cmd_extra_flags.as_deref());
        scenario::select_scenarios(all, &self.scenarios)
    }
}
