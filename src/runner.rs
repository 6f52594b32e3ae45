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

//! Top-level sequencing of a benchmark run.

use crate::config::BenchConfig;
use crate::driver::{Hyperfine, TimingDriver};
use crate::error::Result;
use crate::reference::Reference;
use crate::report::{HostInfo, Report};
use crate::scenario::{RunContext, Scenario};
use crate::source::{Build, SourceTree};
use crate::workspace::Workspace;

const CLONE_DIR: &str = "s5cmd";
const EXPORT_FILE: &str = "hyperfine.md";

pub struct BenchmarkRunner<D = Hyperfine> {
    config: BenchConfig,
    driver: D,
    report: Report,
}

impl BenchmarkRunner<Hyperfine> {
    pub fn new(config: BenchConfig) -> Result<Self> {
        Self::with_driver(config, Hyperfine::new())
    }
}

impl<D: TimingDriver> BenchmarkRunner<D> {
    pub fn with_driver(config: BenchConfig, driver: D) -> Result<Self> {
        config.validate()?;
        let report = Report::at(&config.output);
        Ok(Self {
            config,
            driver,
            report,
        })
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    /// Clone, build both sides and run every selected scenario.
    pub fn run(&self, workspace: &Workspace) -> Result<()> {
        let (old, new) = self.build_both(workspace)?;
        let mut scenarios = self.config.scenarios()?;
        self.run_scenarios(workspace, &mut scenarios, &old, &new)
    }

    fn build_both(&self, workspace: &Workspace) -> Result<(Build, Build)> {
        log::info!("📦 Preparing builds from {}", self.config.repo_url);
        let source = SourceTree::clone_from(
            &self.config.repo_url,
            &workspace.local_dir().join(CLONE_DIR),
        )?;

        let [old_ref, new_ref] = &self.config.references;
        let old = source.build(&Reference::parse(old_ref), "old", workspace.local_dir())?;
        let new = source.build(&Reference::parse(new_ref), "new", workspace.local_dir())?;
        log::info!("   ✓ old = {}, new = {}", old.label, new.label);

        Ok((old, new))
    }

    /// Initialize the report, run `scenarios` in order and merge the report.
    pub fn run_scenarios(
        &self,
        workspace: &Workspace,
        scenarios: &mut [Scenario],
        old: &Build,
        new: &Build,
    ) -> Result<()> {
        self.report
            .initialize(scenarios, [old, new], &HostInfo::collect())?;

        let export_path = workspace.local_dir().join(EXPORT_FILE);
        let ctx = RunContext {
            old,
            new,
            remote_path: workspace.remote_path(),
            export_path: &export_path,
        };

        log::info!(
            "Hyperfine will execute s5cmd uploads {} times to warmup, and {} times for measurements.",
            self.config.warmup,
            self.config.runs
        );

        for scenario in scenarios.iter_mut() {
            log::info!("{}", "═".repeat(80));
            log::info!("🧪 Scenario: {}", scenario.name());

            scenario.setup(workspace.local_dir())?;
            scenario.run(&ctx, &self.driver, &self.report)?;
            scenario.teardown()?;

            log::info!("   ✓ Completed: {}", scenario.name());
        }

        self.report.finalize()?;
        log::info!("💾 Results saved to: {}", self.report.summary_path().display());
        Ok(())
    }

    /// Best-effort removal of the intermediate report file and the workspace.
    pub fn cleanup(&self, workspace: &Workspace) {
        self.report.discard_detailed();
        if let Err(e) = workspace.cleanup() {
            log::warn!("⚠️  {}", e);
        }
    }
}
