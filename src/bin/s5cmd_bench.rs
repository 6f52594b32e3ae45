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

//! # s5cmd Build Comparison Benchmark
//!
//! Features:
//! - Builds two s5cmd revisions (PR, tag, commit, `master`, `latest_release`)
//! - Times upload, download and remove of generated files with hyperfine
//! - Markdown summary with per-command details
//! - Local and remote files are removed at the end, also on Ctrl+C
//!
//! Usage:
//!   cargo run --release -- --bucket <bucket> [--s5cmd <old> <new>] [--runs <n>] [--warmup <n>] [--scenarios <names>]

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use s5cmd_bench::config::{BenchConfig, DEFAULT_OUTPUT, DEFAULT_PREFIX};
use s5cmd_bench::reference::{LATEST_RELEASE, MASTER};
use s5cmd_bench::report::Report;
use s5cmd_bench::source::DEFAULT_REPO_URL;
use s5cmd_bench::{BenchmarkRunner, Workspace, exec};
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(name = "s5cmd-bench")]
#[command(about = "Compare performance of two different builds of s5cmd.", long_about = None)]
#[command(version)]
struct Args {
    /// References to old and new s5cmd. Each can be a PR number, a version tag
    /// like v2.0.0, any commit-ish, 'latest_release' or 'master'
    #[arg(
        short,
        long,
        num_args = 2,
        value_names = ["OLD", "NEW"],
        default_values = [LATEST_RELEASE, MASTER]
    )]
    s5cmd: Vec<String>,

    /// Number of program executions before the actual benchmark
    #[arg(short, long, default_value = "2")]
    warmup: u32,

    /// Number of runs to perform for each command
    #[arg(short, long, default_value = "10")]
    runs: u32,

    /// Name of the output file
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output_file_name: PathBuf,

    /// Name of the bucket in remote
    #[arg(short, long)]
    bucket: String,

    /// Local path for temporary files (default: system temp dir)
    #[arg(short, long)]
    local_path: Option<PathBuf>,

    /// Key prefix to be used while uploading to the bucket
    #[arg(short, long, default_value = DEFAULT_PREFIX)]
    prefix: String,

    /// Extra flags passed to hyperfine, e.g. "--show-output"
    #[arg(long, visible_alias = "hf", allow_hyphen_values = true)]
    hyperfine_extra_flags: Option<String>,

    /// Extra global flags passed to both s5cmd builds, e.g. "--numworkers 64"
    #[arg(long, visible_alias = "sf", allow_hyphen_values = true)]
    s5cmd_extra_flags: Option<String>,

    /// Repository to clone s5cmd from
    #[arg(long, default_value = DEFAULT_REPO_URL)]
    repo_url: String,

    /// Scenarios to run (small-files, large-file, very-large-file)
    #[arg(long, value_delimiter = ',')]
    scenarios: Vec<String>,
}

impl Args {
    fn into_config(self) -> BenchConfig {
        let mut references = self.s5cmd.into_iter();
        let old = references.next().unwrap_or_else(|| LATEST_RELEASE.to_string());
        let new = references.next().unwrap_or_else(|| MASTER.to_string());

        BenchConfig {
            references: [old, new],
            warmup: self.warmup,
            runs: self.runs,
            output: self.output_file_name,
            bucket: self.bucket,
            local_path: self.local_path,
            prefix: self.prefix,
            hyperfine_extra_flags: self.hyperfine_extra_flags,
            s5cmd_extra_flags: self.s5cmd_extra_flags,
            repo_url: self.repo_url,
            scenarios: self.scenarios,
        }
    }
}

/// Clean up the workspace on Ctrl+C. If the handler cannot be installed the
/// workspace is removed before returning the error.
fn guard_workspace(workspace: &Workspace, report: &Report) -> Result<()> {
    let interrupted_workspace = workspace.clone();
    let interrupted_report = report.clone();
    let installed = ctrlc::set_handler(move || {
        println!("\n\n⚠️  Ctrl+C received! Cleaning up...");
        interrupted_report.discard_detailed();
        if let Err(e) = interrupted_workspace.cleanup() {
            eprintln!("⚠️  {}", e);
        }
        process::exit(130);
    });

    if let Err(e) = installed {
        report.discard_detailed();
        if let Err(cleanup) = workspace.cleanup() {
            log::warn!("⚠️  {}", cleanup);
        }
        return Err(e).context("Failed to set Ctrl-C handler");
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    exec::check_dependencies(exec::REQUIRED_TOOLS)?;

    let runner = BenchmarkRunner::new(args.into_config()).context("Invalid configuration")?;
    let config = runner.config();

    log::info!("🚀 Starting s5cmd benchmark");
    log::info!("Comparing {} (old) with {} (new)", config.references[0], config.references[1]);

    let workspace = Workspace::create(&config.bucket, &config.prefix, config.local_path.as_deref())
        .context("Failed to create benchmark workspace")?;
    println!("The created local&remote files will be deleted at the end of tests.");

    guard_workspace(&workspace, runner.report())?;

    let outcome = runner.run(&workspace);
    runner.cleanup(&workspace);
    outcome.context("Benchmark aborted")?;

    println!(
        "\n✅ Benchmark complete! Results saved to {}",
        runner.report().summary_path().display().green()
    );
    Ok(())
}
