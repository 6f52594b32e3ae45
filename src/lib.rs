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

//! # s5cmd build comparison benchmarks
//!
//! Builds two revisions of s5cmd and times them against each other with
//! hyperfine on a set of upload, download and remove workloads.
//!
//! - References can be a PR number, a version tag, any commit-ish, or the
//!   keywords `master` and `latest_release`
//! - Fixture files are sparse, so even the 300G scenario costs no disk space
//!   until s5cmd downloads it
//! - Results are written as a Markdown summary with a detailed table appended

pub mod config;
pub mod driver;
pub mod error;
pub mod exec;
pub mod reference;
pub mod report;
pub mod runner;
pub mod scenario;
pub mod size;
pub mod source;
pub mod workspace;

pub use config::BenchConfig;
pub use error::{BenchError, Result};
pub use reference::Reference;
pub use runner::BenchmarkRunner;
pub use scenario::{Operation, Scenario, TimingConfig};
pub use source::Build;
pub use workspace::Workspace;
