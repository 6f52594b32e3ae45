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

//! Classification of the references a user can compare.
//!
//! A reference is one of:
//! - `master`: tip of the upstream default branch
//! - `latest_release`: the most recently created tag
//! - a decimal pull request number, e.g. `478`
//! - a version tag, e.g. `v2.0.0` or `v2.0.0-beta.2`
//! - anything else, taken as an opaque commit-ish

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

pub const MASTER: &str = "master";
pub const LATEST_RELEASE: &str = "latest_release";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Master,
    LatestRelease,
    PullRequest(String),
    VersionTag(String),
    Commit(String),
}

impl Reference {
    /// Classify `reference`. First match wins; `Commit` is the fallback.
    pub fn parse(reference: &str) -> Self {
        match reference {
            MASTER => Self::Master,
            LATEST_RELEASE => Self::LatestRelease,
            r if is_pr(r) => Self::PullRequest(r.to_string()),
            r if is_version_tag(r) => Self::VersionTag(r.to_string()),
            r => Self::Commit(r.to_string()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Master => "master",
            Self::LatestRelease => "latest release",
            Self::PullRequest(_) => "pull request",
            Self::VersionTag(_) => "version tag",
            Self::Commit(_) => "commit",
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Master => f.write_str(MASTER),
            Self::LatestRelease => f.write_str(LATEST_RELEASE),
            Self::PullRequest(r) | Self::VersionTag(r) | Self::Commit(r) => f.write_str(r),
        }
    }
}

fn pr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+$").expect("pull request regex"))
}

fn version_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^v(\d+\.){2}\d(-[a-z]+\.?\d?)?$").expect("version tag regex")
    })
}

/// True for a decimal pull request number. `0` is never a pull request.
pub fn is_pr(tag: &str) -> bool {
    !tag.is_empty() && tag != "0" && pr_regex().is_match(tag)
}

pub fn is_version_tag(tag: &str) -> bool {
    !tag.is_empty() && version_tag_regex().is_match(tag)
}
