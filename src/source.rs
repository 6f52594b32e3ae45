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

//! Checking out references from the upstream repository and compiling them.

use crate::error::{BenchError, Result};
use crate::exec;
use crate::reference::Reference;
use git2::Repository;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::Command;

pub const DEFAULT_REPO_URL: &str = "https://github.com/peak/s5cmd.git";

/// A compiled s5cmd binary for one side of the comparison.
#[derive(Debug, Clone)]
pub struct Build {
    /// Side name, `old` or `new`. Also used as the remote key folder.
    pub name: String,
    pub reference: Reference,
    /// Concrete tag that was checked out (`master` becomes a short hash).
    pub tag: String,
    /// Human readable label shown in the reports.
    pub label: String,
    pub path: PathBuf,
}

/// What a reference resolved to after checkout, before compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub tag: String,
    pub label: String,
}

/// A local clone of the upstream repository.
pub struct SourceTree {
    repo: Repository,
    path: PathBuf,
}

impl SourceTree {
    /// Clone `url` (with all tags) into `dest`.
    pub fn clone_from(url: &str, dest: &Path) -> Result<Self> {
        log::info!("   Cloning {}...", url);
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message("Cloning repository...");
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        let mut fetch_options = git2::FetchOptions::new();
        fetch_options.download_tags(git2::AutotagOption::All);

        let mut builder = git2::build::RepoBuilder::new();
        builder.fetch_options(fetch_options);

        let repo = builder.clone(url, dest).map_err(|e| BenchError::Build {
            reference: url.to_string(),
            reason: format!("clone failed: {}", e.message()),
        })?;

        pb.finish_with_message("✓ Clone complete");
        Ok(Self {
            repo,
            path: dest.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check out `reference` and return the concrete tag and label.
    pub fn resolve(&self, reference: &Reference) -> Result<Resolved> {
        let failed = |e: git2::Error| BenchError::Build {
            reference: reference.to_string(),
            reason: e.message().to_string(),
        };

        let resolved = match reference {
            Reference::Master => {
                let tag = self.master_short_hash().map_err(failed)?;
                self.checkout(&tag).map_err(failed)?;
                Resolved {
                    tag,
                    label: "master".to_string(),
                }
            }
            Reference::LatestRelease => {
                let tag = self.latest_tag().map_err(failed)?;
                self.checkout(&format!("refs/tags/{}", tag)).map_err(failed)?;
                Resolved {
                    label: format!("latest_release:{}", tag),
                    tag,
                }
            }
            Reference::PullRequest(number) => {
                self.checkout_pull_request(number).map_err(failed)?;
                Resolved {
                    tag: number.clone(),
                    label: format!("PR:{}", number),
                }
            }
            Reference::VersionTag(tag) => {
                self.checkout(&format!("refs/tags/{}", tag)).map_err(failed)?;
                Resolved {
                    tag: tag.clone(),
                    label: format!("version:{}", tag),
                }
            }
            Reference::Commit(commit) => {
                self.checkout_commitish(commit).map_err(failed)?;
                Resolved {
                    tag: commit.clone(),
                    label: format!("commit{}", commit),
                }
            }
        };

        log::info!(
            "   Checked out {} '{}' as {}",
            reference.kind(),
            reference,
            resolved.label
        );
        Ok(resolved)
    }

    /// Resolve `reference` and compile it to `<out_dir>/<name>`.
    pub fn build(&self, reference: &Reference, name: &str, out_dir: &Path) -> Result<Build> {
        let resolved = self.resolve(reference)?;
        let path = out_dir.join(name);

        log::info!("🔨 Building {} ({}) -> {}", name, resolved.label, path.display());
        exec::run_checked(
            Command::new("go")
                .arg("build")
                .arg("-o")
                .arg(&path)
                .current_dir(&self.path),
        )
        .map_err(|e| BenchError::Build {
            reference: reference.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Build {
            name: name.to_string(),
            reference: reference.clone(),
            tag: resolved.tag,
            label: resolved.label,
            path,
        })
    }

    fn master_short_hash(&self) -> std::result::Result<String, git2::Error> {
        let object = self.repo.revparse_single("refs/remotes/origin/master")?;
        let commit = object.peel_to_commit()?;
        let short = commit.as_object().short_id()?;
        short
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| git2::Error::from_str("short id is not valid UTF-8"))
    }

    /// Most recently created tag. Annotated tags use the tagger date,
    /// lightweight tags the date of the commit they point at.
    fn latest_tag(&self) -> std::result::Result<String, git2::Error> {
        let names = self.repo.tag_names(None)?;
        let mut tags = Vec::with_capacity(names.len());

        for name in names.iter().flatten() {
            let object = self.repo.revparse_single(&format!("refs/tags/{}", name))?;
            let tagged = object
                .as_tag()
                .and_then(|tag| tag.tagger().map(|sig| sig.when().seconds()));
            let created = match tagged {
                Some(seconds) => seconds,
                None => object.peel_to_commit()?.time().seconds(),
            };
            tags.push((created, name.to_string()));
        }

        tags.sort();
        tags.pop()
            .map(|(_, name)| name)
            .ok_or_else(|| git2::Error::from_str("repository has no tags"))
    }

    fn checkout_pull_request(&self, number: &str) -> std::result::Result<(), git2::Error> {
        let local_ref = format!("refs/remotes/origin/pull/{}", number);
        let refspec = format!("+refs/pull/{}/head:{}", number, local_ref);

        let mut remote = self.repo.find_remote("origin")?;
        remote.fetch(&[refspec.as_str()], None, None)?;

        self.checkout(&local_ref)
    }

    /// Like `git checkout <ref>`: a name that is only a branch on `origin`
    /// falls back to `refs/remotes/origin/<ref>`.
    fn checkout_commitish(&self, commitish: &str) -> std::result::Result<(), git2::Error> {
        let object = match self.repo.revparse_single(commitish) {
            Ok(object) => object,
            Err(e) => self
                .repo
                .revparse_single(&format!("refs/remotes/origin/{}", commitish))
                .map_err(|_| e)?,
        };
        self.checkout_object(&object)
    }

    fn checkout(&self, spec: &str) -> std::result::Result<(), git2::Error> {
        let object = self.repo.revparse_single(spec)?;
        self.checkout_object(&object)
    }

    fn checkout_object(&self, object: &git2::Object<'_>) -> std::result::Result<(), git2::Error> {
        let commit = object.peel_to_commit()?;

        let mut checkout = git2::build::CheckoutBuilder::new();
        checkout.force();
        self.repo.checkout_tree(commit.as_object(), Some(&mut checkout))?;
        self.repo.set_head_detached(commit.id())
    }

    #[cfg(test)]
    fn head_id(&self) -> git2::Oid {
        self.repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .map(|c| c.id())
            .expect("head commit")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Oid, Signature, Time};
    use std::fs;
    use tempfile::TempDir;

    struct Upstream {
        _dir: TempDir,
        repo: Repository,
    }

    impl Upstream {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let mut opts = git2::RepositoryInitOptions::new();
            opts.initial_head("master");
            let repo = Repository::init_opts(dir.path(), &opts).unwrap();
            Self { _dir: dir, repo }
        }

        fn url(&self) -> String {
            self.repo.workdir().unwrap().to_string_lossy().into_owned()
        }

        fn signature(seconds: i64) -> Signature<'static> {
            Signature::new("bench", "bench@example.com", &Time::new(seconds, 0)).unwrap()
        }

        fn commit(&self, update_ref: Option<&str>, content: &str, seconds: i64) -> Oid {
            let workdir = self.repo.workdir().unwrap();
            fs::write(workdir.join("main.go"), content).unwrap();

            let mut index = self.repo.index().unwrap();
            index.add_path(Path::new("main.go")).unwrap();
            index.write().unwrap();
            let tree = self.repo.find_tree(index.write_tree().unwrap()).unwrap();

            let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
            let parents: Vec<&git2::Commit> = parent.iter().collect();
            let sig = Self::signature(seconds);
            self.repo
                .commit(update_ref, &sig, &sig, content, &tree, &parents)
                .unwrap()
        }

        fn annotated_tag(&self, name: &str, target: Oid, seconds: i64) {
            let object = self.repo.find_object(target, None).unwrap();
            self.repo
                .tag(name, &object, &Self::signature(seconds), name, false)
                .unwrap();
        }

        fn lightweight_tag(&self, name: &str, target: Oid) {
            let object = self.repo.find_object(target, None).unwrap();
            self.repo.tag_lightweight(name, &object, false).unwrap();
        }
    }

    fn clone(upstream: &Upstream) -> (TempDir, SourceTree) {
        let dir = TempDir::new().unwrap();
        let tree = SourceTree::clone_from(&upstream.url(), &dir.path().join("s5cmd")).unwrap();
        (dir, tree)
    }

    #[test]
    fn master_resolves_to_short_hash() {
        let upstream = Upstream::new();
        upstream.commit(Some("HEAD"), "package main // 1", 1_000);
        let tip = upstream.commit(Some("HEAD"), "package main // 2", 2_000);

        let (_dir, tree) = clone(&upstream);
        let resolved = tree.resolve(&Reference::Master).unwrap();

        assert_eq!(resolved.label, "master");
        assert!(tip.to_string().starts_with(&resolved.tag));
        assert!(resolved.tag.len() < 40);
        assert_eq!(tree.head_id(), tip);
    }

    #[test]
    fn latest_release_picks_most_recently_created_tag() {
        let upstream = Upstream::new();
        let first = upstream.commit(Some("HEAD"), "package main // 1", 1_000);
        let second = upstream.commit(Some("HEAD"), "package main // 2", 2_000);
        upstream.commit(Some("HEAD"), "package main // 3", 3_000);

        // Created later than v2.0.0 even though it points at an older commit.
        upstream.annotated_tag("v2.0.0", second, 4_000);
        upstream.annotated_tag("v1.9.9", first, 5_000);

        let (_dir, tree) = clone(&upstream);
        let resolved = tree.resolve(&Reference::LatestRelease).unwrap();

        assert_eq!(resolved.tag, "v1.9.9");
        assert_eq!(resolved.label, "latest_release:v1.9.9");
        assert_eq!(tree.head_id(), first);
    }

    #[test]
    fn lightweight_tags_use_commit_date() {
        let upstream = Upstream::new();
        let old = upstream.commit(Some("HEAD"), "package main // 1", 1_000);
        let new = upstream.commit(Some("HEAD"), "package main // 2", 9_000);
        upstream.annotated_tag("v1.0.0", old, 5_000);
        upstream.lightweight_tag("v1.1.0", new);

        let (_dir, tree) = clone(&upstream);
        let resolved = tree.resolve(&Reference::LatestRelease).unwrap();
        assert_eq!(resolved.tag, "v1.1.0");
    }

    #[test]
    fn tags_created_at_the_same_time_are_ordered_by_name() {
        let upstream = Upstream::new();
        let first = upstream.commit(Some("HEAD"), "package main // 1", 1_000);
        let second = upstream.commit(Some("HEAD"), "package main // 2", 2_000);
        upstream.annotated_tag("v1.0.1", first, 5_000);
        upstream.annotated_tag("v1.0.0", second, 5_000);

        let (_dir, tree) = clone(&upstream);
        let resolved = tree.resolve(&Reference::LatestRelease).unwrap();

        assert_eq!(resolved.tag, "v1.0.1");
        assert_eq!(tree.head_id(), first);
    }

    #[test]
    fn latest_release_without_tags_is_a_build_error() {
        let upstream = Upstream::new();
        upstream.commit(Some("HEAD"), "package main", 1_000);

        let (_dir, tree) = clone(&upstream);
        let err = tree.resolve(&Reference::LatestRelease).unwrap_err();
        assert!(matches!(err, BenchError::Build { .. }));
    }

    #[test]
    fn version_tag_checks_out_the_tag() {
        let upstream = Upstream::new();
        let tagged = upstream.commit(Some("HEAD"), "package main // 1", 1_000);
        upstream.commit(Some("HEAD"), "package main // 2", 2_000);
        upstream.annotated_tag("v2.0.0-beta.2", tagged, 3_000);

        let (_dir, tree) = clone(&upstream);
        let resolved = tree
            .resolve(&Reference::parse("v2.0.0-beta.2"))
            .unwrap();

        assert_eq!(resolved.tag, "v2.0.0-beta.2");
        assert_eq!(resolved.label, "version:v2.0.0-beta.2");
        assert_eq!(tree.head_id(), tagged);
        let content = fs::read_to_string(tree.path().join("main.go")).unwrap();
        assert_eq!(content, "package main // 1");
    }

    #[test]
    fn missing_version_tag_is_a_build_error() {
        let upstream = Upstream::new();
        upstream.commit(Some("HEAD"), "package main", 1_000);

        let (_dir, tree) = clone(&upstream);
        let err = tree.resolve(&Reference::parse("v9.9.9")).unwrap_err();
        match err {
            BenchError::Build { reference, .. } => assert_eq!(reference, "v9.9.9"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn pull_request_is_fetched_from_origin() {
        let upstream = Upstream::new();
        upstream.commit(Some("HEAD"), "package main // 1", 1_000);
        // A commit only reachable through the pull request ref.
        let pr_head = upstream.commit(Some("refs/pull/478/head"), "package main // pr", 2_000);

        let (_dir, tree) = clone(&upstream);
        let resolved = tree.resolve(&Reference::parse("478")).unwrap();

        assert_eq!(resolved.tag, "478");
        assert_eq!(resolved.label, "PR:478");
        assert_eq!(tree.head_id(), pr_head);
    }

    #[test]
    fn commit_checks_out_literal_revision() {
        let upstream = Upstream::new();
        let first = upstream.commit(Some("HEAD"), "package main // 1", 1_000);
        upstream.commit(Some("HEAD"), "package main // 2", 2_000);

        let (_dir, tree) = clone(&upstream);
        let short = &first.to_string()[..10];
        let resolved = tree.resolve(&Reference::parse(short)).unwrap();

        assert_eq!(resolved.tag, short);
        assert_eq!(resolved.label, format!("commit{}", short));
        assert_eq!(tree.head_id(), first);
    }

    #[test]
    fn remote_only_branch_resolves_by_bare_name() {
        let upstream = Upstream::new();
        upstream.commit(Some("HEAD"), "package main // 1", 1_000);
        let branch_tip =
            upstream.commit(Some("refs/heads/feature-x"), "package main // feature", 2_000);

        let (_dir, tree) = clone(&upstream);
        let resolved = tree.resolve(&Reference::parse("feature-x")).unwrap();

        assert_eq!(resolved.tag, "feature-x");
        assert_eq!(resolved.label, "commitfeature-x");
        assert_eq!(tree.head_id(), branch_tip);
        let content = fs::read_to_string(tree.path().join("main.go")).unwrap();
        assert_eq!(content, "package main // feature");
    }

    #[test]
    fn unknown_commit_is_a_build_error() {
        let upstream = Upstream::new();
        upstream.commit(Some("HEAD"), "package main", 1_000);

        let (_dir, tree) = clone(&upstream);
        assert!(matches!(
            tree.resolve(&Reference::parse("no-such-branch")),
            Err(BenchError::Build { .. })
        ));
    }

    #[test]
    fn clone_failure_is_a_build_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");
        let result = SourceTree::clone_from(
            &missing.to_string_lossy(),
            &dir.path().join("s5cmd"),
        );
        assert!(matches!(result, Err(BenchError::Build { .. })));
    }
}
