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
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

/// Local staging directory plus the remote path that mirrors it.
///
/// Both share one unique suffix, so concurrent benchmark runs against the
/// same bucket never touch each other's objects.
#[derive(Debug, Clone)]
pub struct Workspace {
    local_dir: PathBuf,
    remote_path: String,
}

impl Workspace {
    /// Create `<local_path>/bench_<timestamp>` when `local_path` is given,
    /// otherwise a fresh `<prefix>XXXXXX` directory under the system temp dir.
    pub fn create(bucket: &str, prefix: &str, local_path: Option<&Path>) -> Result<Self> {
        if bucket.is_empty() {
            return Err(BenchError::config("a bucket name is required"));
        }

        let (local_dir, suffix) = match local_path {
            Some(parent) => {
                if !parent.is_dir() {
                    return Err(BenchError::config(format!(
                        "local path is not a directory: {}",
                        parent.display()
                    )));
                }
                let suffix = Local::now().format("%y%m%d_%H%M%S").to_string();
                let dir = parent.join(format!("bench_{}", suffix));
                fs::create_dir(&dir).map_err(|e| BenchError::io_at("create", &dir, e))?;
                (dir, suffix)
            }
            None => {
                let dir = tempfile::Builder::new()
                    .prefix(prefix)
                    .tempdir()
                    .map_err(|e| BenchError::io("Failed to create temporary directory", e))?
                    .keep();
                let suffix = dir
                    .file_name()
                    .map(|name| name.to_string_lossy())
                    .and_then(|name| name.strip_prefix(prefix).map(str::to_string))
                    .unwrap_or_default();
                (dir, suffix)
            }
        };

        let remote_path = format!("s3://{}/{}/{}", bucket, prefix, suffix);

        log::info!(
            "All the local temporary files will be created at {}",
            local_dir.display()
        );
        log::info!("All the remote files will be uploaded to {}", remote_path);

        Ok(Self {
            local_dir,
            remote_path,
        })
    }

    pub fn local_dir(&self) -> &Path {
        &self.local_dir
    }

    pub fn remote_path(&self) -> &str {
        &self.remote_path
    }

    /// Recursively delete the local staging directory.
    pub fn cleanup(&self) -> Result<()> {
        match fs::remove_dir_all(&self.local_dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BenchError::io_at("remove", &self.local_dir, e)),
        }
    }
}
