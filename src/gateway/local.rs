use super::*;
use anyhow::anyhow;
use git2::RepositoryInitOptions;
use std::fs;
use std::path::PathBuf;

use crate::area::join_remote;
use crate::constants::{
    fill, ERROR_CONTAINER_EXISTS, ERROR_LOCAL_PATH_EXISTS, ERROR_REPO_NOT_ON_HOST, MAX_HOST_DEPTH,
    PROGRESS_CREATING_REMOTE,
};
use crate::vcs;

/// Repository host backed by a directory of bare repositories
///
/// A repository at remote path `controls/support/motor` lives in
/// `<root>/controls/support/motor`. Suitable for hosts shared over a network
/// filesystem, and for exercising the orchestrator against real git.
#[derive(Debug, Clone)]
pub struct LocalGateway {
    root: PathBuf,
    default_branch: String,
}

impl LocalGateway {
    pub fn new(root: impl Into<PathBuf>, default_branch: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            default_branch: default_branch.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the bare repository for `remote_path`
    pub fn repo_dir(&self, remote_path: &str) -> PathBuf {
        self.root.join(join_remote(&[remote_path]))
    }

    fn url_for(&self, remote_path: &str) -> Result<String> {
        self.repo_dir(remote_path)
            .to_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("Invalid host path for {remote_path}"))
    }

    fn require_exists(&self, remote_path: &str) -> Result<()> {
        if !self.exists(remote_path)? {
            return Err(anyhow!(fill(ERROR_REPO_NOT_ON_HOST, &[remote_path])));
        }
        Ok(())
    }

    fn collect_repos(&self, dir: &Path, depth: usize, found: &mut Vec<String>) -> Result<()> {
        if depth > MAX_HOST_DEPTH {
            return Ok(());
        }

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            if Repository::open_bare(&path).is_ok() {
                if let Ok(relative) = path.strip_prefix(&self.root) {
                    let segments: Vec<String> = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy().to_string())
                        .collect();
                    found.push(segments.join("/"));
                }
            } else {
                self.collect_repos(&path, depth + 1, found)?;
            }
        }
        Ok(())
    }
}

impl RepositoryGateway for LocalGateway {
    fn exists(&self, remote_path: &str) -> Result<bool> {
        let dir = self.repo_dir(remote_path);
        Ok(dir.is_dir() && Repository::open_bare(&dir).is_ok())
    }

    fn list_all(&self) -> Result<Vec<String>> {
        let mut found = Vec::new();
        if self.root.is_dir() {
            self.collect_repos(&self.root, 0, &mut found)?;
        }
        found.sort();
        Ok(found)
    }

    fn clone_durable(&self, remote_path: &str, local_path: &Path) -> Result<Repository> {
        self.require_exists(remote_path)?;
        if local_path.exists() {
            return Err(anyhow!(fill(
                ERROR_LOCAL_PATH_EXISTS,
                &[&local_path.display().to_string()]
            )));
        }
        vcs::clone_into(&self.url_for(remote_path)?, local_path)
    }

    fn clone_disposable(&self, remote_path: &str) -> Result<DisposableClone> {
        self.require_exists(remote_path)?;
        let clone = DisposableClone::allocate()?;
        vcs::clone_into(&self.url_for(remote_path)?, clone.path())?;
        Ok(clone)
    }

    fn create_container(&self, remote_path: &str) -> Result<()> {
        if self.exists(remote_path)? {
            return Err(anyhow!(fill(ERROR_CONTAINER_EXISTS, &[remote_path])));
        }

        tracing::info!("{}", PROGRESS_CREATING_REMOTE);
        let dir = self.repo_dir(remote_path);
        fs::create_dir_all(&dir)?;
        let mut opts = RepositoryInitOptions::new();
        opts.bare(true).initial_head(&self.default_branch);
        Repository::init_opts(&dir, &opts)
            .with_context(|| format!("Failed to create {remote_path}"))?;
        Ok(())
    }

    fn attach_remote_and_push(
        &self,
        local_path: &Path,
        remote_path: &str,
        remote_name: &str,
        branch: &str,
    ) -> Result<()> {
        self.require_exists(remote_path)?;
        vcs::add_remote_and_push(local_path, remote_name, &self.url_for(remote_path)?, branch)
    }

    fn push(&self, local_path: &Path, remote_name: &str, branch: &str) -> Result<()> {
        vcs::push_to_remote(local_path, remote_name, branch)
    }
}
