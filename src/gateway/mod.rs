//! Repository host abstraction
//!
//! The orchestrator never talks to the repository host directly. It goes
//! through [`RepositoryGateway`], which has a production implementation for
//! gitolite over SSH, one for a directory of bare repositories, and an
//! in-memory mock for tests.

use anyhow::{Context, Result};
use git2::Repository;
use std::io;
use std::path::Path;
use tempfile::TempDir;

use crate::area::Area;
use crate::constants::{fill, DISPOSABLE_CLONE_PREFIX, WARN_DISCARD_FAILED};

pub mod gitolite;
pub mod local;
pub mod mock;

pub use gitolite::GitoliteGateway;
pub use local::LocalGateway;
pub use mock::{MockGateway, PushRecord};

/// Capability to query, clone and push repositories on a shared host
///
/// Remote paths are host-relative, e.g. `controls/support/motor`.
pub trait RepositoryGateway: Send {
    /// Whether a repository exists at `remote_path`
    fn exists(&self, remote_path: &str) -> Result<bool>;

    /// Every repository path on the host
    fn list_all(&self) -> Result<Vec<String>>;

    /// Clones `remote_path` into `local_path`, which must not exist yet
    fn clone_durable(&self, remote_path: &str, local_path: &Path) -> Result<Repository>;

    /// Clones `remote_path` into a fresh scratch directory
    fn clone_disposable(&self, remote_path: &str) -> Result<DisposableClone>;

    /// Removes a disposable clone from disk
    fn discard(&self, clone: DisposableClone) -> Result<()> {
        clone.discard()
    }

    /// Creates an empty repository at `remote_path`; fails if it already exists
    fn create_container(&self, remote_path: &str) -> Result<()>;

    /// Adds `remote_name` pointing at `remote_path` to the local repository and pushes `branch`
    fn attach_remote_and_push(
        &self,
        local_path: &Path,
        remote_path: &str,
        remote_name: &str,
        branch: &str,
    ) -> Result<()>;

    /// Pushes `branch` over the remote alias the local repository already carries
    fn push(&self, local_path: &Path, remote_name: &str, branch: &str) -> Result<()>;
}

/// A scratch clone that is removed from disk when discarded or dropped
///
/// Prefer [`RepositoryGateway::discard`] so removal failures can be
/// reported; dropping without discarding logs the failure instead.
#[derive(Debug)]
pub struct DisposableClone {
    dir: Option<TempDir>,
}

impl DisposableClone {
    /// Allocates an empty scratch directory to clone into
    pub fn allocate() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(DISPOSABLE_CLONE_PREFIX)
            .tempdir()
            .context("Failed to create scratch directory")?;
        Ok(Self { dir: Some(dir) })
    }

    /// Working tree of the clone
    pub fn path(&self) -> &Path {
        match &self.dir {
            Some(dir) => dir.path(),
            None => Path::new(""),
        }
    }

    pub fn discard(mut self) -> Result<()> {
        match self.dir.take() {
            Some(dir) => {
                let path = dir.path().to_path_buf();
                close_dir(dir)
                    .with_context(|| format!("Failed to remove {}", path.display()))
            }
            None => Ok(()),
        }
    }
}

impl Drop for DisposableClone {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            let path = dir.path().display().to_string();
            if let Err(e) = close_dir(dir) {
                tracing::warn!("{}", fill(WARN_DISCARD_FAILED, &[&path, &e.to_string()]));
            }
        }
    }
}

fn close_dir(dir: TempDir) -> io::Result<()> {
    match dir.close() {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Module paths under `<root_dir>/<area>/`, with that prefix removed, sorted
pub fn list_area_modules(
    gateway: &dyn RepositoryGateway,
    root_dir: &str,
    area: Area,
) -> Result<Vec<String>> {
    let prefix = format!("{}/", area.area_root(root_dir));
    let mut modules: Vec<String> = gateway
        .list_all()?
        .into_iter()
        .filter_map(|path| path.strip_prefix(&prefix).map(str::to_string))
        .filter(|module| !module.is_empty())
        .collect();
    modules.sort();
    modules.dedup();
    Ok(modules)
}
