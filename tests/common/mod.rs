//! Shared setup for integration tests

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use git2::{ObjectType, Repository, TreeWalkMode, TreeWalkResult};
use module_creator::area::Area;
use module_creator::config::{Config, ServerKind};
use module_creator::content::TemplateContent;
use module_creator::creator::ModuleCreator;
use module_creator::error::CreatorResult;
use module_creator::gateway::{LocalGateway, MockGateway};
use module_creator::module::CreationRequest;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A directory of bare repositories acting as the host, plus a working directory
pub struct TestHost {
    _dir: TempDir,
    host: PathBuf,
    work: PathBuf,
}

impl TestHost {
    pub fn new() -> Result<Self> {
        let dir = TempDir::new()?;
        let host = dir.path().join("host");
        let work = dir.path().join("work");
        fs::create_dir_all(&host)?;
        fs::create_dir_all(&work)?;
        Ok(Self {
            _dir: dir,
            host,
            work,
        })
    }

    pub fn host_path(&self) -> &Path {
        &self.host
    }

    pub fn work_dir(&self) -> &Path {
        &self.work
    }

    pub fn gateway(&self) -> LocalGateway {
        LocalGateway::new(&self.host, "master")
    }

    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.server.kind = ServerKind::Local;
        config.server.path = Some(self.host.clone());
        config
    }

    /// Contents of a config file pointing at this host
    pub fn config_toml(&self) -> String {
        format!(
            "[server]\nkind = \"local\"\npath = \"{}\"\n",
            self.host.display()
        )
    }

    /// Creates and pushes a module through the creator from a scratch directory
    pub fn seed_module(&self, module_path: &str, area: Area) -> Result<()> {
        let scratch = TempDir::new()?;
        let request = CreationRequest::new(module_path, area).in_directory(scratch.path());
        let mut creator = ModuleCreator::new_module(
            &request,
            &self.config(),
            Box::new(self.gateway()),
            Box::new(TemplateContent::default_module()),
        )?;
        creator.create_local_module()?;
        creator.push_repo_to_remote()?;
        Ok(())
    }

    /// Files on the host's `master` branch of `remote_path`, sorted
    pub fn remote_files(&self, remote_path: &str) -> Result<Vec<String>> {
        let repo = Repository::open_bare(self.gateway().repo_dir(remote_path))?;
        let commit = repo
            .find_reference("refs/heads/master")?
            .peel_to_commit()?;

        let mut files = Vec::new();
        commit.tree()?.walk(TreeWalkMode::PreOrder, |dir, entry| {
            if entry.kind() == Some(ObjectType::Blob) {
                files.push(format!("{dir}{}", entry.name().unwrap_or_default()));
            }
            TreeWalkResult::Ok
        })?;
        files.sort();
        Ok(files)
    }

    /// Commit messages on the host's `master` branch, newest first
    pub fn remote_log(&self, remote_path: &str) -> Result<Vec<String>> {
        let repo = Repository::open_bare(self.gateway().repo_dir(remote_path))?;
        let mut walk = repo.revwalk()?;
        walk.push_ref("refs/heads/master")?;
        walk.map(|oid| -> Result<String> {
            let commit = repo.find_commit(oid?)?;
            commit
                .message()
                .map(|m| m.trim_end().to_string())
                .ok_or_else(|| anyhow!("commit message is not UTF-8"))
        })
        .collect()
    }
}

/// Creator for a new `support` module resolved against `dir`
pub fn new_module_creator(
    dir: &Path,
    module_path: &str,
    gateway: &MockGateway,
) -> CreatorResult<ModuleCreator> {
    let request = CreationRequest::new(module_path, Area::Support).in_directory(dir);
    ModuleCreator::new_module(
        &request,
        &Config::default(),
        Box::new(gateway.clone()),
        Box::new(TemplateContent::default_module()),
    )
}

/// Creator adding `app_name` to a `support` module resolved against `dir`
pub fn add_app_creator(
    dir: &Path,
    module_path: &str,
    app_name: &str,
    gateway: &MockGateway,
) -> CreatorResult<ModuleCreator> {
    let request = CreationRequest::new(module_path, Area::Support)
        .with_app_name(app_name)
        .in_directory(dir);
    ModuleCreator::add_app(
        &request,
        &Config::default(),
        Box::new(gateway.clone()),
        Box::new(TemplateContent::default_app()),
    )
}

/// Message of the commit at HEAD of the local repository at `path`
pub fn head_message(path: &Path) -> Result<String> {
    let repo = Repository::open(path)?;
    let commit = repo.head()?.peel_to_commit()?;
    Ok(commit.message().unwrap_or_default().trim_end().to_string())
}
