//! Local repository operations
//!
//! Local inspection and commits go through `git2`; operations that talk to a
//! remote (clone, push) shell out to the `git` command so that the user's SSH
//! configuration and credential helpers apply unchanged.

use anyhow::{anyhow, Context, Result};
use git2::{IndexAddOption, Oid, Repository, RepositoryInitOptions, Signature};
use std::path::Path;
use std::process::Command;

use crate::constants::{
    fill, DEFAULT_EMAIL_DOMAIN, ERROR_ALREADY_A_REPOSITORY, ERROR_BRANCH_MISSING,
    ERROR_GIT_FAILED, ERROR_NOT_A_DIRECTORY, ERROR_NOT_A_REPOSITORY, ERROR_REMOTE_ALREADY_DEFINED,
    ERROR_REMOTE_MISSING, GIT_CLONE, GIT_CMD, GIT_PUSH, GIT_QUIET, PROGRESS_ADDING_REMOTE,
    PROGRESS_COMMITTING, PROGRESS_INITIALISING, PROGRESS_NOTHING_TO_COMMIT, PROGRESS_PUSHING,
    PROGRESS_STAGING, STAGE_ALL_PATHSPEC,
};
use crate::module::user_login;

/// Returns whether `path` is inside a git working tree or repository
///
/// # Errors
///
/// Returns an error if `path` is not a directory.
pub fn is_in_local_repo(path: &Path) -> Result<bool> {
    if !path.is_dir() {
        return Err(anyhow!(fill(ERROR_NOT_A_DIRECTORY, &[&path.display().to_string()])));
    }
    Ok(Repository::discover(path).is_ok())
}

/// Returns whether `path` is the top level of a git working tree
pub fn is_local_repo_root(path: &Path) -> bool {
    let Ok(repo) = Repository::open(path) else {
        return false;
    };
    let Some(workdir) = repo.workdir() else {
        return false;
    };

    match (workdir.canonicalize(), path.canonicalize()) {
        (Ok(workdir), Ok(path)) => workdir == path,
        _ => false,
    }
}

fn open_repo_root(path: &Path) -> Result<Repository> {
    if !is_local_repo_root(path) {
        return Err(anyhow!(fill(ERROR_NOT_A_REPOSITORY, &[&path.display().to_string()])));
    }
    Repository::open(path).context("Failed to open git repository")
}

/// Initialises a new repository whose unborn HEAD points at `branch`
pub fn init_repo(path: &Path, branch: &str) -> Result<Repository> {
    let display = path.display().to_string();
    if !path.is_dir() {
        return Err(anyhow!(fill(ERROR_NOT_A_DIRECTORY, &[&display])));
    }
    if is_local_repo_root(path) {
        return Err(anyhow!(fill(ERROR_ALREADY_A_REPOSITORY, &[&display])));
    }

    tracing::info!("{}", PROGRESS_INITIALISING);
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head(branch);
    Repository::init_opts(path, &opts).with_context(|| format!("Failed to initialise {display}"))
}

/// Stages every file in the working tree and commits it
///
/// # Returns
///
/// * `Ok(Some(oid))` - The new commit
/// * `Ok(None)` - Nothing changed relative to HEAD, no commit was made
pub fn stage_all_files_and_commit(path: &Path, message: &str) -> Result<Option<Oid>> {
    let repo = open_repo_root(path)?;

    tracing::info!("{}", PROGRESS_STAGING);
    let mut index = repo.index()?;
    index.add_all([STAGE_ALL_PATHSPEC], IndexAddOption::DEFAULT, None)?;
    index.write()?;
    let tree_id = index.write_tree()?;

    let parent = match repo.head() {
        Ok(head) => Some(head.peel_to_commit()?),
        Err(_) => None,
    };

    let unchanged = match &parent {
        Some(commit) => commit.tree_id() == tree_id,
        None => index.is_empty(),
    };
    if unchanged {
        tracing::info!("{}", fill(PROGRESS_NOTHING_TO_COMMIT, &[&path.display().to_string()]));
        return Ok(None);
    }

    tracing::info!("{}", PROGRESS_COMMITTING);
    let tree = repo.find_tree(tree_id)?;
    let signature = commit_signature(&repo)?;
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    let oid = repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;

    Ok(Some(oid))
}

/// Configured git identity, or the login name when none is configured
fn commit_signature(repo: &Repository) -> Result<Signature<'static>> {
    if let Ok(signature) = repo.signature() {
        return Ok(signature);
    }
    let login = user_login();
    Ok(Signature::now(&login, &format!("{login}@{DEFAULT_EMAIL_DOMAIN}"))?)
}

pub fn branch_exists(repo: &Repository, branch: &str) -> bool {
    repo.find_branch(branch, git2::BranchType::Local).is_ok()
}

pub fn remote_exists(repo: &Repository, remote: &str) -> bool {
    repo.find_remote(remote).is_ok()
}

/// Checks that `remote` can be added to the repository at `path` and `branch` pushed
///
/// # Errors
///
/// Fails if `path` is not a repository root, the branch does not exist
/// or the remote alias is already defined.
pub fn check_can_attach(path: &Path, remote: &str, branch: &str) -> Result<()> {
    let repo = open_repo_root(path)?;
    if !branch_exists(&repo, branch) {
        return Err(anyhow!(fill(ERROR_BRANCH_MISSING, &[branch])));
    }
    if remote_exists(&repo, remote) {
        return Err(anyhow!(fill(ERROR_REMOTE_ALREADY_DEFINED, &[remote])));
    }
    Ok(())
}

/// Adds `remote` pointing at `url` and pushes `branch` to it
///
/// # Errors
///
/// Fails if `path` is not a repository root, the branch does not exist
/// or the remote alias is already defined.
pub fn add_remote_and_push(path: &Path, remote: &str, url: &str, branch: &str) -> Result<()> {
    check_can_attach(path, remote, branch)?;
    let repo = open_repo_root(path)?;

    tracing::info!("{}", PROGRESS_ADDING_REMOTE);
    repo.remote(remote, url)
        .with_context(|| format!("Failed to add remote {remote}"))?;

    push_branch(path, remote, branch)
}

/// Pushes `branch` to an already configured remote
pub fn push_to_remote(path: &Path, remote: &str, branch: &str) -> Result<()> {
    let repo = open_repo_root(path)?;
    if !branch_exists(&repo, branch) {
        return Err(anyhow!(fill(ERROR_BRANCH_MISSING, &[branch])));
    }
    if !remote_exists(&repo, remote) {
        return Err(anyhow!(fill(ERROR_REMOTE_MISSING, &[remote])));
    }

    push_branch(path, remote, branch)
}

fn push_branch(path: &Path, remote: &str, branch: &str) -> Result<()> {
    tracing::info!("{}", PROGRESS_PUSHING);
    run_git(&[GIT_PUSH, GIT_QUIET, remote, branch], path)?;
    Ok(())
}

/// Clones `url` into `dest`, which must be absent or an empty directory
pub fn clone_into(url: &str, dest: &Path) -> Result<Repository> {
    let cwd = dest
        .parent()
        .filter(|parent| parent.is_dir())
        .unwrap_or_else(|| Path::new("."));
    let dest_str = dest
        .to_str()
        .ok_or_else(|| anyhow!("Invalid path: {}", dest.display()))?;

    run_git(&[GIT_CLONE, GIT_QUIET, url, dest_str], cwd)?;
    Repository::open(dest).with_context(|| format!("Failed to open clone at {dest_str}"))
}

/// URL configured for `remote` in the repository at `path`
pub fn remote_url(path: &Path, remote: &str) -> Result<String> {
    let repo = open_repo_root(path)?;
    let remote = repo
        .find_remote(remote)
        .map_err(|_| anyhow!(fill(ERROR_REMOTE_MISSING, &[remote])))?;
    remote
        .url()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Remote has no URL"))
}

/// Executes a git command in `cwd` and returns its stdout
pub fn run_git(args: &[&str], cwd: &Path) -> Result<String> {
    tracing::debug!(?args, cwd = %cwd.display(), "running git");
    let output = Command::new(GIT_CMD)
        .args(args)
        .current_dir(cwd)
        .output()
        .context("Failed to execute git command")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!(fill(ERROR_GIT_FAILED, &[stderr.trim()])));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
