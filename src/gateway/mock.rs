use super::*;
use anyhow::anyhow;
use git2::RepositoryInitOptions;
use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::constants::{fill, DEFAULT_BRANCH, ERROR_CONTAINER_EXISTS, ERROR_REPO_NOT_ON_HOST};
use crate::vcs;

/// In-memory repository host for testing
///
/// Clones are materialised on disk so that the orchestrator's filesystem
/// checks see real directories. Cloning the mock shares its state, so a test
/// can keep a handle while the orchestrator owns another.
#[derive(Clone, Default)]
pub struct MockGateway {
    state: Arc<Mutex<MockState>>,
}

#[derive(Debug, Default)]
struct MockState {
    repos: BTreeMap<String, Vec<String>>,
    calls: MockCalls,
    disposable_paths: Vec<PathBuf>,
    pushes: Vec<PushRecord>,
    exists_answers: VecDeque<bool>,
    unreachable: bool,
    push_failure: Option<String>,
    clone_failure: Option<String>,
    discard_failure: Option<String>,
}

/// Number of times each gateway operation was invoked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MockCalls {
    pub exists: usize,
    pub list_all: usize,
    pub clone_durable: usize,
    pub clone_disposable: usize,
    pub discard: usize,
    pub create_container: usize,
    pub attach_remote_and_push: usize,
    pub push: usize,
}

/// A push accepted by the mock host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushRecord {
    pub local_path: PathBuf,
    pub remote_path: Option<String>,
    pub remote_name: String,
    pub branch: String,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty repository to the host
    pub fn with_repo(self, remote_path: &str) -> Self {
        self.with_repo_files(remote_path, &[])
    }

    /// Adds a repository whose clones contain `files`; entries ending in `/` are directories
    pub fn with_repo_files(self, remote_path: &str, files: &[&str]) -> Self {
        self.state().repos.insert(
            remote_path.to_string(),
            files.iter().map(|f| f.to_string()).collect(),
        );
        self
    }

    /// Makes every operation fail as if the host could not be reached
    pub fn with_unreachable_host(self) -> Self {
        self.state().unreachable = true;
        self
    }

    /// Makes pushes fail with `message`
    pub fn with_push_failure(self, message: &str) -> Self {
        self.state().push_failure = Some(message.to_string());
        self
    }

    /// Makes disposable clones fail with `message` once their scratch
    /// directory has been allocated
    pub fn with_clone_failure(self, message: &str) -> Self {
        self.state().clone_failure = Some(message.to_string());
        self
    }

    /// Makes `discard` remove the clone but still report `message`
    pub fn with_discard_failure(self, message: &str) -> Self {
        self.state().discard_failure = Some(message.to_string());
        self
    }

    /// Scripts the next answers of `exists`, e.g. to simulate a repository
    /// deleted by someone else between two checks
    pub fn with_exists_answers(self, answers: &[bool]) -> Self {
        self.state().exists_answers.extend(answers.iter().copied());
        self
    }

    /// Adds or removes a repository after construction, e.g. to simulate another user
    pub fn set_repo_exists(&self, remote_path: &str, exists: bool) {
        let mut state = self.state();
        if exists {
            state.repos.entry(remote_path.to_string()).or_default();
        } else {
            state.repos.remove(remote_path);
        }
    }

    pub fn calls(&self) -> MockCalls {
        self.state().calls
    }

    pub fn pushes(&self) -> Vec<PushRecord> {
        self.state().pushes.clone()
    }

    /// Paths of every disposable clone handed out so far
    pub fn disposable_paths(&self) -> Vec<PathBuf> {
        self.state().disposable_paths.clone()
    }

    pub fn repo_exists(&self, remote_path: &str) -> bool {
        self.state().repos.contains_key(remote_path)
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_reachable(state: &MockState) -> Result<()> {
        if state.unreachable {
            return Err(anyhow!("mock host unreachable"));
        }
        Ok(())
    }

    fn files_of(&self, remote_path: &str) -> Result<Vec<String>> {
        self.state()
            .repos
            .get(remote_path)
            .cloned()
            .ok_or_else(|| anyhow!(fill(ERROR_REPO_NOT_ON_HOST, &[remote_path])))
    }

    fn mock_url(remote_path: &str) -> String {
        format!("mock://{remote_path}")
    }
}

fn materialise(root: &Path, files: &[String]) -> Result<()> {
    for file in files {
        let target = root.join(file.trim_end_matches('/'));
        if file.ends_with('/') {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, file.as_bytes())?;
        }
    }
    Ok(())
}

impl RepositoryGateway for MockGateway {
    fn exists(&self, remote_path: &str) -> Result<bool> {
        let mut state = self.state();
        state.calls.exists += 1;
        Self::check_reachable(&state)?;
        if let Some(answer) = state.exists_answers.pop_front() {
            return Ok(answer);
        }
        Ok(state.repos.contains_key(remote_path))
    }

    fn list_all(&self) -> Result<Vec<String>> {
        let mut state = self.state();
        state.calls.list_all += 1;
        Self::check_reachable(&state)?;
        Ok(state.repos.keys().cloned().collect())
    }

    fn clone_durable(&self, remote_path: &str, local_path: &Path) -> Result<Repository> {
        {
            let mut state = self.state();
            state.calls.clone_durable += 1;
            Self::check_reachable(&state)?;
        }
        let files = self.files_of(remote_path)?;

        fs::create_dir_all(local_path)?;
        materialise(local_path, &files)?;

        let mut opts = RepositoryInitOptions::new();
        opts.initial_head(DEFAULT_BRANCH);
        let repo = Repository::init_opts(local_path, &opts)?;
        vcs::stage_all_files_and_commit(local_path, "Seed")?;
        repo.remote("origin", &Self::mock_url(remote_path))?;
        Ok(repo)
    }

    fn clone_disposable(&self, remote_path: &str) -> Result<DisposableClone> {
        {
            let mut state = self.state();
            state.calls.clone_disposable += 1;
            Self::check_reachable(&state)?;
        }
        let files = self.files_of(remote_path)?;

        let clone = DisposableClone::allocate()?;
        let failure = {
            let mut state = self.state();
            state.disposable_paths.push(clone.path().to_path_buf());
            state.clone_failure.clone()
        };
        if let Some(message) = failure {
            return Err(anyhow!(message));
        }
        materialise(clone.path(), &files)?;
        Ok(clone)
    }

    fn discard(&self, clone: DisposableClone) -> Result<()> {
        let failure = {
            let mut state = self.state();
            state.calls.discard += 1;
            state.discard_failure.clone()
        };
        clone.discard()?;
        match failure {
            Some(message) => Err(anyhow!(message)),
            None => Ok(()),
        }
    }

    fn create_container(&self, remote_path: &str) -> Result<()> {
        let mut state = self.state();
        state.calls.create_container += 1;
        Self::check_reachable(&state)?;
        if state.repos.contains_key(remote_path) {
            return Err(anyhow!(fill(ERROR_CONTAINER_EXISTS, &[remote_path])));
        }
        state.repos.insert(remote_path.to_string(), Vec::new());
        Ok(())
    }

    fn attach_remote_and_push(
        &self,
        local_path: &Path,
        remote_path: &str,
        remote_name: &str,
        branch: &str,
    ) -> Result<()> {
        let mut state = self.state();
        state.calls.attach_remote_and_push += 1;
        Self::check_reachable(&state)?;
        if let Some(message) = &state.push_failure {
            return Err(anyhow!(message.clone()));
        }
        if !state.repos.contains_key(remote_path) {
            return Err(anyhow!(fill(ERROR_REPO_NOT_ON_HOST, &[remote_path])));
        }

        let repo = Repository::open(local_path)?;
        repo.remote(remote_name, &Self::mock_url(remote_path))?;

        state.pushes.push(PushRecord {
            local_path: local_path.to_path_buf(),
            remote_path: Some(remote_path.to_string()),
            remote_name: remote_name.to_string(),
            branch: branch.to_string(),
        });
        Ok(())
    }

    fn push(&self, local_path: &Path, remote_name: &str, branch: &str) -> Result<()> {
        let mut state = self.state();
        state.calls.push += 1;
        Self::check_reachable(&state)?;
        if let Some(message) = &state.push_failure {
            return Err(anyhow!(message.clone()));
        }

        let repo = Repository::open(local_path)?;
        let remote = repo.find_remote(remote_name)?;
        let remote_path = remote
            .url()
            .and_then(|url| url.strip_prefix("mock://"))
            .map(str::to_string);

        state.pushes.push(PushRecord {
            local_path: local_path.to_path_buf(),
            remote_path,
            remote_name: remote_name.to_string(),
            branch: branch.to_string(),
        });
        Ok(())
    }
}
