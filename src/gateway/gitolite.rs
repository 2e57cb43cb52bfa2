use super::*;
use anyhow::anyhow;
use std::process::Command;

use crate::area::join_remote;
use crate::constants::{
    fill, ERROR_CONTAINER_EXISTS, ERROR_LOCAL_PATH_EXISTS, ERROR_REPO_NOT_ON_HOST,
    ERROR_SSH_FAILED, GITOLITE_EXPAND, GIT_SSH_SCHEME, PROGRESS_CREATING_REMOTE, SSH_CMD,
};
use crate::vcs;

/// Repository host reached over SSH with gitolite wild repositories
///
/// Repositories are listed with `ssh <host> expand <root_dir>` and created
/// by cloning a path that does not exist yet, which gitolite answers by
/// creating it.
#[derive(Debug, Clone)]
pub struct GitoliteGateway {
    host: String,
    root_dir: String,
}

impl GitoliteGateway {
    pub fn new(host: impl Into<String>, root_dir: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            root_dir: root_dir.into(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// `ssh://<host>/` prefix of every repository URL
    pub fn ssh_root(&self) -> String {
        format!("{GIT_SSH_SCHEME}{}/", self.host)
    }

    pub fn url_for(&self, remote_path: &str) -> String {
        format!("{}{}", self.ssh_root(), join_remote(&[remote_path]))
    }

    /// Host path of a remote URL, if the URL points at this host
    pub fn remote_path_of(&self, url: &str) -> Option<String> {
        url.strip_prefix(&self.ssh_root()).map(str::to_string)
    }

    fn require_exists(&self, remote_path: &str) -> Result<()> {
        if !self.exists(remote_path)? {
            return Err(anyhow!(fill(ERROR_REPO_NOT_ON_HOST, &[remote_path])));
        }
        Ok(())
    }
}

/// Extracts repository paths from `expand` output
///
/// The output is a heading followed by lines such as
/// `R   W  (alan.greer)  controls/support/ADAndor`; every token containing
/// a `/` is a repository path.
pub fn parse_expand_output(output: &str) -> Vec<String> {
    output
        .split_whitespace()
        .filter(|token| token.contains('/'))
        .map(str::to_string)
        .collect()
}

impl RepositoryGateway for GitoliteGateway {
    fn exists(&self, remote_path: &str) -> Result<bool> {
        let wanted = join_remote(&[remote_path]);
        Ok(self.list_all()?.iter().any(|path| *path == wanted))
    }

    fn list_all(&self) -> Result<Vec<String>> {
        tracing::debug!(host = %self.host, root = %self.root_dir, "listing repositories");
        let output = Command::new(SSH_CMD)
            .args([self.host.as_str(), GITOLITE_EXPAND, self.root_dir.as_str()])
            .output()
            .with_context(|| format!("Failed to execute {SSH_CMD}"))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(fill(ERROR_SSH_FAILED, &[&self.host, stderr.trim()])));
        }

        Ok(parse_expand_output(&String::from_utf8_lossy(&output.stdout)))
    }

    fn clone_durable(&self, remote_path: &str, local_path: &Path) -> Result<Repository> {
        if local_path.exists() {
            return Err(anyhow!(fill(
                ERROR_LOCAL_PATH_EXISTS,
                &[&local_path.display().to_string()]
            )));
        }
        self.require_exists(remote_path)?;
        vcs::clone_into(&self.url_for(remote_path), local_path)
    }

    fn clone_disposable(&self, remote_path: &str) -> Result<DisposableClone> {
        self.require_exists(remote_path)?;
        let clone = DisposableClone::allocate()?;
        vcs::clone_into(&self.url_for(remote_path), clone.path())?;
        Ok(clone)
    }

    fn create_container(&self, remote_path: &str) -> Result<()> {
        if self.exists(remote_path)? {
            return Err(anyhow!(fill(ERROR_CONTAINER_EXISTS, &[remote_path])));
        }

        tracing::info!("{}", PROGRESS_CREATING_REMOTE);
        let scratch = DisposableClone::allocate()?;
        let result = vcs::clone_into(&self.url_for(remote_path), scratch.path()).map(|_| ());
        if let Err(e) = self.discard(scratch) {
            tracing::warn!("{e:#}");
        }
        result
    }

    fn attach_remote_and_push(
        &self,
        local_path: &Path,
        remote_path: &str,
        remote_name: &str,
        branch: &str,
    ) -> Result<()> {
        vcs::add_remote_and_push(local_path, remote_name, &self.url_for(remote_path), branch)
    }

    fn push(&self, local_path: &Path, remote_name: &str, branch: &str) -> Result<()> {
        let url = vcs::remote_url(local_path, remote_name)?;
        let remote_path = self.remote_path_of(&url).ok_or_else(|| {
            anyhow!("Remote repository URL {url} does not begin with the gitolite server path")
        })?;
        if !self.exists(&remote_path)? {
            return Err(anyhow!(
                "Server repo path {remote_path} does not currently exist"
            ));
        }
        vcs::push_to_remote(local_path, remote_name, branch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_expand_output() {
        let output = "hello alan.greer, this is gitolite3 running on git 2.7\n\n \
                      R   W \t(alan.greer)\tcontrols/support/ADAndor\n \
                      R   W \t(ronaldo.mercado)\tcontrols/support/ethercat\n";
        assert_eq!(
            parse_expand_output(output),
            vec![
                "controls/support/ADAndor".to_string(),
                "controls/support/ethercat".to_string()
            ]
        );
    }

    #[test]
    fn test_urls() {
        let gateway = GitoliteGateway::new("git@example.org", "controls");
        assert_eq!(
            gateway.url_for("controls/support/foo"),
            "ssh://git@example.org/controls/support/foo"
        );
        assert_eq!(
            gateway.remote_path_of("ssh://git@example.org/controls/support/foo"),
            Some("controls/support/foo".to_string())
        );
        assert_eq!(gateway.remote_path_of("https://elsewhere/foo"), None);
    }

    #[test]
    fn test_clone_durable_refuses_existing_file() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let target = dir.path().join("foo");
        std::fs::write(&target, "stray")?;

        let gateway = GitoliteGateway::new("git@host.invalid", "controls");
        let err = gateway
            .clone_durable("controls/support/foo", &target)
            .err().unwrap();

        assert!(err.to_string().contains("already exists in current directory"));
        Ok(())
    }
}
