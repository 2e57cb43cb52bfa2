//! Module creation orchestrator
//!
//! [`ModuleCreator`] reconciles two independently failing systems, the local
//! working directory and the remote repository host, through three gates:
//!
//! | Gate | Earned by | Consumed by |
//! |---|---|---|
//! | remote-valid | [`verify_remote_repo`](ModuleCreator::verify_remote_repo) | [`push_repo_to_remote`](ModuleCreator::push_repo_to_remote) |
//! | local-creation | [`verify_can_create_local_module`](ModuleCreator::verify_can_create_local_module) | [`create_local_module`](ModuleCreator::create_local_module) |
//! | push | [`verify_can_push_repo_to_remote`](ModuleCreator::verify_can_push_repo_to_remote) | [`push_repo_to_remote`](ModuleCreator::push_repo_to_remote) |
//!
//! Verification operations may be called in any order and any number of
//! times. Side-effecting operations verify for themselves when their gate
//! has not been earned, so they are also safe to call on their own.
//!
//! What "remote-valid" means depends on the [`RemoteCheck`]: a new module
//! needs its remote path to be free, while an app addition needs the remote
//! module to exist without an `<app_name>App` folder.
//!
//! # Example
//!
//! ```no_run
//! use module_creator::area::Area;
//! use module_creator::config::Config;
//! use module_creator::content::TemplateContent;
//! use module_creator::creator::ModuleCreator;
//! use module_creator::module::CreationRequest;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let request = CreationRequest::new("motor", Area::Support);
//! let mut creator = ModuleCreator::new_module(
//!     &request,
//!     &config,
//!     config.gateway()?,
//!     Box::new(TemplateContent::default_module()),
//! )?;
//!
//! creator.verify_remote_repo()?;
//! creator.verify_can_create_local_module()?;
//! creator.create_local_module()?;
//! creator.push_repo_to_remote()?;
//! creator.print_message();
//! # Ok(())
//! # }
//! ```

use anyhow::Context;
use std::fs;

use crate::config::{Config, GitConfig};
use crate::constants::{
    fill, APP_FOLDER_SUFFIX, ARG_APP_NAME, MSG_APP_NAME_REQUIRED, MSG_INSIDE_REPOSITORY,
    MSG_LOCAL_DIR_EXISTS, MSG_LOCAL_DIR_MISSING, MSG_LOCAL_DIR_NOT_REPO, MSG_PROBE_REMOTE_MISSING,
    MSG_REMOTE_APP_CONFLICT, MSG_REMOTE_PATH_EXISTS, MSG_REMOTE_PATH_MISSING,
    PROGRESS_CLONING_MODULE, PROGRESS_MAKING_DIRECTORY, WARN_DISCARD_FAILED,
};
use crate::content::ContentProvider;
use crate::core::validate_app_name;
use crate::error::{CreatorError, CreatorResult, VerificationError};
use crate::gate::Gates;
use crate::gateway::RepositoryGateway;
use crate::module::{CreationRequest, ModuleIdentity, TemplateArgs};
use crate::vcs;

/// What the remote repository must look like for creation to proceed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCheck {
    /// The remote path must not exist yet
    NewModule,
    /// The remote module must exist and must not contain `<app_name>App`
    AddApp { app_name: String },
}

/// Orchestrates verification, local creation and push of one module
///
/// An instance is intended for exactly one creation attempt. Gates live and
/// die with the instance.
pub struct ModuleCreator {
    identity: ModuleIdentity,
    check: RemoteCheck,
    template_args: TemplateArgs,
    git: GitConfig,
    gates: Gates,
    gateway: Box<dyn RepositoryGateway>,
    content: Box<dyn ContentProvider>,
}

impl ModuleCreator {
    /// Creator for a brand-new module repository
    ///
    /// # Errors
    ///
    /// [`CreatorError::Argument`] if the module path is invalid.
    pub fn new_module(
        request: &CreationRequest,
        config: &Config,
        gateway: Box<dyn RepositoryGateway>,
        content: Box<dyn ContentProvider>,
    ) -> CreatorResult<Self> {
        Self::build(request, config, RemoteCheck::NewModule, gateway, content)
    }

    /// Creator for a new app inside an existing module repository
    ///
    /// # Errors
    ///
    /// [`CreatorError::Argument`] if the request carries no valid app name
    /// or the module path is invalid.
    pub fn add_app(
        request: &CreationRequest,
        config: &Config,
        gateway: Box<dyn RepositoryGateway>,
        content: Box<dyn ContentProvider>,
    ) -> CreatorResult<Self> {
        let app_name = request
            .app_name()
            .ok_or_else(|| CreatorError::Argument(MSG_APP_NAME_REQUIRED.to_string()))?;
        let app_name =
            validate_app_name(app_name).map_err(|e| CreatorError::Argument(e.to_string()))?;

        Self::build(
            request,
            config,
            RemoteCheck::AddApp { app_name },
            gateway,
            content,
        )
    }

    fn build(
        request: &CreationRequest,
        config: &Config,
        check: RemoteCheck,
        gateway: Box<dyn RepositoryGateway>,
        content: Box<dyn ContentProvider>,
    ) -> CreatorResult<Self> {
        let identity = ModuleIdentity::resolve(request, &config.server.root_dir)?;
        let mut template_args = identity.template_args(request.params());
        if let RemoteCheck::AddApp { app_name } = &check {
            template_args.insert(ARG_APP_NAME, app_name.as_str());
        }

        Ok(Self {
            identity,
            check,
            template_args,
            git: config.git.clone(),
            gates: Gates::default(),
            gateway,
            content,
        })
    }

    pub fn identity(&self) -> &ModuleIdentity {
        &self.identity
    }

    pub fn remote_check(&self) -> &RemoteCheck {
        &self.check
    }

    pub fn gates(&self) -> Gates {
        self.gates
    }

    pub fn template_args(&self) -> &TemplateArgs {
        &self.template_args
    }

    /// Checks the remote host against the [`RemoteCheck`]
    ///
    /// Returns immediately without contacting the host when the remote-valid
    /// gate is already passed.
    ///
    /// # Errors
    ///
    /// * [`CreatorError::Verification`] if the remote path conflicts
    /// * [`CreatorError::RemoteRepo`] if the host changed under the app probe
    /// * [`CreatorError::Operation`] if the host cannot be queried
    pub fn verify_remote_repo(&mut self) -> CreatorResult<()> {
        if self.gates.remote_valid.is_passed() {
            return Ok(());
        }

        let remote_path = self.identity.remote_path();
        match &self.check {
            RemoteCheck::NewModule => {
                if self.gateway.exists(remote_path)? {
                    return Err(
                        VerificationError::single(fill(MSG_REMOTE_PATH_EXISTS, &[remote_path]))
                            .into(),
                    );
                }
            }
            RemoteCheck::AddApp { app_name } => {
                if !self.gateway.exists(remote_path)? {
                    return Err(
                        VerificationError::single(fill(MSG_REMOTE_PATH_MISSING, &[remote_path]))
                            .into(),
                    );
                }
                if self.remote_has_app(app_name)? {
                    return Err(VerificationError::single(fill(
                        MSG_REMOTE_APP_CONFLICT,
                        &[remote_path, app_name],
                    ))
                    .into());
                }
            }
        }

        self.gates.remote_valid.pass();
        tracing::debug!(remote = %self.identity.remote_path(), "remote-valid gate passed");
        Ok(())
    }

    /// Whether a disposable clone of the remote module contains `<app_name>App`
    ///
    /// The clone is discarded on every path out of this function; a failure
    /// to discard it is logged rather than returned.
    fn remote_has_app(&self, app_name: &str) -> CreatorResult<bool> {
        let remote_path = self.identity.remote_path();
        if !self.gateway.exists(remote_path)? {
            return Err(CreatorError::RemoteRepo(fill(
                MSG_PROBE_REMOTE_MISSING,
                &[remote_path, app_name],
            )));
        }

        let clone = self.gateway.clone_disposable(remote_path)?;
        let clone_path = clone.path().display().to_string();
        let conflict = clone
            .path()
            .join(format!("{app_name}{APP_FOLDER_SUFFIX}"))
            .exists();

        if let Err(e) = self.gateway.discard(clone) {
            tracing::warn!("{}", fill(WARN_DISCARD_FAILED, &[&clone_path, &format!("{e:#}")]));
        }

        Ok(conflict)
    }

    /// Checks that the module can be created in the working directory
    ///
    /// Every condition is evaluated before failing:
    /// - the target directory must not exist
    /// - the working directory must not be inside a git repository
    ///
    /// # Errors
    ///
    /// [`CreatorError::Verification`] listing every violated condition.
    pub fn verify_can_create_local_module(&mut self) -> CreatorResult<()> {
        if self.gates.local_creation.is_passed() {
            return Ok(());
        }

        let mut reasons = Vec::new();

        if self.identity.abs_path().exists() {
            reasons.push(fill(MSG_LOCAL_DIR_EXISTS, &[self.identity.module_path()]));
        }

        if vcs::is_in_local_repo(self.identity.working_dir())? {
            reasons.push(MSG_INSIDE_REPOSITORY.to_string());
        }

        if !reasons.is_empty() {
            return Err(VerificationError::new(reasons).into());
        }

        self.gates.local_creation.pass();
        tracing::debug!(path = %self.identity.module_path(), "local-creation gate passed");
        Ok(())
    }

    /// Creates the local module repository with its initial commit
    ///
    /// A new module gets a fresh directory and repository; an app addition
    /// starts from a clone of the existing remote module. In both cases the
    /// content provider then populates the tree and everything is committed.
    /// The local-creation gate is consumed before any work starts, so a
    /// second call always re-verifies.
    pub fn create_local_module(&mut self) -> CreatorResult<()> {
        self.verify_can_create_local_module()?;
        self.gates.local_creation.consume();

        let abs_path = self.identity.abs_path();
        match &self.check {
            RemoteCheck::NewModule => {
                tracing::info!(
                    "{}",
                    fill(PROGRESS_MAKING_DIRECTORY, &[self.identity.module_path()])
                );
                fs::create_dir_all(abs_path)
                    .with_context(|| format!("Failed to create {}", abs_path.display()))?;
                self.content.populate(abs_path, &self.template_args)?;
                vcs::init_repo(abs_path, &self.git.default_branch)?;
            }
            RemoteCheck::AddApp { .. } => {
                tracing::info!(
                    "{}",
                    fill(PROGRESS_CLONING_MODULE, &[self.identity.module_path()])
                );
                self.gateway
                    .clone_durable(self.identity.remote_path(), abs_path)?;
                self.content.populate(abs_path, &self.template_args)?;
            }
        }

        vcs::stage_all_files_and_commit(abs_path, &self.git.initial_commit_message)?;
        Ok(())
    }

    /// Checks that the local module can be pushed
    ///
    /// The local directory must exist and be a repository root. Unless the
    /// remote-valid gate is already passed, the remote is verified as well
    /// and its failure reasons are folded into the same error.
    pub fn verify_can_push_repo_to_remote(&mut self) -> CreatorResult<()> {
        if self.gates.push.is_passed() {
            return Ok(());
        }

        let mut reasons = Vec::new();
        let module_path = self.identity.module_path();

        if !self.identity.abs_path().exists() {
            reasons.push(fill(MSG_LOCAL_DIR_MISSING, &[module_path]));
        } else if !vcs::is_local_repo_root(self.identity.abs_path()) {
            reasons.push(fill(MSG_LOCAL_DIR_NOT_REPO, &[module_path]));
        }

        if !self.gates.remote_valid.is_passed() {
            match self.verify_remote_repo() {
                Ok(()) => {}
                Err(CreatorError::Verification(e)) => reasons.extend(e.into_reasons()),
                Err(e) => return Err(e),
            }
        }

        if !reasons.is_empty() {
            return Err(VerificationError::new(reasons).into());
        }

        self.gates.push.pass();
        tracing::debug!(path = %self.identity.module_path(), "push gate passed");
        Ok(())
    }

    /// Pushes the local module to the remote host
    ///
    /// Both the push and remote-valid gates are consumed whatever the
    /// outcome, so a repeated push always re-verifies the remote.
    ///
    /// A new module's remote repository is created and attached under the
    /// configured remote name; an app addition pushes over the remote its
    /// clone already carries. The local branch and remote alias are checked
    /// before the remote repository is created, so a failed push never
    /// leaves an empty repository on the host.
    ///
    /// # Errors
    ///
    /// * [`CreatorError::Verification`] if a pre-condition is not met
    /// * [`CreatorError::Operation`] if creating or pushing fails
    pub fn push_repo_to_remote(&mut self) -> CreatorResult<()> {
        let verified = self.verify_can_push_repo_to_remote();
        self.gates.push.consume();
        self.gates.remote_valid.consume();
        verified?;

        let abs_path = self.identity.abs_path();
        let remote_path = self.identity.remote_path();
        match &self.check {
            RemoteCheck::NewModule => {
                vcs::check_can_attach(abs_path, &self.git.remote_name, &self.git.default_branch)?;
                self.gateway.create_container(remote_path)?;
                self.gateway.attach_remote_and_push(
                    abs_path,
                    remote_path,
                    &self.git.remote_name,
                    &self.git.default_branch,
                )?;
            }
            RemoteCheck::AddApp { .. } => {
                self.gateway
                    .push(abs_path, &self.git.remote_name, &self.git.default_branch)?;
            }
        }

        tracing::info!(remote = %remote_path, "pushed {}", self.identity.module_path());
        Ok(())
    }

    /// The content provider's next steps for the user
    pub fn next_steps_message(&self) -> String {
        self.content.next_steps_message(&self.template_args)
    }

    /// Prints the next steps for the user
    pub fn print_message(&self) {
        println!("{}", self.next_steps_message());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::Area;
    use crate::content::TemplateContent;
    use crate::gate::Gate;
    use crate::gateway::MockGateway;
    use tempfile::TempDir;

    fn creator(dir: &TempDir, gateway: &MockGateway) -> ModuleCreator {
        let request = CreationRequest::new("foo", Area::Support).in_directory(dir.path());
        ModuleCreator::new_module(
            &request,
            &Config::default(),
            Box::new(gateway.clone()),
            Box::new(TemplateContent::default_module()),
        )
        .unwrap()
    }

    #[test]
    fn test_gates_start_unchecked() {
        let dir = TempDir::new().unwrap();
        let creator = creator(&dir, &MockGateway::new());
        assert_eq!(creator.gates(), Gates::default());
        assert_eq!(creator.remote_check(), &RemoteCheck::NewModule);
    }

    #[test]
    fn test_failed_remote_check_leaves_gate_unchecked() {
        let dir = TempDir::new().unwrap();
        let gateway = MockGateway::new().with_repo("controls/support/foo");
        let mut creator = creator(&dir, &gateway);

        assert!(creator.verify_remote_repo().is_err());
        assert_eq!(creator.gates().remote_valid, Gate::Unchecked);

        gateway.set_repo_exists("controls/support/foo", false);
        creator.verify_remote_repo().unwrap();
        assert_eq!(creator.gates().remote_valid, Gate::Passed);
    }

    #[test]
    fn test_push_consumes_gates_even_on_failure() {
        let dir = TempDir::new().unwrap();
        let gateway = MockGateway::new();
        let mut creator = creator(&dir, &gateway);

        creator.verify_remote_repo().unwrap();
        let err = creator.push_repo_to_remote().unwrap_err();

        assert!(err.is_recoverable());
        assert_eq!(creator.gates().push, Gate::Consumed);
        assert_eq!(creator.gates().remote_valid, Gate::Consumed);
    }

    #[test]
    fn test_unreachable_host_is_operation_error() {
        let dir = TempDir::new().unwrap();
        let gateway = MockGateway::new().with_unreachable_host();
        let mut creator = creator(&dir, &gateway);

        let err = creator.verify_remote_repo().unwrap_err();
        assert!(matches!(err, CreatorError::Operation(_)));
    }
}
