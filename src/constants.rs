//! Constants used throughout the application
//!
//! This module centralizes message templates, default values and git names
//! so that the orchestrator, the gateways and the CLI render identical text.
//!
//! # Organization
//!
//! - **Defaults**: Server layout and git defaults
//! - **Environment**: Environment variable names
//! - **Verification Messages**: Reasons collected into verification errors
//! - **Invariant Messages**: Internal invariant violations
//! - **Argument Messages**: Construction-time input errors
//! - **Progress Messages**: Step descriptions logged by the orchestrator
//!
//! Templates use `{}` placeholders that are filled with `str::replacen`, so
//! the placeholders are substituted in order.
//!
//! # Usage
//!
//! ```rust
//! use module_creator::constants::{fill, MSG_REMOTE_PATH_EXISTS};
//!
//! let message = fill(MSG_REMOTE_PATH_EXISTS, &["controls/support/foo"]);
//! assert!(message.contains("controls/support/foo"));
//! ```

// Defaults
pub const DEFAULT_ROOT_DIR: &str = "controls";
pub const DEFAULT_GITOLITE_HOST: &str = "dascgitolite@dasc-git.diamond.ac.uk";
pub const DEFAULT_BRANCH: &str = "master";
pub const DEFAULT_REMOTE_NAME: &str = "origin";
pub const DEFAULT_COMMIT_MESSAGE: &str = "Initial commit.";
pub const DEFAULT_USER_LOGIN: &str = "unknown";
pub const DEFAULT_EMAIL_DOMAIN: &str = "localhost";
pub const APP_FOLDER_SUFFIX: &str = "App";

// Configuration
pub const CONFIG_FILE_NAME: &str = ".module-creator.toml";
pub const TEMPLATE_PLACEHOLDER_OPEN: &str = "{{";
pub const TEMPLATE_PLACEHOLDER_CLOSE: &str = "}}";
pub const DISPOSABLE_CLONE_PREFIX: &str = "module-creator-";
pub const NEXT_STEPS_FILE: &str = ".next-steps";
pub const MAX_TEMPLATE_DEPTH: usize = 10;
pub const DEFAULT_NEXT_STEPS: &str =
    "Module {{module_path}} has been created.\nReview the generated files before building.";
pub const DEFAULT_APP_NEXT_STEPS: &str =
    "App {{app_name}}App has been added to {{module_path}}.\nReview the generated files before building.";

// Validation
pub const GIT_DIR_NAME: &str = ".git";
pub const INVALID_SEGMENT_CHARS: &[char] = &['\\', ':', '*', '?', '"', '<', '>', '|', '\0'];
pub const MAX_SEGMENT_LENGTH: usize = 255;
pub const MAX_HOST_DEPTH: usize = 8;

// Environment
pub const ENV_CONFIG_PATH: &str = "MODULE_CREATOR_CONFIG";
pub const ENV_GIT_ROOT_DIR: &str = "GIT_ROOT_DIR";
pub const ENV_USER: &str = "USER";
pub const ENV_LOGNAME: &str = "LOGNAME";

// Template argument keys
pub const ARG_MODULE_NAME: &str = "module_name";
pub const ARG_MODULE_PATH: &str = "module_path";
pub const ARG_USER_LOGIN: &str = "user_login";
pub const ARG_APP_NAME: &str = "app_name";
pub const ARG_DATE: &str = "date";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// Git
pub const GIT_CMD: &str = "git";
pub const GIT_CLONE: &str = "clone";
pub const GIT_PUSH: &str = "push";
pub const GIT_QUIET: &str = "--quiet";
pub const GIT_SSH_SCHEME: &str = "ssh://";
pub const GITOLITE_EXPAND: &str = "expand";
pub const SSH_CMD: &str = "ssh";
pub const STAGE_ALL_PATHSPEC: &str = "*";

// Verification Messages
pub const MSG_REMOTE_PATH_EXISTS: &str = "The path {} already exists on the remote host, cannot continue";
pub const MSG_REMOTE_PATH_MISSING: &str =
    "The path {} does not exist on the remote host, so cannot clone from it";
pub const MSG_REMOTE_APP_CONFLICT: &str =
    "The repository {} has an app that conflicts with app name: {}";
pub const MSG_LOCAL_DIR_EXISTS: &str =
    "Directory {} already exists, please move elsewhere and try again.";
pub const MSG_INSIDE_REPOSITORY: &str =
    "Currently in a git repository, please move elsewhere and try again.";
pub const MSG_LOCAL_DIR_MISSING: &str = "Directory {} does not exist.";
pub const MSG_LOCAL_DIR_NOT_REPO: &str =
    "Directory {} is not a git repository. Unable to push to remote repository.";

// Invariant Messages
pub const MSG_PROBE_REMOTE_MISSING: &str =
    "Remote repo {} does not exist. Cannot clone to determine if there is an app_name conflict with {}";

// Argument Messages
pub const MSG_APP_NAME_REQUIRED: &str = "'app_name' must be provided to add an app to a module.";
pub const MSG_APP_NAME_INVALID: &str = "App name '{}' must not be empty or contain path separators.";
pub const MSG_MODULE_PATH_EMPTY: &str = "Module path cannot be empty";
pub const MSG_MODULE_PATH_ABSOLUTE: &str = "Module path '{}' must be relative";
pub const MSG_MODULE_PATH_TRAVERSAL: &str = "Module path '{}' must not contain '.' or '..' segments";
pub const MSG_MISSING_TECHNICAL_AREA: &str = "Missing technical area under beamline";
pub const MSG_UNKNOWN_AREA: &str = "Unknown area '{}'";
pub const MSG_SEGMENT_RESERVED: &str = "Path segment '{}' is reserved for git metadata";
pub const MSG_SEGMENT_INVALID_CHAR: &str = "Path segment '{}' contains invalid character '{}'";
pub const MSG_SEGMENT_TOO_LONG: &str = "Path segment '{}' is too long";

// Gateway / VCS Messages
pub const ERROR_NOT_A_DIRECTORY: &str = "Path {} is not a directory";
pub const ERROR_ALREADY_A_REPOSITORY: &str = "Path {} is already a git repository";
pub const ERROR_NOT_A_REPOSITORY: &str = "Path {} is not a git repository";
pub const ERROR_BRANCH_MISSING: &str = "Local repository branch {} does not currently exist.";
pub const ERROR_REMOTE_ALREADY_DEFINED: &str =
    "Cannot push local repository to destination as remote {} is already defined";
pub const ERROR_REMOTE_MISSING: &str = "Local repository does not have remote {}";
pub const ERROR_CONTAINER_EXISTS: &str = "{} already exists";
pub const ERROR_REPO_NOT_ON_HOST: &str = "Repository does not contain {}";
pub const ERROR_LOCAL_PATH_EXISTS: &str = "{} already exists in current directory";
pub const ERROR_GIT_FAILED: &str = "Git command failed: {}";
pub const ERROR_SSH_FAILED: &str = "Failed to list repositories on {}: {}";
pub const ERROR_FILE_EXISTS: &str = "File {} already exists, refusing to overwrite";
pub const ERROR_TEMPLATE_PATH: &str = "Template path {} is not a safe relative path";

// Progress Messages
pub const PROGRESS_MAKING_DIRECTORY: &str = "Making clean directory structure for {}";
pub const PROGRESS_CLONING_MODULE: &str = "Cloning module to {}";
pub const PROGRESS_INITIALISING: &str = "Initialising repo...";
pub const PROGRESS_STAGING: &str = "Staging files...";
pub const PROGRESS_COMMITTING: &str = "Committing files to repo...";
pub const PROGRESS_NOTHING_TO_COMMIT: &str = "Nothing to commit in {}";
pub const PROGRESS_CREATING_REMOTE: &str = "Creating remote...";
pub const PROGRESS_ADDING_REMOTE: &str = "Adding remote to repo...";
pub const PROGRESS_PUSHING: &str = "Pushing repo to destination...";
pub const WARN_DISCARD_FAILED: &str = "Failed to remove disposable clone {}: {}";

/// Substitutes `{}` placeholders in `template` with `values`, in order
pub fn fill(template: &str, values: &[&str]) -> String {
    values
        .iter()
        .fold(template.to_string(), |acc, value| acc.replacen("{}", value, 1))
}
