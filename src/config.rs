//! Configuration management for the module creator
//!
//! Configuration is read from a TOML file. Lookup order:
//!
//! 1. An explicit path given by the caller (`--config`)
//! 2. The path in `$MODULE_CREATOR_CONFIG`
//! 3. `.module-creator.toml` in the working directory
//! 4. Built-in defaults
//!
//! `$GIT_ROOT_DIR`, when set, overrides `server.root_dir` from any source.
//!
//! # File Format
//!
//! ```toml
//! [server]
//! kind = "gitolite"
//! host = "dascgitolite@dasc-git.diamond.ac.uk"
//! root_dir = "controls"
//!
//! [git]
//! default_branch = "master"
//! remote_name = "origin"
//! initial_commit_message = "Initial commit."
//!
//! [templates]
//! dir = "/dls_sw/templates"
//! ```

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::area::Area;
use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_BRANCH, DEFAULT_COMMIT_MESSAGE, DEFAULT_GITOLITE_HOST,
    DEFAULT_REMOTE_NAME, DEFAULT_ROOT_DIR, ENV_CONFIG_PATH, ENV_GIT_ROOT_DIR,
};
use crate::content::TemplateContent;
use crate::gateway::{GitoliteGateway, LocalGateway, RepositoryGateway};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub templates: TemplatesConfig,
}

/// Which repository host to talk to
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ServerKind {
    #[default]
    Gitolite,
    Local,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub kind: ServerKind,

    /// SSH destination of the gitolite host
    pub host: String,

    /// Root below which every area lives
    pub root_dir: String,

    /// Directory of bare repositories, for `kind = "local"`
    pub path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            kind: ServerKind::default(),
            host: DEFAULT_GITOLITE_HOST.to_string(),
            root_dir: DEFAULT_ROOT_DIR.to_string(),
            path: None,
        }
    }
}

/// Names used for local repositories and pushes
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct GitConfig {
    pub default_branch: String,
    pub remote_name: String,
    pub initial_commit_message: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            default_branch: DEFAULT_BRANCH.to_string(),
            remote_name: DEFAULT_REMOTE_NAME.to_string(),
            initial_commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct TemplatesConfig {
    /// Directory with one template subdirectory per area
    pub dir: Option<PathBuf>,
}

impl Config {
    /// Loads configuration following the lookup order
    ///
    /// # Errors
    ///
    /// Only an explicit path that cannot be read or parsed is an error;
    /// discovered files that fail to load are reported and ignored.
    pub fn load(explicit: Option<&Path>, working_dir: &Path) -> Result<Self> {
        let mut config = if let Some(path) = explicit {
            Self::load_from_file(path)?
        } else {
            Self::discover(working_dir).unwrap_or_default()
        };

        if let Ok(root_dir) = env::var(ENV_GIT_ROOT_DIR) {
            if !root_dir.trim().is_empty() {
                config.server.root_dir = root_dir;
            }
        }

        Ok(config)
    }

    fn discover(working_dir: &Path) -> Option<Self> {
        let candidates = env::var_os(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .into_iter()
            .chain(std::iter::once(working_dir.join(CONFIG_FILE_NAME)));

        for candidate in candidates {
            if !candidate.exists() {
                continue;
            }
            match Self::load_from_file(&candidate) {
                Ok(config) => return Some(config),
                Err(e) => {
                    tracing::warn!("Ignoring configuration {}: {e:#}", candidate.display());
                }
            }
        }
        None
    }

    /// Reads and parses a single configuration file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Builds the gateway described by `[server]`
    pub fn gateway(&self) -> Result<Box<dyn RepositoryGateway>> {
        match self.server.kind {
            ServerKind::Gitolite => Ok(Box::new(GitoliteGateway::new(
                self.server.host.clone(),
                self.server.root_dir.clone(),
            ))),
            ServerKind::Local => {
                let path = self
                    .server
                    .path
                    .clone()
                    .ok_or_else(|| anyhow!("server.path is required for a local server"))?;
                Ok(Box::new(LocalGateway::new(
                    path,
                    self.git.default_branch.clone(),
                )))
            }
        }
    }

    /// Template content for `area`, falling back to the built-in templates
    pub fn template_content(&self, area: Area, adding_app: bool) -> Result<TemplateContent> {
        if let Some(dir) = &self.templates.dir {
            let area_dir = dir.join(area.as_str());
            if area_dir.is_dir() {
                return TemplateContent::from_dir(&area_dir);
            }
            tracing::warn!(
                "No templates for area {} in {}, using built-in templates",
                area,
                dir.display()
            );
        }

        Ok(if adding_app {
            TemplateContent::default_app()
        } else {
            TemplateContent::default_module()
        })
    }
}
