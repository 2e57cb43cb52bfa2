//! Module Creator - Controls Module Scaffolding
//!
//! Module Creator scaffolds new software modules in a shared repository
//! host. It verifies that the work can proceed, builds the module locally
//! as a git repository with an initial commit, and pushes it to the host.
//!
//! # Features
//!
//! - **New Modules**: Create a module in an area such as `support` or `ioc`
//! - **App Additions**: Add an `<app_name>App` to an existing remote module
//! - **Gated Operations**: Side effects only run after their checks pass
//! - **Aggregated Errors**: Every failed pre-condition is reported at once
//! - **Templates**: Initial files rendered from built-in or on-disk templates
//! - **Pluggable Hosts**: Gitolite over SSH, or a directory of bare repositories
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`creator`] - The gated orchestrator
//! - [`gateway`] - Repository host abstraction and implementations
//! - [`vcs`] - Local git operations
//! - [`content`] - Initial module content
//! - [`module`] - Creation requests and derived paths
//! - [`area`] - Areas and remote path layout
//! - [`config`] - Configuration file management
//! - [`error`] - Error kinds
//! - [`utils`] - Utility functions for terminal output
//!
//! # Usage Example
//!
//! ```no_run
//! use module_creator::area::Area;
//! use module_creator::config::Config;
//! use module_creator::creator::ModuleCreator;
//! use module_creator::module::CreationRequest;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let request = CreationRequest::new("BL01I/MO", Area::Ioc);
//! let content = config.template_content(Area::Ioc, false)?;
//! let mut creator =
//!     ModuleCreator::new_module(&request, &config, config.gateway()?, Box::new(content))?;
//!
//! creator.create_local_module()?;
//! creator.push_repo_to_remote()?;
//! # Ok(())
//! # }
//! ```

pub mod area;
pub mod config;
pub mod constants;
pub mod content;
pub mod core;
pub mod creator;
pub mod error;
pub mod gate;
pub mod gateway;
pub mod module;
pub mod utils;
pub mod vcs;
