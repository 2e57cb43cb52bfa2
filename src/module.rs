//! Module identity and creation requests
//!
//! A [`CreationRequest`] is what the caller asks for; a [`ModuleIdentity`]
//! is the resolved, immutable set of names and paths derived from it when
//! a creator is constructed.

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::area::Area;
use crate::constants::{
    ARG_APP_NAME, ARG_DATE, ARG_MODULE_NAME, ARG_MODULE_PATH, ARG_USER_LOGIN, DATE_FORMAT,
    DEFAULT_USER_LOGIN, ENV_LOGNAME, ENV_USER,
};
use crate::core::validate_module_path;
use crate::error::{CreatorError, CreatorResult};

/// Parameters handed to the content provider when populating a module
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateArgs(BTreeMap<String, String>);

impl TemplateArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// What the caller wants created
#[derive(Debug, Clone)]
pub struct CreationRequest {
    module_path: String,
    area: Area,
    params: BTreeMap<String, String>,
    working_dir: Option<PathBuf>,
}

impl CreationRequest {
    pub fn new(module_path: impl Into<String>, area: Area) -> Self {
        Self {
            module_path: module_path.into(),
            area,
            params: BTreeMap::new(),
            working_dir: None,
        }
    }

    /// Adds an opaque template parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_app_name(self, app_name: impl Into<String>) -> Self {
        self.with_param(ARG_APP_NAME, app_name)
    }

    /// Resolves the module against `dir` instead of the process working directory
    pub fn in_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn module_path(&self) -> &str {
        &self.module_path
    }

    pub fn area(&self) -> Area {
        self.area
    }

    pub fn app_name(&self) -> Option<&str> {
        self.params.get(ARG_APP_NAME).map(String::as_str)
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }
}

/// Resolved names and paths of the module being created
///
/// The remote path is a pure function of area and relative path and is
/// fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleIdentity {
    module_path: String,
    module_name: String,
    area: Area,
    working_dir: PathBuf,
    abs_path: PathBuf,
    remote_path: String,
}

impl ModuleIdentity {
    /// Validates the request and derives every path from it
    ///
    /// # Errors
    ///
    /// * [`CreatorError::Argument`] for an invalid module path or a missing
    ///   technical area
    /// * [`CreatorError::Operation`] if the working directory cannot be read
    pub fn resolve(request: &CreationRequest, root_dir: &str) -> CreatorResult<Self> {
        let module_path = validate_module_path(&request.module_path)
            .map_err(|e| CreatorError::Argument(e.to_string()))?;
        request
            .area
            .check_technical_area(&module_path)
            .map_err(CreatorError::Argument)?;

        let working_dir = match &request.working_dir {
            Some(dir) => dir.clone(),
            None => env::current_dir().context("Failed to read current directory")?,
        };

        let module_name = module_path
            .rsplit('/')
            .next()
            .unwrap_or(module_path.as_str())
            .to_string();
        let abs_path = working_dir.join(&module_path);
        let remote_path = request.area.remote_path(root_dir, &module_path);

        Ok(Self {
            module_path,
            module_name,
            area: request.area,
            working_dir,
            abs_path,
            remote_path,
        })
    }

    /// The relative path as given by the caller, used in messages
    pub fn module_path(&self) -> &str {
        &self.module_path
    }

    /// Last segment of the module path
    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn area(&self) -> Area {
        self.area
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn abs_path(&self) -> &Path {
        &self.abs_path
    }

    pub fn remote_path(&self) -> &str {
        &self.remote_path
    }

    /// Builds the template arguments: derived names, login, date and caller params
    pub fn template_args(&self, params: &BTreeMap<String, String>) -> TemplateArgs {
        let mut args = TemplateArgs::new();
        args.insert(ARG_MODULE_NAME, self.module_name.as_str());
        args.insert(ARG_MODULE_PATH, self.module_path.as_str());
        args.insert(ARG_USER_LOGIN, user_login());
        args.insert(ARG_DATE, chrono::Local::now().format(DATE_FORMAT).to_string());
        for (key, value) in params {
            args.insert(key.as_str(), value.as_str());
        }
        args
    }
}

/// Login name of the current user, from `$USER` or `$LOGNAME`
pub fn user_login() -> String {
    [ENV_USER, ENV_LOGNAME]
        .iter()
        .filter_map(|var| env::var(var).ok())
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_USER_LOGIN.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_support_module() {
        let request = CreationRequest::new("foo", Area::Support).in_directory("/work");
        let identity = ModuleIdentity::resolve(&request, "controls").unwrap();

        assert_eq!(identity.module_path(), "foo");
        assert_eq!(identity.module_name(), "foo");
        assert_eq!(identity.abs_path(), Path::new("/work/foo"));
        assert_eq!(identity.remote_path(), "controls/support/foo");
    }

    #[test]
    fn test_resolve_nested_ioc_module() {
        let request =
            CreationRequest::new("BL99I/BL99I-VA-IOC-01/", Area::Ioc).in_directory("/work");
        let identity = ModuleIdentity::resolve(&request, "controls").unwrap();

        assert_eq!(identity.module_path(), "BL99I/BL99I-VA-IOC-01");
        assert_eq!(identity.module_name(), "BL99I-VA-IOC-01");
        assert_eq!(identity.remote_path(), "controls/ioc/BL99I/BL99I-VA-IOC-01");
    }

    #[test]
    fn test_resolve_rejects_ioc_without_technical_area() {
        let request = CreationRequest::new("BL99I", Area::Ioc).in_directory("/work");
        let err = ModuleIdentity::resolve(&request, "controls").unwrap_err();
        assert!(matches!(err, CreatorError::Argument(_)));
    }

    #[test]
    fn test_resolve_rejects_invalid_path() {
        let request = CreationRequest::new("../foo", Area::Support).in_directory("/work");
        let err = ModuleIdentity::resolve(&request, "controls").unwrap_err();
        assert!(matches!(err, CreatorError::Argument(_)));
    }

    #[test]
    fn test_template_args_include_params() {
        let request = CreationRequest::new("foo", Area::Support)
            .in_directory("/work")
            .with_app_name("daq");
        let identity = ModuleIdentity::resolve(&request, "controls").unwrap();
        let args = identity.template_args(request.params());

        assert_eq!(args.get(ARG_MODULE_NAME), Some("foo"));
        assert_eq!(args.get(ARG_MODULE_PATH), Some("foo"));
        assert_eq!(args.get(ARG_APP_NAME), Some("daq"));
        assert!(args.get(ARG_USER_LOGIN).is_some());
        assert!(args.get(ARG_DATE).is_some());
    }
}
