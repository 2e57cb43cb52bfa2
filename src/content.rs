//! Initial module content
//!
//! The orchestrator does not know what files a module starts with. It hands
//! the target directory and the template arguments to a [`ContentProvider`].
//!
//! [`TemplateContent`] is the provider used by the CLI: a set of file
//! templates, either built in or loaded from a template directory, whose
//! paths and bodies may contain `{{key}}` placeholders.
//!
//! # Template Directory Layout
//!
//! ```text
//! templates/
//!   support/
//!     .next-steps          # message shown after creation, not copied
//!     README.md
//!     {{module_name}}App/Makefile
//!   ioc/
//!     ...
//! ```

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::Path;

use crate::constants::{
    fill, DEFAULT_APP_NEXT_STEPS, DEFAULT_NEXT_STEPS, ERROR_FILE_EXISTS, ERROR_TEMPLATE_PATH,
    MAX_TEMPLATE_DEPTH, NEXT_STEPS_FILE, TEMPLATE_PLACEHOLDER_CLOSE, TEMPLATE_PLACEHOLDER_OPEN,
};
use crate::core::validate_module_path;
use crate::module::TemplateArgs;

/// Populates a new module and describes what the user should do next
pub trait ContentProvider: Send {
    /// Writes the module's initial files below `target`
    fn populate(&self, target: &Path, args: &TemplateArgs) -> Result<()>;

    /// Human-readable next steps for the user
    fn next_steps_message(&self, args: &TemplateArgs) -> String;
}

/// Replaces every `{{key}}` in `template` with its argument value
///
/// Placeholders without a matching argument are left untouched.
pub fn render(template: &str, args: &TemplateArgs) -> String {
    args.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(
            &format!("{TEMPLATE_PLACEHOLDER_OPEN}{key}{TEMPLATE_PLACEHOLDER_CLOSE}"),
            value,
        )
    })
}

/// File templates rendered into the target directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContent {
    files: Vec<(String, String)>,
    message: String,
}

impl TemplateContent {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            files: Vec::new(),
            message: message.into(),
        }
    }

    /// Adds a file; both `path` and `body` are templates
    pub fn with_file(mut self, path: impl Into<String>, body: impl Into<String>) -> Self {
        self.files.push((path.into(), body.into()));
        self
    }

    /// Built-in content for a brand-new module
    pub fn default_module() -> Self {
        Self::new(DEFAULT_NEXT_STEPS).with_file("README.md", "# {{module_name}}\n")
    }

    /// Built-in content for an app added to an existing module
    pub fn default_app() -> Self {
        Self::new(DEFAULT_APP_NEXT_STEPS).with_file(
            "{{app_name}}App/README.md",
            "# {{app_name}}App\n\nAdded to {{module_path}} by {{user_login}} on {{date}}.\n",
        )
    }

    /// Loads every file below `dir` as a template
    ///
    /// A `.next-steps` file at the top level becomes the message instead of
    /// being copied. Symlinks and `.git` directories are skipped.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let message = match fs::read_to_string(dir.join(NEXT_STEPS_FILE)) {
            Ok(message) => message,
            Err(_) => DEFAULT_NEXT_STEPS.to_string(),
        };

        let mut content = Self::new(message);
        content.load_dir(dir, dir, 0)?;
        content.files.sort();
        Ok(content)
    }

    fn load_dir(&mut self, root: &Path, dir: &Path, depth: usize) -> Result<()> {
        if depth > MAX_TEMPLATE_DEPTH {
            return Ok(());
        }

        for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
            let entry = entry?;
            let path = entry.path();
            let file_type = entry.file_type()?;
            let name = entry.file_name();

            if file_type.is_symlink() || name == ".git" {
                continue;
            }
            if depth == 0 && name == NEXT_STEPS_FILE {
                continue;
            }

            if file_type.is_dir() {
                self.load_dir(root, &path, depth + 1)?;
            } else if file_type.is_file() {
                let relative = path
                    .strip_prefix(root)?
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().to_string())
                    .collect::<Vec<_>>()
                    .join("/");
                let body = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read template {}", path.display()))?;
                self.files.push((relative, body));
            }
        }
        Ok(())
    }

    /// Template paths, in the order they are written
    pub fn file_paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|(path, _)| path.as_str())
    }
}

impl ContentProvider for TemplateContent {
    fn populate(&self, target: &Path, args: &TemplateArgs) -> Result<()> {
        for (path_template, body_template) in &self.files {
            let rendered = render(path_template, args);
            let relative = validate_module_path(&rendered)
                .map_err(|_| anyhow!(fill(ERROR_TEMPLATE_PATH, &[&rendered])))?;
            let destination = target.join(&relative);

            if destination.exists() {
                return Err(anyhow!(fill(
                    ERROR_FILE_EXISTS,
                    &[&destination.display().to_string()]
                )));
            }
            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&destination, render(body_template, args))
                .with_context(|| format!("Failed to write {}", destination.display()))?;
            tracing::debug!(file = %relative, "wrote template");
        }
        Ok(())
    }

    fn next_steps_message(&self, args: &TemplateArgs) -> String {
        render(&self.message, args)
    }
}
