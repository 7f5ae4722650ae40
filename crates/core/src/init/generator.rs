//! Directory structure and file generation for `.sermon-pipeline` initialization.

use super::error::{InitError, InitResult};
use super::templates::{get_template, list_templates};
use crate::config::CONFIG_DIR;
use std::fs;
use std::path::{Path, PathBuf};

/// Templates written in minimal mode.
const MINIMAL_TEMPLATES: [&str; 2] = ["config.toml", "input.toml"];

/// Options for initializing a `.sermon-pipeline` directory.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Directory in which `.sermon-pipeline` is created.
    pub target_dir: PathBuf,

    /// Overwrite an existing `.sermon-pipeline` directory.
    pub force: bool,

    /// Only write `config.toml` and `input.toml`.
    pub minimal: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            target_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            force: false,
            minimal: false,
        }
    }
}

/// Generate a `.sermon-pipeline` directory structure with templates.
///
/// ```text
/// .sermon-pipeline/
/// ├── config.toml
/// ├── input.toml
/// ├── pipeline.yaml         (unless minimal)
/// └── agents/               (unless minimal)
///     ├── sermon-reviewer.md
///     └── sermon-writer.md
/// ```
///
/// Returns the path of the created directory.
///
/// # Errors
///
/// Returns an `InitError` if:
/// - The directory already exists (without force flag)
/// - A template file cannot be found
/// - File system operations fail
pub async fn generate_sermon_pipeline_structure(options: InitOptions) -> InitResult<PathBuf> {
    let sp_dir = options.target_dir.join(CONFIG_DIR);

    if sp_dir.exists() && !options.force {
        return Err(InitError::DirectoryExists(sp_dir));
    }

    fs::create_dir_all(&sp_dir).map_err(|source| InitError::DirectoryCreate {
        path: sp_dir.clone(),
        source,
    })?;

    let templates = if options.minimal {
        MINIMAL_TEMPLATES.iter().map(|t| t.to_string()).collect()
    } else {
        list_templates("")
    };

    for template_path in &templates {
        write_template_file(&sp_dir, template_path)?;
    }

    tracing::debug!(dir = %sp_dir.display(), files = templates.len(), "templates written");
    Ok(sp_dir)
}

fn write_template_file(sp_dir: &Path, template_path: &str) -> InitResult<()> {
    let content = get_template(template_path)
        .ok_or_else(|| InitError::TemplateNotFound(template_path.to_string()))?;

    let target_path = sp_dir.join(template_path);

    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent).map_err(|source| InitError::DirectoryCreate {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(&target_path, content).map_err(|source| InitError::FileWrite {
        path: target_path,
        source,
    })?;

    Ok(())
}
