//! Embedded template files for `.sermon-pipeline` initialization.
//!
//! Templates live in the workspace root `templates/` directory and are
//! embedded at compile time with `rust-embed`. With the `debug-embed`
//! feature they are read from disk in debug builds as well.

use rust_embed::RustEmbed;

/// Embedded template files from the workspace `templates/` directory.
///
/// - `CARGO_MANIFEST_DIR` = `crates/core`
/// - `../../templates` = workspace root `templates/`
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../templates"]
pub struct TemplateAssets;

/// Get template file content by path, relative to the templates root.
///
/// # Example
/// ```
/// use sp_core::init::templates::get_template;
///
/// let config = get_template("config.toml").expect("config.toml should exist");
/// assert!(config.contains("[pacing]"));
/// ```
pub fn get_template(path: &str) -> Option<String> {
    TemplateAssets::get(path).map(|file| String::from_utf8_lossy(file.data.as_ref()).to_string())
}

/// List all template files whose path starts with `prefix`, sorted.
pub fn list_templates(prefix: &str) -> Vec<String> {
    let mut paths: Vec<String> = TemplateAssets::iter()
        .filter(|path| path.starts_with(prefix))
        .map(|path| path.to_string())
        .collect();
    paths.sort();
    paths
}
