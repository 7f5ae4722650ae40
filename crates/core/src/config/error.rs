//! Errors raised while loading a `.sermon-pipeline/` directory.
//!
//! Every variant names the file that caused it.

use crate::registry::RegistryError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// `config.toml` or `input.toml` is not valid for its model.
    #[error("Invalid TOML in {path}: {source}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// `pipeline.yaml` is not a list of step definitions.
    #[error("Invalid step list in {path}: {source}")]
    YamlParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// An agent profile in `agents/` has missing or malformed front matter.
    #[error("Invalid agent profile {path}: {reason}")]
    MarkdownParse { path: PathBuf, reason: String },

    #[error("Cannot scan agent profiles in {path}: {source}")]
    DirectoryWalk {
        path: PathBuf,
        source: walkdir::Error,
    },

    /// Two profiles in `agents/` declare the same role name.
    #[error("Agent profile {path} repeats the role '{name}'")]
    DuplicateProfile { path: PathBuf, name: String },

    /// `pipeline.yaml` parsed but breaks a registry rule.
    #[error("Invalid pipeline in {path}: {source}")]
    InvalidPipeline {
        path: PathBuf,
        #[source]
        source: RegistryError,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
