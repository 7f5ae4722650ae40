//! Configuration file loader for the `.sermon-pipeline/` directory structure.
//!
//! This module provides functionality to load and parse all configuration files
//! from the `.sermon-pipeline/` directory, including:
//! - `config.toml`: Global settings
//! - `agents/*.md`: Agent role profiles with YAML front matter
//! - `input.toml`: Default pipeline input
//! - `pipeline.yaml`: Step catalog override

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::AppConfig;
use crate::config::CONFIG_DIR;
use crate::registry::StepRegistry;
use gray_matter::engine::YAML;
use gray_matter::Matter;
use serde::de::DeserializeOwned;
use sp_protocol::agent_models::AgentProfile;
use sp_protocol::config_models::GlobalConfig;
use sp_protocol::session_models::PipelineInput;
use sp_protocol::step_models::StepDefinition;
use std::collections::HashSet;
use std::path::Path;
use walkdir::WalkDir;

/// Loads all configuration from the `.sermon-pipeline/` directory.
///
/// # Arguments
///
/// * `root` - Root directory containing the `.sermon-pipeline/` folder
///
/// # Returns
///
/// An `AppConfig` containing all loaded configuration. If directories or files
/// are missing (but the root exists), returns an empty/default configuration
/// rather than an error.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - Files exist but cannot be read
/// - Files have invalid syntax (TOML, YAML, or Markdown front matter)
/// - Required fields are missing in configuration files
/// - `pipeline.yaml` describes an invalid step catalog
pub async fn load_config(root: &Path) -> ConfigResult<AppConfig> {
    let sp_dir = root.join(CONFIG_DIR);

    // If .sermon-pipeline doesn't exist, return default config
    if !sp_dir.exists() {
        return Ok(AppConfig::default());
    }

    let global: GlobalConfig = load_toml(&sp_dir.join("config.toml"))?.unwrap_or_default();
    let agents = load_agents(&sp_dir)?;
    let input: Option<PipelineInput> = load_toml(&sp_dir.join("input.toml"))?;
    let steps = load_steps(&sp_dir)?;

    tracing::debug!(
        dir = %sp_dir.display(),
        profiles = agents.len(),
        custom_steps = steps.is_some(),
        "configuration loaded"
    );

    Ok(AppConfig {
        global,
        agents,
        input,
        steps,
    })
}

/// Reads and parses an optional TOML file.
fn load_toml<T: DeserializeOwned>(path: &Path) -> ConfigResult<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content)
        .map(Some)
        .map_err(|source| ConfigError::TomlParse {
            path: path.to_path_buf(),
            source,
        })
}

/// Loads all agent role profiles from `agents/*.md`.
fn load_agents(sp_dir: &Path) -> ConfigResult<Vec<AgentProfile>> {
    let agents_dir = sp_dir.join("agents");

    if !agents_dir.exists() {
        return Ok(Vec::new());
    }

    let mut agents: Vec<AgentProfile> = Vec::new();
    let mut names = HashSet::new();

    // Sorted so that load order and error reporting are deterministic.
    for entry in WalkDir::new(&agents_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| ConfigError::DirectoryWalk {
            path: agents_dir.clone(),
            source,
        })?;

        let path = entry.path();

        if path.extension().and_then(|s| s.to_str()) != Some("md") {
            continue;
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let matter = Matter::<YAML>::new();
        let result = matter.parse(&content);

        let mut agent: AgentProfile = result
            .data
            .ok_or_else(|| ConfigError::MarkdownParse {
                path: path.to_path_buf(),
                reason: "Missing YAML front matter".to_string(),
            })?
            .deserialize()
            .map_err(|e| ConfigError::MarkdownParse {
                path: path.to_path_buf(),
                reason: format!("Failed to deserialize front matter: {}", e),
            })?;

        if !names.insert(agent.name.clone()) {
            return Err(ConfigError::DuplicateProfile {
                path: path.to_path_buf(),
                name: agent.name,
            });
        }

        // The markdown body is the role's system instruction
        agent.system_prompt = result.content;

        agents.push(agent);
    }

    Ok(agents)
}

/// Loads the step catalog override from `pipeline.yaml` (or `pipeline.yml`).
fn load_steps(sp_dir: &Path) -> ConfigResult<Option<Vec<StepDefinition>>> {
    let Some(path) = ["pipeline.yaml", "pipeline.yml"]
        .iter()
        .map(|name| sp_dir.join(name))
        .find(|path| path.exists())
    else {
        return Ok(None);
    };

    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::FileRead {
        path: path.clone(),
        source,
    })?;

    let steps: Vec<StepDefinition> =
        serde_yaml::from_str(&content).map_err(|source| ConfigError::YamlParse {
            path: path.clone(),
            source,
        })?;

    StepRegistry::new(steps.clone())
        .map_err(|source| ConfigError::InvalidPipeline { path, source })?;

    Ok(Some(steps))
}
