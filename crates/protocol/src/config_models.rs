//! Global configuration models for `.sermon-pipeline/config.toml`.

use serde::Deserialize;
use serde::Serialize;
use ts_rs::TS;

/// Represents global settings from `.sermon-pipeline/config.toml`.
///
/// Every section is optional; missing values take their defaults.
///
/// # Example
///
/// ```toml
/// # .sermon-pipeline/config.toml
/// [agent]
/// command = "gemini-cli"
/// model = "gemini-3-flash-preview"
/// fallback = "Backup Writer"
///
/// [pacing]
/// start-delay-ms = 1000
/// advance-delay-ms = 600
///
/// [export]
/// output-dir = "sermon-output"
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
pub struct GlobalConfig {
    #[serde(default)]
    pub agent: AgentSettings,

    #[serde(default)]
    pub pacing: PacingConfig,

    #[serde(default)]
    pub export: ExportSettings,
}

/// Settings for the external generative agent.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "kebab-case")]
pub struct AgentSettings {
    /// Executable spawned for each invocation.
    #[serde(default = "default_agent_command")]
    pub command: String,

    /// Model name. Also selects the adapter: `gemini*` models use the CLI,
    /// anything else runs the offline mock agent.
    #[serde(default = "default_agent_model")]
    pub model: String,

    /// Role whose dedicated agent takes over when the resolved agent is
    /// unavailable. Must name an agent profile that sets its own `model`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            command: default_agent_command(),
            model: default_agent_model(),
            fallback: None,
        }
    }
}

fn default_agent_command() -> String {
    "gemini-cli".to_string()
}

fn default_agent_model() -> String {
    "gemini-3-flash-preview".to_string()
}

/// Cosmetic delays of the run loop. Not a correctness requirement.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "kebab-case")]
pub struct PacingConfig {
    /// Delay between session initialisation and the first advance.
    #[serde(default = "default_start_delay_ms")]
    pub start_delay_ms: u64,

    /// Delay between two automatically advanced steps.
    #[serde(default = "default_advance_delay_ms")]
    pub advance_delay_ms: u64,
}

impl PacingConfig {
    /// No delays at all. Used by tests and batch runs.
    pub fn immediate() -> Self {
        Self {
            start_delay_ms: 0,
            advance_delay_ms: 0,
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            start_delay_ms: default_start_delay_ms(),
            advance_delay_ms: default_advance_delay_ms(),
        }
    }
}

fn default_start_delay_ms() -> u64 {
    1000
}

fn default_advance_delay_ms() -> u64 {
    600
}

/// Where exported documents are written.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "kebab-case")]
pub struct ExportSettings {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> String {
    "sermon-output".to_string()
}
