//! Agent role profiles for `.sermon-pipeline/agents/*.md`.
//!
//! A profile overrides the built-in system instruction (and optionally the
//! model) used for one agent role. Profiles are Markdown files with YAML
//! front matter.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Role-specific agent configuration.
///
/// # Example
///
/// ```markdown
/// ---
/// name: Rhetorical Analyst
/// description: Persuasion strategy and emphasis
/// model: gemini-3-flash-preview
/// ---
///
/// You are an expert in rhetoric. Analyse the passage's persuasive strategy,
/// its points of emphasis and its rhetorical impact on the audience.
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, TS)]
pub struct AgentProfile {
    /// Role name. Must match a step's `agent-name` to take effect.
    pub name: String,

    /// Human-readable description of the role.
    pub description: String,

    /// Model override for this role. Falls back to the global agent model.
    #[serde(default)]
    pub model: Option<String>,

    /// The body of the .md file, used as the system instruction.
    #[serde(skip)]
    pub system_prompt: String,
}
