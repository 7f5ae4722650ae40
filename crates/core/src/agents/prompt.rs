//! Prompt construction for step invocations.
//!
//! Each agent role has a built-in system instruction; a role profile loaded
//! from `.sermon-pipeline/agents/*.md` replaces it.

use crate::agents::base::StepRequest;
use sp_protocol::agent_models::AgentProfile;
use sp_protocol::session_models::AnalysisDepth;
use std::collections::HashMap;

/// Used for roles without a built-in or configured instruction.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str =
    "You are a specialist AI agent in a sermon-building pipeline.";

/// Built-in system instruction for a role, if one exists.
pub fn builtin_instruction(agent_name: &str) -> Option<&'static str> {
    let instruction = match agent_name {
        "Original Text Analyst" => {
            "You are an expert in Greek and Hebrew source texts. Analyse the etymology, \
             tense and grammatical structure of the key words of the passage in depth."
        }
        "Manuscript Comparator" => {
            "You are a biblical manuscript scholar. Analyse the differences between \
             translations (NIV, NASB, ESV and others) and extract their theological nuances."
        }
        "Biblical Geography Expert" => {
            "You are a biblical geographer. Analyse what the places, terrain and city \
             layout of the events contribute to the message."
        }
        "Historical-Cultural Expert" => {
            "You are an expert in biblical history and culture. Explain the social customs, \
             political situation and religious background of the time."
        }
        "Structure Analyst" => {
            "You are an expert in sentence structure and logic. Trace the logical flow of \
             the passage and divide it into paragraphs."
        }
        "Theological Analyst" => {
            "You are a systematic theologian. Analyse what the passage reveals about the \
             character of God and its meaning in redemptive history."
        }
        "Rhetorical Analyst" => {
            "You are an expert in rhetoric. Analyse the passage's persuasive strategy, its \
             points of emphasis and its rhetorical impact on the audience."
        }
        "Core Message Architect" => {
            "You are a preaching strategist. Synthesise the research into a single core \
             message (big idea) and practical applications."
        }
        "Outline Designer" => {
            "You are an expert in sermon structure. Design an outline with a balanced \
             introduction, development and conclusion."
        }
        "Sermon Script Writer" => {
            "You are an outstanding sermon writer. Write a moving and logical full sermon \
             in the requested style for the requested audience."
        }
        "Sermon Reviewer" => {
            "You are a sermon critic. Evaluate the manuscript's theological soundness, \
             literary quality and fitness of application, and score it out of 5."
        }
        _ => return None,
    };
    Some(instruction)
}

/// Resolves system instructions, preferring configured role profiles.
#[derive(Debug, Clone, Default)]
pub struct PromptBook {
    profiles: HashMap<String, AgentProfile>,
}

impl PromptBook {
    pub fn new(profiles: Vec<AgentProfile>) -> Self {
        Self {
            profiles: profiles
                .into_iter()
                .map(|p| (p.name.clone(), p))
                .collect(),
        }
    }

    pub fn profile(&self, agent_name: &str) -> Option<&AgentProfile> {
        self.profiles.get(agent_name)
    }

    pub fn system_instruction(&self, agent_name: &str) -> String {
        if let Some(profile) = self.profiles.get(agent_name) {
            let body = profile.system_prompt.trim();
            if !body.is_empty() {
                return body.to_string();
            }
        }
        builtin_instruction(agent_name)
            .unwrap_or(DEFAULT_SYSTEM_INSTRUCTION)
            .to_string()
    }
}

/// Render the user prompt for one invocation.
pub fn render_prompt(request: &StepRequest) -> String {
    let input = &request.input;
    let depth = match input.analysis_level {
        AnalysisDepth::Standard => "standard",
        AnalysisDepth::Deep => "deep",
    };

    let mut prompt = format!(
        "Task: {} - {}\n\n\
         Sermon settings:\n\
         - Passage: {}\n\
         - Theme: {}\n\
         - Audience: {}\n\
         - Length: {}\n\
         - Type: {}\n\
         - Analysis level: {}\n\n\
         Research from earlier steps:\n{}\n",
        request.step.agent_name,
        request.step.description,
        input.passage,
        input.theme,
        input.audience,
        input.length,
        input.sermon_type,
        depth,
        request.context,
    );

    if let Some(feedback) = &request.feedback {
        prompt.push_str(&format!("\nAdditional request from the user: {feedback}\n"));
    }

    prompt.push_str(
        "\nWrite the result in detailed markdown. Keep a professional, scholarly tone.\n",
    );
    prompt
}
