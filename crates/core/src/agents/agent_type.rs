//! Agent type enumeration for determining which adapter to use.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentType {
    Gemini,
    Mock,
}

impl AgentType {
    /// Infer the agent type from a model name.
    ///
    /// Defaults to `Mock` if the model doesn't match any known pattern, which
    /// makes `model = "mock"` in config.toml an offline dry run.
    ///
    /// # Examples
    ///
    /// ```
    /// use sp_core::agents::AgentType;
    ///
    /// assert_eq!(AgentType::from_model_name("gemini-3-flash-preview"), AgentType::Gemini);
    /// assert_eq!(AgentType::from_model_name("mock"), AgentType::Mock);
    /// ```
    pub fn from_model_name(model: &str) -> Self {
        if model.to_lowercase().contains("gemini") {
            Self::Gemini
        } else {
            Self::Mock
        }
    }

    /// Get a human-readable name for the agent type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gemini => "Gemini",
            Self::Mock => "Mock",
        }
    }
}
