//! Agent abstraction and management.
//!
//! This module provides the `Agent` trait (Adapter Pattern), prompt
//! construction, and the `AgentManager` that resolves a step's role to an
//! agent implementation.

pub mod adapters;
pub mod agent_type;
pub mod base;
pub mod factory;
pub mod manager;
pub mod prompt;

pub use adapters::MockAgent;
pub use agent_type::AgentType;
pub use base::{Agent, AgentError, AgentEvent, AgentStream, StepRequest};
pub use factory::AgentFactory;
pub use manager::AgentManager;
