//! Agent adapter implementations.

mod gemini_adapter;
pub mod mock_agent;

pub use gemini_adapter::{GeminiAdapter, NO_OUTPUT_TEXT};
pub use mock_agent::MockAgent;
