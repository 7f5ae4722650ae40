//! Gemini adapter implementation using JSON-RPC via stdio.
//!
//! This adapter communicates with the Gemini CLI using a single JSON-RPC
//! `generate` request over stdin and reads newline-delimited responses from
//! stdout.

use crate::agents::base::Agent;
use crate::agents::base::AgentError;
use crate::agents::base::AgentEvent;
use crate::agents::base::AgentStream;
use crate::agents::base::StepRequest;
use crate::agents::prompt::{render_prompt, PromptBook};
use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tokio::process::Command;

/// Returned when the model answers without any text.
pub const NO_OUTPUT_TEXT: &str = "No result was generated.";

/// Gemini adapter for executing step requests using the Gemini CLI.
pub struct GeminiAdapter {
    command: String,
    model: String,
    prompts: Arc<PromptBook>,
}

impl GeminiAdapter {
    /// Create a new Gemini adapter.
    ///
    /// # Arguments
    ///
    /// * `command` - The CLI executable to spawn (e.g., "gemini-cli")
    /// * `model` - The Gemini model to use (e.g., "gemini-3-flash-preview")
    /// * `prompts` - System instructions per agent role
    pub fn new(command: String, model: String, prompts: Arc<PromptBook>) -> Self {
        Self {
            command,
            model,
            prompts,
        }
    }

    fn build_request(&self, request: &StepRequest) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: 1,
            method: "generate".to_string(),
            params: GenerateParams {
                model: self.model.clone(),
                system: self.prompts.system_instruction(&request.step.agent_name),
                prompt: render_prompt(request),
            },
        }
    }
}

#[async_trait]
impl Agent for GeminiAdapter {
    async fn check_availability(&self) -> bool {
        let cli_available = which::which(&self.command).is_ok();
        let api_key_available = std::env::var("GEMINI_API_KEY").is_ok();

        cli_available && api_key_available
    }

    async fn execute(&self, request: &StepRequest) -> Result<AgentStream, AgentError> {
        let mut child = Command::new(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                AgentError::ExecutionError(format!("Failed to spawn {}: {}", self.command, e))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| AgentError::ExecutionError("Failed to capture stdin".to_string()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AgentError::ExecutionError("Failed to capture stdout".to_string()))?;

        let request_str = serde_json::to_string(&self.build_request(request)).map_err(|e| {
            AgentError::ExecutionError(format!("Failed to serialize request: {}", e))
        })?;

        stdin
            .write_all(request_str.as_bytes())
            .await
            .map_err(|e| AgentError::ExecutionError(format!("Failed to write to stdin: {}", e)))?;
        stdin
            .write_all(b"\n")
            .await
            .map_err(|e| AgentError::ExecutionError(format!("Failed to write newline: {}", e)))?;
        stdin
            .flush()
            .await
            .map_err(|e| AgentError::ExecutionError(format!("Failed to flush stdin: {}", e)))?;

        // Close stdin to signal end of input
        drop(stdin);

        let stream = async_stream::stream! {
            let mut lines = BufReader::new(stdout).lines();
            let mut produced_text = false;

            loop {
                let line = match lines.next_line().await {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(AgentError::StreamParseError(e.to_string()));
                        return;
                    }
                };

                if line.trim().is_empty() {
                    continue;
                }

                let response = match serde_json::from_str::<JsonRpcResponse>(&line) {
                    Ok(response) => response,
                    Err(e) => {
                        yield Err(AgentError::StreamParseError(format!(
                            "Failed to parse JSON-RPC response: {} (line: {})",
                            e, line
                        )));
                        return;
                    }
                };

                match convert_gemini_response(response) {
                    Ok(Some(text)) => {
                        produced_text = true;
                        yield Ok(AgentEvent::MessageChunk(text));
                    }
                    Ok(None) => {}
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }

            let status = child.wait().await;
            if let Ok(status) = status {
                if !status.success() && !produced_text {
                    yield Err(AgentError::ExecutionError(format!(
                        "Gemini CLI exited with {}",
                        status
                    )));
                    return;
                }
            }

            if !produced_text {
                yield Ok(AgentEvent::MessageChunk(NO_OUTPUT_TEXT.to_string()));
            }
            yield Ok(AgentEvent::Completed);
        };

        Ok(Box::pin(stream))
    }
}

/// JSON-RPC request structure.
#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    id: u32,
    method: String,
    params: GenerateParams,
}

/// Parameters for the generate method.
#[derive(Debug, Serialize)]
struct GenerateParams {
    model: String,
    system: String,
    prompt: String,
}

/// JSON-RPC response structure.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

/// Extract the text of one response line, if it carries any.
fn convert_gemini_response(response: JsonRpcResponse) -> Result<Option<String>, AgentError> {
    if let Some(error) = response.error {
        return Err(AgentError::ApiError(format!(
            "Gemini API error (code {}): {}",
            error.code, error.message
        )));
    }

    let Some(result) = response.result else {
        return Ok(None);
    };

    // result.text
    if let Some(text) = result.get("text").and_then(|t| t.as_str()) {
        if !text.trim().is_empty() {
            return Ok(Some(text.to_string()));
        }
    }

    // result.parts[].text (Google AI format)
    if let Some(parts) = result.get("parts").and_then(|p| p.as_array()) {
        let text: String = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
            .collect();
        if !text.trim().is_empty() {
            return Ok(Some(text));
        }
    }

    // result.content
    if let Some(content) = result.get("content").and_then(|c| c.as_str()) {
        if !content.trim().is_empty() {
            return Ok(Some(content.to_string()));
        }
    }

    Ok(None)
}
