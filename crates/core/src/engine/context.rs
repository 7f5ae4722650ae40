//! Context accumulation.
//!
//! Every step receives the labeled results of the steps before it. The
//! context is rebuilt on every invocation because a revision may have
//! replaced an earlier result.

use sp_protocol::step_models::{StepDefinition, StepRuntime};

/// Separator between two labeled result blocks.
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// Build the context for the step at `cursor`.
///
/// Returns the `"[<agent name>]\n<result>"` blocks of every step with an
/// index below `cursor` that holds a result, in registry order, joined by
/// blank lines. Steps without a result contribute nothing.
pub fn accumulate_context(
    definitions: &[StepDefinition],
    runtimes: &[StepRuntime],
    cursor: usize,
) -> String {
    definitions
        .iter()
        .zip(runtimes)
        .take(cursor)
        .filter_map(|(definition, runtime)| {
            runtime
                .result
                .as_deref()
                .map(|result| format!("[{}]\n{}", definition.agent_name, result))
        })
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}
