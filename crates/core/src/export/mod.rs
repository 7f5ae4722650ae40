//! Markdown export of step results.
//!
//! Rendering is pure; [`write_export`] is the only function that touches
//! the filesystem.

use crate::registry::StepRegistry;
use sp_protocol::session_models::{PipelineInput, SessionState};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Id of the step whose result is the sermon manuscript.
pub const MANUSCRIPT_STEP_ID: &str = "sermon-writer";

const RULE: &str = "---";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Step {0} has no result to export")]
    NoResult(usize),

    #[error("Failed to create export directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write export file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Render every available result as one markdown report, in step order.
pub fn full_report(input: &PipelineInput, registry: &StepRegistry, session: &SessionState) -> String {
    let mut report = format!("# Sermon Research Report: {}\n", input.passage);
    report.push_str(&format!("**Theme:** {}\n", input.theme));
    report.push_str(&format!("**Audience:** {}\n", input.audience));
    report.push_str(&format!("**Type:** {}\n\n", input.sermon_type));
    report.push_str(&format!("{RULE}\n\n"));

    for (step, runtime) in registry.iter().zip(&session.steps) {
        if let Some(result) = &runtime.result {
            report.push_str(&format!("## {} ({})\n", step.agent_name, step.phase));
            report.push_str(&format!("{}\n\n", result));
            report.push_str(&format!("{RULE}\n\n"));
        }
    }

    report
}

/// The result of a single step, unchanged.
pub fn step_export(session: &SessionState, index: usize) -> ExportResult<String> {
    session
        .steps
        .get(index)
        .and_then(|runtime| runtime.result.clone())
        .ok_or(ExportError::NoResult(index))
}

/// `Full-Report-<passage>.md`
pub fn full_report_file_name(input: &PipelineInput) -> String {
    format!("Full-Report-{}.md", dashed(&input.passage))
}

/// `<step id>-<passage>.md`, or `Sermon-Manuscript-<passage>.md` for the
/// manuscript step.
pub fn step_file_name(step_id: &str, input: &PipelineInput) -> String {
    if step_id == MANUSCRIPT_STEP_ID {
        format!("Sermon-Manuscript-{}.md", dashed(&input.passage))
    } else {
        format!("{}-{}.md", step_id, dashed(&input.passage))
    }
}

/// Write `content` to `dir/file_name`, creating `dir` if needed.
///
/// Returns the path of the written file.
pub fn write_export(dir: &Path, file_name: &str, content: &str) -> ExportResult<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|source| ExportError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(file_name);
    std::fs::write(&path, content).map_err(|source| ExportError::Write {
        path: path.clone(),
        source,
    })?;

    tracing::debug!(path = %path.display(), bytes = content.len(), "export written");
    Ok(path)
}

/// Replace every run of whitespace with a single dash, including leading
/// and trailing runs.
fn dashed(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('-');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}
