//! Interactive pipeline session.
//!
//! Spawns the session manager, prints events as they arrive, asks the user
//! to resolve every review checkpoint, and writes the exports when the run
//! completes.

use std::path::PathBuf;
use std::sync::Arc;

use color_eyre::eyre::{bail, eyre, Result};
use colored::Colorize;
use sp_core::agents::adapters::MockAgent;
use sp_core::agents::factory::AgentFactory;
use sp_core::agents::manager::AgentManager;
use sp_core::config::models::AppConfig;
use sp_core::engine::PipelineEngine;
use sp_core::export::{
    full_report, full_report_file_name, step_export, step_file_name, write_export,
    MANUSCRIPT_STEP_ID,
};
use sp_core::registry::StepRegistry;
use sp_core::state::manager::{SessionHandle, SessionManager};
use sp_protocol::ipc::Event;
use sp_protocol::session_models::{PipelineInput, SessionState};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;

pub struct RunOptions {
    pub auto_approve: bool,
    pub mock: bool,
    /// Write every completed step, not only the manuscript.
    pub each_step: bool,
    pub output_dir: PathBuf,
}

/// What the user typed at a review checkpoint.
#[derive(Debug, PartialEq, Eq)]
pub enum GateCommand {
    Approve,
    Revise(Option<String>),
    Feedback(String),
    Quit,
    Unknown(String),
}

/// Parse a reply at a checkpoint.
///
/// An empty line or `a` approves, `r [text]` requests a revision,
/// `f <text>` stores feedback for a later revision and `q` quits.
pub fn parse_gate_command(line: &str) -> GateCommand {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    let text = (!rest.is_empty()).then(|| rest.to_string());

    match head.to_lowercase().as_str() {
        "" | "a" | "approve" => GateCommand::Approve,
        "r" | "revise" => GateCommand::Revise(text),
        "f" | "feedback" => match text {
            Some(text) => GateCommand::Feedback(text),
            None => GateCommand::Unknown(line.to_string()),
        },
        "q" | "quit" => GateCommand::Quit,
        _ => GateCommand::Unknown(line.to_string()),
    }
}

pub async fn run(config: &AppConfig, input: PipelineInput, options: RunOptions) -> Result<()> {
    let registry = config.registry()?;
    let manager = if options.mock {
        AgentManager::new(Arc::new(MockAgent::drafting()))
    } else {
        AgentFactory::build_manager(config).map_err(|e| eyre!(e))?
    };

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let engine =
        PipelineEngine::new(registry.clone(), manager, events_tx).with_pacing(config.global.pacing);
    let handle = SessionManager::spawn(engine);

    println!(
        "{} {} ({} steps)",
        "Sermon pipeline:".bold(),
        input.passage,
        registry.len()
    );
    handle.start(input.clone()).await?;

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    while let Some(event) = events_rx.recv().await {
        if let Some(line) = crate::render::event_line(&event) {
            println!("{line}");
        }

        match event {
            Event::GateOpened { .. } => {
                if options.auto_approve {
                    handle.approve().await?;
                } else if !resolve_gate(&handle, &mut stdin).await? {
                    handle.shutdown().await;
                    println!("{}", "Stopped.".yellow());
                    return Ok(());
                }
            }
            Event::PipelineCompleted { .. } => {
                let session = handle.snapshot();
                handle.shutdown().await;
                export(&input, &registry, &session, &options)?;
                return Ok(());
            }
            Event::PipelineFailed {
                step_index, error, ..
            } => {
                tracing::warn!(step_index, %error, "run halted");
                handle.shutdown().await;
                bail!("The pipeline halted at step {}", step_index + 1);
            }
            Event::OpRejected { reason } => tracing::warn!(%reason, "operation rejected"),
            _ => {}
        }
    }

    bail!("The session ended unexpectedly")
}

/// Prompt until the user resolves the open gate.
///
/// Returns `false` when the user quits.
async fn resolve_gate(handle: &SessionHandle, stdin: &mut Lines<BufReader<Stdin>>) -> Result<bool> {
    loop {
        println!(
            "{}",
            "[Enter/a] approve  [r <text>] revise  [f <text>] set feedback  [q] quit".dimmed()
        );
        let Some(line) = stdin.next_line().await? else {
            return Ok(false);
        };

        match parse_gate_command(&line) {
            GateCommand::Approve => {
                handle.approve().await?;
                return Ok(true);
            }
            GateCommand::Revise(text) => {
                handle.request_revision(text).await?;
                return Ok(true);
            }
            GateCommand::Feedback(text) => {
                handle.update_feedback(text).await?;
                println!("{}", "Feedback saved. Use r to revise with it.".dimmed());
            }
            GateCommand::Quit => return Ok(false),
            GateCommand::Unknown(text) => println!("{} {}", "Unknown command:".red(), text),
        }
    }
}

fn export(
    input: &PipelineInput,
    registry: &StepRegistry,
    session: &SessionState,
    options: &RunOptions,
) -> Result<()> {
    let dir = options.output_dir.as_path();
    let report = full_report(input, registry, session);
    let path = write_export(dir, &full_report_file_name(input), &report)?;
    println!("{} {}", "Saved".green(), path.display());

    let mut written = 1;
    for (index, step) in registry.iter().enumerate() {
        if !options.each_step && step.id != MANUSCRIPT_STEP_ID {
            continue;
        }
        // Steps without a result are skipped.
        let Ok(content) = step_export(session, index) else {
            continue;
        };
        let path = write_export(dir, &step_file_name(&step.id, input), &content)?;
        println!("{} {}", "Saved".green(), path.display());
        written += 1;
    }

    tracing::info!(dir = %dir.display(), files = written, "exports written");
    Ok(())
}
