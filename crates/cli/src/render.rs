//! Terminal rendering of events and step tables.

use colored::{ColoredString, Colorize};
use sp_core::registry::StepRegistry;
use sp_protocol::ipc::Event;
use sp_protocol::session_models::{LogEntry, LogKind};

/// One line for an event, or `None` for events that are not printed.
pub fn event_line(event: &Event) -> Option<String> {
    match event {
        Event::LogAppended { entry, .. } => Some(log_line(entry)),
        Event::GateOpened { stage, .. } => Some(format!(
            "\n{} {}\n{}",
            format!("[{}]", stage.label()).yellow().bold(),
            "Review checkpoint".yellow(),
            stage.prompt()
        )),
        Event::PipelineCompleted { quality_score, .. } => Some(format!(
            "{} quality score {:.1}",
            "Completed.".green().bold(),
            quality_score
        )),
        Event::PipelineFailed {
            step_index, error, ..
        } => Some(format!(
            "{} step {} failed: {}",
            "Failed.".red().bold(),
            step_index + 1,
            error
        )),
        Event::OpRejected { reason } => Some(format!("{} {}", "Rejected:".red(), reason)),
        Event::SessionStarted { .. }
        | Event::StepStatusUpdate { .. }
        | Event::GateResolved { .. }
        | Event::Snapshot { .. } => None,
    }
}

/// `HH:MM:SS [agent] message`, colored by kind.
pub fn log_line(entry: &LogEntry) -> String {
    format!(
        "{} {} {}",
        entry.timestamp.format("%H:%M:%S").to_string().dimmed(),
        format!("[{}]", entry.agent).bold(),
        paint(&entry.message, entry.kind)
    )
}

fn paint(message: &str, kind: LogKind) -> ColoredString {
    match kind {
        LogKind::Info => message.normal(),
        LogKind::Success => message.green(),
        LogKind::Warning => message.yellow(),
        LogKind::Error => message.red(),
        LogKind::Thinking => message.cyan(),
        LogKind::Tool => message.magenta(),
        LogKind::Agent => message.blue(),
    }
}

/// Numbered table of the registry: index, phase, wave, agent and checkpoint.
pub fn step_table(registry: &StepRegistry) -> String {
    registry
        .iter()
        .enumerate()
        .map(|(i, step)| {
            let wave = step.wave.map(|w| format!("W{w}")).unwrap_or_default();
            let review = step
                .review
                .map(|stage| format!("  [{}]", stage.label()))
                .unwrap_or_default();
            format!(
                "{:>2}. {:<15} {:<3} {:<28} {}{}\n",
                i + 1,
                step.phase.as_str(),
                wave,
                step.agent_name,
                step.description,
                review
            )
        })
        .collect()
}
