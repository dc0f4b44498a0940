//! CLI display utilities for formatting the run summary

use crate::queue::api::QueueStats;
use colored::Colorize;
use std::time::Duration;

/// How a demo run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every produced item reached the handler
    Drained,
    /// The queue was disposed before it drained
    Disposed,
    /// A shutdown signal interrupted the run
    Interrupted,
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Drained => 0,
            RunOutcome::Disposed => 1,
            RunOutcome::Interrupted => 130,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            RunOutcome::Drained => "drained",
            RunOutcome::Disposed => "disposed",
            RunOutcome::Interrupted => "interrupted",
        }
    }
}

const LABEL_WIDTH: usize = 10;

/// Render the end-of-run summary
pub fn format_summary(
    queue_name: &str,
    stats: &QueueStats,
    outcome: RunOutcome,
    elapsed: Duration,
    use_color: bool,
) -> String {
    let outcome_text = if use_color {
        match outcome {
            RunOutcome::Drained => outcome.label().green().bold().to_string(),
            RunOutcome::Disposed => outcome.label().yellow().bold().to_string(),
            RunOutcome::Interrupted => outcome.label().red().bold().to_string(),
        }
    } else {
        outcome.label().to_string()
    };
    let title = format!("Queue '{}'", queue_name);
    let title = if use_color {
        title.cyan().to_string()
    } else {
        title
    };

    let rows = [
        ("enqueued", stats.enqueued.to_string()),
        ("processed", stats.processed.to_string()),
        ("failed", stats.failed.to_string()),
        ("rejected", stats.rejected.to_string()),
        ("abandoned", stats.abandoned.to_string()),
        ("elapsed", format!("{:.2?}", elapsed)),
    ];

    let mut out = format!("{} {}\n", title, outcome_text);
    for (label, value) in rows {
        let label = format!("{:<width$}", label, width = LABEL_WIDTH);
        let label = if use_color {
            label.blue().to_string()
        } else {
            label
        };
        out.push_str(&format!("  {} {}\n", label, value));
    }
    out
}

pub fn print_summary(
    queue_name: &str,
    stats: &QueueStats,
    outcome: RunOutcome,
    elapsed: Duration,
    use_color: bool,
) {
    print!(
        "{}",
        format_summary(queue_name, stats, outcome, elapsed, use_color)
    );
}
