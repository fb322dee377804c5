//! Research progress on stderr

use std::io::{self, Write};
use sutta_agent_core::{ResearchPhase, ResearchProgress};

/// Renders each research phase transition on a single, rewritten line
pub struct ProgressReporter;

impl ProgressReporter {
    pub fn report(progress: &ResearchProgress) {
        let line = match progress.phase {
            ResearchPhase::Search | ResearchPhase::Analyze => format!(
                "[{}/{}] {}",
                progress.iteration, progress.max_iterations, progress.message
            ),
            _ => progress.message.clone(),
        };

        if progress.phase == ResearchPhase::Complete {
            eprintln!("\r{:<70}", line);
        } else {
            eprint!("\r{:<70}", truncate(&line, 70));
            io::stderr().flush().ok();
        }
    }
}

fn truncate(line: &str, width: usize) -> String {
    if line.chars().count() <= width {
        line.to_string()
    } else {
        let cut: String = line.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
