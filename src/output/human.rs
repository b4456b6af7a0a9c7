use super::OutputFormatter;
use crate::driver::{FileReport, Outcome};
use crate::driver::report::RunStats;
use crate::engine::Level;
use std::io::IsTerminal;
use std::path::Path;

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const GREEN: &str = "\x1b[32m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Human-readable output formatter
#[derive(Debug, Default)]
pub struct HumanFormatter {
    use_colors: bool,
}

impl HumanFormatter {
    /// Create a new human formatter
    pub fn new() -> Self {
        Self {
            use_colors: Self::should_use_colors(),
        }
    }

    /// Create a new human formatter with explicit color setting
    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Reports go to stderr, so color follows stderr
    fn should_use_colors() -> bool {
        std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn format_level(&self, level: Level) -> String {
        let color = match level {
            Level::Warning => YELLOW,
            Level::Info => CYAN,
        };
        self.paint(color, &level.to_string())
    }

    fn format_path(&self, path: &Path) -> String {
        self.paint(BOLD, &path.display().to_string())
    }

    fn format_report(&self, report: &FileReport) -> Option<Vec<String>> {
        match &report.outcome {
            Outcome::Transformed(output) => {
                let mut lines = vec![format!(
                    "{}: {} ({} of {} lines removed)",
                    self.format_path(&report.path),
                    self.paint(GREEN, "transformed"),
                    output.removed,
                    output.lines
                )];
                for diagnostic in &output.diagnostics {
                    lines.push(format!(
                        "  {}: {}: {}",
                        diagnostic.line,
                        self.format_level(diagnostic.level),
                        diagnostic.message
                    ));
                }
                Some(lines)
            }
            Outcome::Failed(error) => Some(vec![
                format!("{}: {}", self.format_path(&report.path), self.paint(RED, "failed")),
                format!("  {}", error),
            ]),
            Outcome::Unreadable(message) => Some(vec![
                format!("{}: {}", self.format_path(&report.path), self.paint(RED, "unreadable")),
                format!("  {}", message),
            ]),
            Outcome::Unchanged | Outcome::Skipped => None,
        }
    }

    fn format_stats(&self, stats: &RunStats) -> String {
        let mut parts = Vec::new();
        if stats.transformed > 0 {
            parts.push(format!("{} transformed", stats.transformed));
        }
        if stats.unchanged > 0 {
            parts.push(format!("{} unchanged", stats.unchanged));
        }
        if stats.skipped > 0 {
            parts.push(format!("{} skipped", stats.skipped));
        }
        if stats.failed > 0 {
            parts.push(self.paint(RED, &format!("{} failed", stats.failed)));
        }

        let files = format!(
            "Processed {} file{}",
            stats.total_files,
            if stats.total_files == 1 { "" } else { "s" }
        );
        if parts.is_empty() {
            files
        } else {
            format!("{}: {}", files, parts.join(", "))
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_reports(&self, reports: &[FileReport]) -> String {
        let stats = RunStats::from_reports(reports);
        let mut output: Vec<String> = reports.iter().filter_map(|r| self.format_report(r)).flatten().collect();
        output.push(self.format_stats(&stats));
        output.join("\n")
    }
}
