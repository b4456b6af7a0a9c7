pub mod human;
pub mod json;

use crate::driver::FileReport;
use clap::ValueEnum;

/// Output format for the run report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Trait for formatting run reports
pub trait OutputFormatter {
    /// Format the per-file reports for output
    fn format_reports(&self, reports: &[FileReport]) -> String;
}

/// Get the appropriate formatter for the given format
pub fn get_formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Human => Box::new(human::HumanFormatter::new()),
        OutputFormat::Json => Box::new(json::JsonFormatter::new()),
    }
}
