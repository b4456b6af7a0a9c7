use crate::engine::{Level, TransformError, TransformOutput};
use std::path::{Path, PathBuf};

/// What happened to one file
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Directives were resolved; holds the new text
    Transformed(TransformOutput),
    /// No directives; the file is left as is
    Unchanged,
    /// Excluded by the path filter, or not UTF-8 text
    Skipped,
    /// Malformed directives or an active `#error`
    Failed(TransformError),
    /// The file could not be read
    Unreadable(String),
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Transformed(_) => "transformed",
            Outcome::Unchanged => "unchanged",
            Outcome::Skipped => "skipped",
            Outcome::Failed(_) => "failed",
            Outcome::Unreadable(_) => "unreadable",
        }
    }
}

/// Result of processing one file
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: Outcome,
}

impl FileReport {
    pub fn new(path: impl AsRef<Path>, outcome: Outcome) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            outcome,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_) | Outcome::Unreadable(_))
    }

    /// New text for the file, if it changed
    pub fn code(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Transformed(output) => Some(&output.code),
            _ => None,
        }
    }
}

/// Statistics about a run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub total_files: usize,
    pub transformed: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
    pub removed_lines: usize,
    pub warnings: usize,
    pub info: usize,
}

impl RunStats {
    /// Calculate statistics from file reports
    pub fn from_reports(reports: &[FileReport]) -> Self {
        let mut stats = Self {
            total_files: reports.len(),
            ..Self::default()
        };

        for report in reports {
            match &report.outcome {
                Outcome::Transformed(output) => {
                    stats.transformed += 1;
                    stats.removed_lines += output.removed;
                    for diagnostic in &output.diagnostics {
                        match diagnostic.level {
                            Level::Warning => stats.warnings += 1,
                            Level::Info => stats.info += 1,
                        }
                    }
                }
                Outcome::Unchanged => stats.unchanged += 1,
                Outcome::Skipped => stats.skipped += 1,
                Outcome::Failed(_) | Outcome::Unreadable(_) => stats.failed += 1,
            }
        }

        stats
    }

    /// Check if any file failed
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
