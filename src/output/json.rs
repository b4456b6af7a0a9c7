use super::OutputFormatter;
use crate::driver::report::RunStats;
use crate::driver::{FileReport, Outcome};
use crate::engine::Diagnostic;
use serde::{Deserialize, Serialize};

/// JSON output formatter
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self
    }
}

/// JSON representation of a run
#[derive(Debug, Serialize, Deserialize)]
struct JsonOutput {
    stats: JsonStats,
    files: Vec<JsonFileResult>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonStats {
    total_files: usize,
    transformed: usize,
    unchanged: usize,
    skipped: usize,
    failed: usize,
    removed_lines: usize,
}

impl From<&RunStats> for JsonStats {
    fn from(stats: &RunStats) -> Self {
        Self {
            total_files: stats.total_files,
            transformed: stats.transformed,
            unchanged: stats.unchanged,
            skipped: stats.skipped,
            failed: stats.failed,
            removed_lines: stats.removed_lines,
        }
    }
}

/// JSON representation of a single file
#[derive(Debug, Serialize, Deserialize)]
struct JsonFileResult {
    path: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    removed: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    diagnostics: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonError>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonError {
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
    message: String,
}

impl From<&FileReport> for JsonFileResult {
    fn from(report: &FileReport) -> Self {
        let mut result = Self {
            path: report.path.display().to_string(),
            status: report.outcome.label().to_string(),
            removed: None,
            diagnostics: Vec::new(),
            error: None,
        };

        match &report.outcome {
            Outcome::Transformed(output) => {
                result.removed = Some(output.removed);
                result.diagnostics = output.diagnostics.clone();
            }
            Outcome::Failed(error) => {
                result.error = Some(JsonError {
                    line: Some(error.line()),
                    message: error.to_string(),
                });
            }
            Outcome::Unreadable(message) => {
                result.error = Some(JsonError {
                    line: None,
                    message: message.clone(),
                });
            }
            Outcome::Unchanged | Outcome::Skipped => {}
        }

        result
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_reports(&self, reports: &[FileReport]) -> String {
        let stats = RunStats::from_reports(reports);

        let json_output = JsonOutput {
            stats: JsonStats::from(&stats),
            files: reports.iter().map(JsonFileResult::from).collect(),
        };

        serde_json::to_string_pretty(&json_output)
            .unwrap_or_else(|e| format!(r#"{{"error": "Failed to serialize JSON: {e}"}}"#))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Level, TransformError, TransformOutput};

    #[test]
    fn test_json_formatter_empty() {
        let output = JsonFormatter::new().format_reports(&[]);
        let parsed: JsonOutput = serde_json::from_str(&output).expect("Invalid JSON");

        assert_eq!(parsed.stats.total_files, 0);
        assert!(parsed.files.is_empty());
    }

    #[test]
    fn test_json_formatter_with_reports() {
        let reports = vec![
            FileReport::new(
                "app.js",
                Outcome::Transformed(TransformOutput {
                    code: "x".to_string(),
                    diagnostics: vec![Diagnostic::new(2, Level::Info, "dev build")],
                    lines: 4,
                    directives: 2,
                    removed: 3,
                }),
            ),
            FileReport::new("skip.css", Outcome::Skipped),
            FileReport::new(
                "bad.js",
                Outcome::Failed(TransformError::Unclosed {
                    file: "bad.js".to_string(),
                    line: 7,
                    keyword: "if".to_string(),
                }),
            ),
        ];

        let output = JsonFormatter::new().format_reports(&reports);
        let parsed: JsonOutput = serde_json::from_str(&output).expect("Invalid JSON");

        assert_eq!(parsed.stats.total_files, 3);
        assert_eq!(parsed.stats.transformed, 1);
        assert_eq!(parsed.stats.skipped, 1);
        assert_eq!(parsed.stats.failed, 1);
        assert_eq!(parsed.stats.removed_lines, 3);

        let first = &parsed.files[0];
        assert_eq!(first.status, "transformed");
        assert_eq!(first.removed, Some(3));
        assert_eq!(first.diagnostics, vec![Diagnostic::new(2, Level::Info, "dev build")]);

        assert_eq!(parsed.files[1].status, "skipped");
        assert!(parsed.files[1].error.is_none());

        let error = parsed.files[2].error.as_ref().expect("Missing error");
        assert_eq!(error.line, Some(7));
        assert_eq!(error.message, "bad.js:7: #if is never closed");
    }

    #[test]
    fn test_json_unreadable() {
        let reports = vec![FileReport::new("locked.js", Outcome::Unreadable("Permission denied".to_string()))];
        let output = JsonFormatter::new().format_reports(&reports);
        let parsed: JsonOutput = serde_json::from_str(&output).expect("Invalid JSON");

        assert_eq!(parsed.stats.failed, 1);
        assert_eq!(parsed.files[0].status, "unreadable");
        let error = parsed.files[0].error.as_ref().expect("Missing error");
        assert_eq!(error.line, None);
        assert_eq!(error.message, "Permission denied");
    }

    #[test]
    fn test_json_skips_empty_fields() {
        let output = JsonFormatter::new().format_reports(&[FileReport::new("a.js", Outcome::Unchanged)]);
        assert!(!output.contains("diagnostics"));
        assert!(!output.contains("\"error\""));
    }
}
