use serde::{Deserialize, Serialize};

/// Severity of a non-fatal message; `#error` aborts instead of producing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Informational message
    Info,
    /// Warning that doesn't prevent success
    Warning,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Info => write!(f, "info"),
            Level::Warning => write!(f, "warning"),
        }
    }
}

/// A non-fatal message raised while transforming a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Line number where the message was raised (1-based)
    pub line: usize,
    /// Severity level
    pub level: Level,
    /// Human-readable message
    pub message: String,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(line: usize, level: Level, message: impl Into<String>) -> Self {
        Self {
            line,
            level,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.line, self.level, self.message)
    }
}

impl PartialOrd for Diagnostic {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Diagnostic {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| self.level.cmp(&other.level))
            .then_with(|| self.message.cmp(&other.message))
    }
}
