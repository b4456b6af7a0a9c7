use crate::expr::ExprError;
use thiserror::Error;

/// Fatal error for a single transform call; no partial output is produced
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// `#elif`/`#else` with no open block
    #[error("{file}:{line}: #{keyword} without matching #if")]
    UnexpectedContinue {
        file: String,
        line: usize,
        keyword: String,
    },

    /// `#endif` with no open block
    #[error("{file}:{line}: #{keyword} without matching #if")]
    UnexpectedClose {
        file: String,
        line: usize,
        keyword: String,
    },

    /// Block still open at end of input; `line` is where it was opened
    #[error("{file}:{line}: #{keyword} is never closed")]
    Unclosed {
        file: String,
        line: usize,
        keyword: String,
    },

    /// Directive argument failed to parse
    #[error("{file}:{line}: invalid directive `{text}`: {source}")]
    InvalidDirective {
        file: String,
        line: usize,
        text: String,
        #[source]
        source: ExprError,
    },

    /// An active `#error` directive
    #[error("{file}:{line}: #error {message}")]
    ErrorDirective {
        file: String,
        line: usize,
        message: String,
    },
}

impl TransformError {
    /// File identifier the error occurred in
    pub fn file(&self) -> &str {
        match self {
            TransformError::UnexpectedContinue { file, .. }
            | TransformError::UnexpectedClose { file, .. }
            | TransformError::Unclosed { file, .. }
            | TransformError::InvalidDirective { file, .. }
            | TransformError::ErrorDirective { file, .. } => file,
        }
    }

    /// Line number (1-based)
    pub fn line(&self) -> usize {
        match self {
            TransformError::UnexpectedContinue { line, .. }
            | TransformError::UnexpectedClose { line, .. }
            | TransformError::Unclosed { line, .. }
            | TransformError::InvalidDirective { line, .. }
            | TransformError::ErrorDirective { line, .. } => *line,
        }
    }

    /// Whether this is a block-nesting error
    pub fn is_nesting(&self) -> bool {
        matches!(
            self,
            TransformError::UnexpectedContinue { .. }
                | TransformError::UnexpectedClose { .. }
                | TransformError::Unclosed { .. }
        )
    }
}
