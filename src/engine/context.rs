use super::{Diagnostic, TransformError, emitter, resolver::BlockResolver};
use crate::directives::DirectiveRegistry;
use crate::env::Environment;
use crate::scanner::LineScanner;
use tracing::{debug, instrument};

/// Options for building a [`Context`]
#[derive(Debug)]
pub struct ContextOptions {
    /// Directive families, tried in order
    pub directives: DirectiveRegistry,
    /// Blank removed lines instead of dropping them
    pub preserve_line_numbers: bool,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            directives: DirectiveRegistry::with_default_directives(),
            preserve_line_numbers: false,
        }
    }
}

/// Result of a transform that changed something
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutput {
    pub code: String,
    /// Messages raised by `#warning` / `#info`
    pub diagnostics: Vec<Diagnostic>,
    /// Number of input lines
    pub lines: usize,
    /// Number of directive lines seen
    pub directives: usize,
    /// Number of input lines that did not survive (directive lines included)
    pub removed: usize,
}

/// Owns the environment and directive families; runs transforms
#[derive(Debug)]
pub struct Context {
    /// Symbols visible to guard expressions; set these before calling `transform`
    pub env: Environment,
    registry: DirectiveRegistry,
    scanner: LineScanner,
    preserve_line_numbers: bool,
}

impl Context {
    /// Create a new context with an empty environment
    pub fn new(options: ContextOptions) -> Self {
        Self {
            env: Environment::new(),
            registry: options.directives,
            scanner: LineScanner::new(),
            preserve_line_numbers: options.preserve_line_numbers,
        }
    }

    /// Create a context with the built-in directive families
    pub fn with_default_directives() -> Self {
        Self::new(ContextOptions::default())
    }

    pub fn registry(&self) -> &DirectiveRegistry {
        &self.registry
    }

    pub fn preserve_line_numbers(&self) -> bool {
        self.preserve_line_numbers
    }

    pub fn set_preserve_line_numbers(&mut self, preserve: bool) {
        self.preserve_line_numbers = preserve;
    }

    /// Transform `source`; `Ok(None)` means the text has no directives and is unchanged
    pub fn transform(&self, source: &str, file: &str) -> Result<Option<String>, TransformError> {
        Ok(self.transform_with_report(source, file)?.map(|output| output.code))
    }

    /// Transform `source` and report what happened
    #[instrument(level = "debug", skip(self, source))]
    pub fn transform_with_report(
        &self,
        source: &str,
        file: &str,
    ) -> Result<Option<TransformOutput>, TransformError> {
        let scanned = self.scanner.scan(source, file, &self.registry)?;
        let directives = scanned.directive_count();
        if directives == 0 {
            debug!(lines = scanned.lines.len(), "no directives");
            return Ok(None);
        }

        let resolution = BlockResolver::new(file, &self.env).resolve(&scanned.lines)?;
        let code = emitter::emit(&scanned, &resolution.verdicts, self.preserve_line_numbers);

        let output = TransformOutput {
            code,
            lines: scanned.lines.len(),
            directives,
            removed: resolution.removed(),
            diagnostics: resolution.diagnostics,
        };
        debug!(
            lines = output.lines,
            directives = output.directives,
            removed = output.removed,
            "transformed"
        );
        Ok(Some(output))
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::with_default_directives()
    }
}
