//! Block resolution: walks tagged lines once and decides which ones survive.

use super::{Diagnostic, Level, TransformError};
use crate::directives::{Action, Effect, MessageLevel};
use crate::env::{Environment, Scope, Value};
use crate::scanner::{Directive, TaggedLine};
use tracing::{info, trace, warn};

/// One open conditional block
#[derive(Debug, Clone)]
struct BlockFrame {
    /// Family that opened the block
    descriptor: &'static str,
    keyword: String,
    /// Line the block was opened on (1-based)
    opened_at: usize,
    /// Whether every enclosing block is active
    parent_active: bool,
    /// Whether the current arm is active
    active: bool,
    /// Whether some arm of this chain has already matched
    resolved: bool,
}

/// Per-line verdicts and the messages raised while resolving
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub verdicts: Vec<bool>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Resolution {
    /// Number of lines that do not survive
    pub fn removed(&self) -> usize {
        self.verdicts.iter().filter(|v| !**v).count()
    }
}

/// Stack-based resolver for one transform call
pub struct BlockResolver<'a> {
    file: &'a str,
    scope: Scope<'a>,
    stack: Vec<BlockFrame>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> BlockResolver<'a> {
    pub fn new(file: &'a str, env: &'a Environment) -> Self {
        Self {
            file,
            scope: Scope::new(env),
            stack: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Resolve every line; fails on the first nesting error or active `#error`
    pub fn resolve(mut self, lines: &[TaggedLine<'_>]) -> Result<Resolution, TransformError> {
        let mut verdicts = Vec::with_capacity(lines.len());

        for line in lines {
            let verdict = match &line.directive {
                None => self.is_active(),
                Some(directive) => {
                    self.apply(line.number, directive)?;
                    false
                }
            };
            verdicts.push(verdict);
        }

        if let Some(frame) = self.stack.last() {
            return Err(TransformError::Unclosed {
                file: self.file.to_string(),
                line: frame.opened_at,
                keyword: frame.keyword.clone(),
            });
        }

        Ok(Resolution {
            verdicts,
            diagnostics: self.diagnostics,
        })
    }

    fn is_active(&self) -> bool {
        self.stack.iter().all(|frame| frame.active)
    }

    fn apply(&mut self, line: usize, directive: &Directive) -> Result<(), TransformError> {
        match &directive.action {
            Action::Open { guard } => {
                let parent_active = self.is_active();
                let matched = guard.test(&self.scope);
                trace!(file = self.file, line, keyword = %directive.keyword, matched, "open block");
                self.stack.push(BlockFrame {
                    descriptor: directive.descriptor,
                    keyword: directive.keyword.clone(),
                    opened_at: line,
                    parent_active,
                    active: parent_active && matched,
                    resolved: matched,
                });
            }
            Action::Continue { guard } => {
                let Some(frame) = self.stack.last() else {
                    return Err(TransformError::UnexpectedContinue {
                        file: self.file.to_string(),
                        line,
                        keyword: directive.keyword.clone(),
                    });
                };

                let matched = if frame.resolved {
                    false
                } else {
                    match guard {
                        Some(guard) => guard.test(&self.scope),
                        None => true,
                    }
                };
                trace!(file = self.file, line, keyword = %directive.keyword, matched, "continue block");

                if let Some(frame) = self.stack.last_mut() {
                    frame.active = frame.parent_active && matched;
                    frame.resolved |= matched || guard.is_none();
                }
            }
            Action::Close => {
                let Some(frame) = self.stack.pop() else {
                    return Err(TransformError::UnexpectedClose {
                        file: self.file.to_string(),
                        line,
                        keyword: directive.keyword.clone(),
                    });
                };
                if frame.descriptor != directive.descriptor {
                    trace!(
                        file = self.file,
                        line,
                        opened = frame.descriptor,
                        closed = directive.descriptor,
                        "block closed by a different directive family"
                    );
                }
            }
            Action::Statement(effect) => {
                if self.is_active() {
                    self.apply_effect(line, effect)?;
                }
            }
        }

        Ok(())
    }

    fn apply_effect(&mut self, line: usize, effect: &Effect) -> Result<(), TransformError> {
        match effect {
            Effect::Define { name, value } => {
                let value = value.as_ref().map(|v| v.eval(&self.scope)).unwrap_or(Value::Bool(true));
                trace!(file = self.file, line, name = %name, value = %value, "define");
                self.scope.define(name.clone(), value);
            }
            Effect::Undefine { name } => {
                trace!(file = self.file, line, name = %name, "undef");
                self.scope.undefine(name.clone());
            }
            Effect::Message { level, text } => {
                let level = match level {
                    MessageLevel::Error => {
                        return Err(TransformError::ErrorDirective {
                            file: self.file.to_string(),
                            line,
                            message: text.clone(),
                        });
                    }
                    MessageLevel::Warning => {
                        warn!(file = self.file, line, "{}", text);
                        Level::Warning
                    }
                    MessageLevel::Info => {
                        info!(file = self.file, line, "{}", text);
                        Level::Info
                    }
                };
                self.diagnostics.push(Diagnostic::new(line, level, text.clone()));
            }
        }
        Ok(())
    }
}
