use super::{Action, DirectiveDescriptor, Effect, MessageLevel};
use crate::expr::ExprError;

/// `#error`, `#warning` and `#info`
#[derive(Debug, Default)]
pub struct MessageDirective;

impl MessageDirective {
    pub fn new() -> Self {
        Self
    }
}

impl DirectiveDescriptor for MessageDirective {
    fn id(&self) -> &'static str {
        "message"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["error", "warning", "info"]
    }

    fn parse(&self, keyword: &str, argument: &str) -> Result<Action, ExprError> {
        let level = match keyword {
            "error" => MessageLevel::Error,
            "warning" => MessageLevel::Warning,
            "info" => MessageLevel::Info,
            other => return Err(ExprError::new(format!("unknown keyword `{other}`"), 0)),
        };

        Ok(Action::Statement(Effect::Message {
            level,
            text: unquote(argument.trim()).to_string(),
        }))
    }

    fn description(&self) -> &'static str {
        "Diagnostics: #error aborts the transform, #warning and #info are reported"
    }
}

fn unquote(text: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = text.strip_prefix(quote).and_then(|t| t.strip_suffix(quote)) {
            return inner;
        }
    }
    text
}
