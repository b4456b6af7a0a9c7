use super::{Action, DirectiveDescriptor, Effect, split_symbol};
use crate::expr::{self, ExprError};

/// `#define NAME [=] [expr]` and `#undef NAME`
#[derive(Debug, Default)]
pub struct DefineDirective;

impl DefineDirective {
    pub fn new() -> Self {
        Self
    }
}

impl DirectiveDescriptor for DefineDirective {
    fn id(&self) -> &'static str {
        "define"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["define", "undef"]
    }

    fn parse(&self, keyword: &str, argument: &str) -> Result<Action, ExprError> {
        let (name, rest) = split_symbol(argument).ok_or_else(|| ExprError::new("expected identifier", 0))?;

        let effect = match keyword {
            "define" => {
                let rest = rest.strip_prefix('=').map(str::trim_start).unwrap_or(rest);
                let value = if rest.is_empty() { None } else { Some(expr::parse(rest)?) };
                Effect::Define {
                    name: name.to_string(),
                    value,
                }
            }
            "undef" => {
                if !rest.is_empty() {
                    return Err(ExprError::new("unexpected trailing input", name.len()));
                }
                Effect::Undefine { name: name.to_string() }
            }
            other => return Err(ExprError::new(format!("unknown keyword `{other}`"), 0)),
        };

        Ok(Action::Statement(effect))
    }

    fn description(&self) -> &'static str {
        "Transform-local symbols: #define, #undef"
    }
}
