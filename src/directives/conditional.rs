use super::{Action, DirectiveDescriptor, split_symbol};
use crate::expr::{self, Expr, ExprError, UnaryOp};

/// The `#if` / `#elif` / `#else` / `#endif` family, plus `#ifdef` and `#ifndef`
#[derive(Debug, Default)]
pub struct IfDirective;

impl IfDirective {
    pub fn new() -> Self {
        Self
    }

    fn defined_guard(argument: &str, negate: bool) -> Result<Expr, ExprError> {
        match split_symbol(argument) {
            Some((name, "")) => {
                let guard = Expr::Defined(name.to_string());
                Ok(if negate {
                    Expr::Unary(UnaryOp::Not, Box::new(guard))
                } else {
                    guard
                })
            }
            Some((name, _)) => Err(ExprError::new("unexpected trailing input", name.len())),
            None => Err(ExprError::new("expected identifier", 0)),
        }
    }
}

impl DirectiveDescriptor for IfDirective {
    fn id(&self) -> &'static str {
        "if"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["if", "ifdef", "ifndef", "elif", "else", "endif"]
    }

    fn parse(&self, keyword: &str, argument: &str) -> Result<Action, ExprError> {
        match keyword {
            "if" => Ok(Action::Open { guard: expr::parse(argument)? }),
            "ifdef" => Ok(Action::Open { guard: Self::defined_guard(argument, false)? }),
            "ifndef" => Ok(Action::Open { guard: Self::defined_guard(argument, true)? }),
            "elif" => Ok(Action::Continue { guard: Some(expr::parse(argument)?) }),
            // anything after `#else` / `#endif` is treated as a trailing comment
            "else" => Ok(Action::Continue { guard: None }),
            "endif" => Ok(Action::Close),
            other => Err(ExprError::new(format!("unknown keyword `{other}`"), 0)),
        }
    }

    fn description(&self) -> &'static str {
        "Conditional blocks: #if, #ifdef, #ifndef, #elif, #else, #endif"
    }
}
