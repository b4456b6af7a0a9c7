pub mod conditional;
pub mod define;
pub mod message;

use crate::expr::{Expr, ExprError};
use eyre::Result;
use std::fmt;

/// How a directive participates in block structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Opens a block (`#if`)
    Open,
    /// Continues the innermost block (`#elif`, `#else`)
    Continue,
    /// Closes the innermost block (`#endif`)
    Close,
    /// Standalone directive that takes effect where it appears (`#define`)
    Statement,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Open => write!(f, "open"),
            Role::Continue => write!(f, "continue"),
            Role::Close => write!(f, "close"),
            Role::Statement => write!(f, "statement"),
        }
    }
}

/// Severity of a message directive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

/// What a statement directive does to the transform in progress
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Bind a symbol for the rest of the transform; `None` binds `true`
    Define { name: String, value: Option<Expr> },
    /// Shadow a symbol as undefined for the rest of the transform
    Undefine { name: String },
    /// Emit a message; `Error` aborts the transform
    Message { level: MessageLevel, text: String },
}

/// A parsed directive, ready for block resolution
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Open { guard: Expr },
    /// `guard` is `None` for a terminal `#else`
    Continue { guard: Option<Expr> },
    Close,
    Statement(Effect),
}

impl Action {
    pub fn role(&self) -> Role {
        match self {
            Action::Open { .. } => Role::Open,
            Action::Continue { .. } => Role::Continue,
            Action::Close => Role::Close,
            Action::Statement(_) => Role::Statement,
        }
    }
}

/// Trait implemented by every directive family
pub trait DirectiveDescriptor: Send + Sync {
    /// Unique family name, e.g. `if`
    fn id(&self) -> &'static str;

    /// Keywords this family recognizes after the `#`
    fn keywords(&self) -> &'static [&'static str];

    /// Turn a recognized keyword and the text after it into an action
    fn parse(&self, keyword: &str, argument: &str) -> Result<Action, ExprError>;

    /// Get a human-readable description of this directive family
    fn description(&self) -> &'static str {
        "No description available"
    }

    fn recognizes(&self, keyword: &str) -> bool {
        self.keywords().contains(&keyword)
    }
}

/// Ordered set of directive families; the first family recognizing a keyword wins
#[derive(Default)]
pub struct DirectiveRegistry {
    descriptors: Vec<Box<dyn DirectiveDescriptor>>,
}

impl DirectiveRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a directive family after all previously registered ones
    pub fn register(&mut self, descriptor: Box<dyn DirectiveDescriptor>) {
        self.descriptors.push(descriptor);
    }

    /// Get a family by ID
    pub fn get(&self, id: &str) -> Option<&dyn DirectiveDescriptor> {
        self.descriptors.iter().find(|d| d.id() == id).map(|d| d.as_ref())
    }

    /// Find the first registered family that recognizes `keyword`
    pub fn find(&self, keyword: &str) -> Option<&dyn DirectiveDescriptor> {
        self.descriptors.iter().find(|d| d.recognizes(keyword)).map(|d| d.as_ref())
    }

    /// Get all registered family IDs in registration order
    pub fn ids(&self) -> Vec<&'static str> {
        self.descriptors.iter().map(|d| d.id()).collect()
    }

    /// Get all registered families in registration order
    pub fn descriptors(&self) -> impl Iterator<Item = &dyn DirectiveDescriptor> {
        self.descriptors.iter().map(|d| d.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Look up a built-in family by name
    pub fn builtin(name: &str) -> Option<Box<dyn DirectiveDescriptor>> {
        match name {
            "if" => Some(Box::new(conditional::IfDirective::new())),
            "define" => Some(Box::new(define::DefineDirective::new())),
            "message" => Some(Box::new(message::MessageDirective::new())),
            _ => None,
        }
    }

    /// Names of all built-in families
    pub fn builtin_names() -> &'static [&'static str] {
        &["if", "define", "message"]
    }

    /// Build a registry from built-in family names, in the given order
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let mut registry = Self::new();
        for name in names {
            let name = name.as_ref();
            if registry.get(name).is_some() {
                continue;
            }
            let descriptor = Self::builtin(name).ok_or_else(|| {
                eyre::eyre!(
                    "Unknown directive family '{}' (available: {})",
                    name,
                    Self::builtin_names().join(", ")
                )
            })?;
            registry.register(descriptor);
        }
        Ok(registry)
    }

    /// Create a registry with all built-in families
    pub fn with_default_directives() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(conditional::IfDirective::new()));
        registry.register(Box::new(define::DefineDirective::new()));
        registry.register(Box::new(message::MessageDirective::new()));
        registry
    }
}

impl fmt::Debug for DirectiveRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectiveRegistry").field("descriptors", &self.ids()).finish()
    }
}

/// Split `NAME rest` into the symbol name and the trimmed remainder
pub(crate) fn split_symbol(argument: &str) -> Option<(&str, &str)> {
    let argument = argument.trim();
    let end = argument
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '.'))
        .unwrap_or(argument.len());
    let name = &argument[..end];
    let starts_ok = name.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$');
    if !starts_ok {
        return None;
    }
    Some((name, argument[end..].trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_with_defaults() {
        let registry = DirectiveRegistry::with_default_directives();
        assert_eq!(registry.ids(), vec!["if", "define", "message"]);
        assert_eq!(registry.find("elif").map(|d| d.id()), Some("if"));
        assert_eq!(registry.find("undef").map(|d| d.id()), Some("define"));
        assert_eq!(registry.find("warning").map(|d| d.id()), Some("message"));
        assert!(registry.find("include").is_none());
    }

    #[test]
    fn test_registry_first_match_wins() {
        struct Shadow;

        impl DirectiveDescriptor for Shadow {
            fn id(&self) -> &'static str {
                "shadow"
            }

            fn keywords(&self) -> &'static [&'static str] {
                &["if"]
            }

            fn parse(&self, _keyword: &str, _argument: &str) -> Result<Action, ExprError> {
                Ok(Action::Close)
            }
        }

        let mut registry = DirectiveRegistry::new();
        registry.register(Box::new(Shadow));
        registry.register(Box::new(conditional::IfDirective::new()));

        assert_eq!(registry.find("if").map(|d| d.id()), Some("shadow"));
        assert_eq!(registry.find("elif").map(|d| d.id()), Some("if"));
    }

    #[test]
    fn test_from_names() {
        let registry = DirectiveRegistry::from_names(&["define", "if", "if"]).unwrap();
        assert_eq!(registry.ids(), vec!["define", "if"]);

        let err = DirectiveRegistry::from_names(&["pragma"]).unwrap_err();
        assert!(err.to_string().contains("Unknown directive family 'pragma'"));
    }

    #[test]
    fn test_split_symbol() {
        assert_eq!(split_symbol(" DEV  true "), Some(("DEV", "true")));
        assert_eq!(split_symbol("LEVEL=3"), Some(("LEVEL", "=3")));
        assert_eq!(split_symbol("DEBUG"), Some(("DEBUG", "")));
        assert_eq!(split_symbol("3abc"), None);
        assert_eq!(split_symbol(""), None);
    }

    #[test]
    fn test_action_role() {
        assert_eq!(Action::Close.role(), Role::Close);
        assert_eq!(Action::Continue { guard: None }.role(), Role::Continue);
        assert_eq!(Role::Statement.to_string(), "statement");
    }
}
