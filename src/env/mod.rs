pub mod value;

use std::collections::HashMap;

pub use value::Value;

/// Anything guard expressions can resolve identifiers against
pub trait SymbolTable {
    /// Look up a symbol; absent symbols resolve to `Value::Undefined`
    fn lookup(&self, name: &str) -> Value;
}

/// Caller-owned symbol environment read by every transform
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    symbols: HashMap<String, Value>,
}

impl Environment {
    /// Create an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a symbol, replacing any previous value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.symbols.insert(name.into(), value.into());
    }

    /// Get a symbol's value if it has been set
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.symbols.get(name)
    }

    /// Remove a symbol, returning its previous value
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.symbols.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterate over all symbols in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.symbols.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Import variables from the host process; values are parsed with `Value::parse`
    pub fn extend_from_process(&mut self) {
        for (key, value) in std::env::vars() {
            self.symbols.insert(key, Value::parse(&value));
        }
    }
}

impl SymbolTable for Environment {
    fn lookup(&self, name: &str) -> Value {
        self.symbols.get(name).cloned().unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut env = Self::new();
        for (k, v) in iter {
            env.set(k, v);
        }
        env
    }
}

/// Per-transform symbol scope layered over a borrowed environment.
///
/// `#define`/`#undef` write here; the underlying environment is never touched.
#[derive(Debug)]
pub struct Scope<'a> {
    base: &'a Environment,
    local: HashMap<String, Value>,
}

impl<'a> Scope<'a> {
    pub fn new(base: &'a Environment) -> Self {
        Self {
            base,
            local: HashMap::new(),
        }
    }

    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.local.insert(name.into(), value);
    }

    /// Shadow a symbol as undefined for the rest of the transform
    pub fn undefine(&mut self, name: impl Into<String>) {
        self.local.insert(name.into(), Value::Undefined);
    }
}

impl SymbolTable for Scope<'_> {
    fn lookup(&self, name: &str) -> Value {
        match self.local.get(name) {
            Some(value) => value.clone(),
            None => self.base.lookup(name),
        }
    }
}
