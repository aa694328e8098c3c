//! Environment for variable bindings

use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared reference to an environment
///
/// Closures hold one of these, which keeps their defining scope alive after
/// the block that created it has finished.
pub type EnvRef = Rc<RefCell<Environment>>;

/// One scope: its own bindings plus a link to the enclosing scope
#[derive(Debug, Default)]
pub struct Environment {
    bindings: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    /// Create a new global environment
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment { bindings: HashMap::new(), enclosing: Some(enclosing) }
    }

    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    /// Define (or redefine) a variable in this scope
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Look up a variable, walking outward through enclosing scopes
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.bindings.get(name) {
            Some(value) => Some(value.clone()),
            None => self.enclosing.as_ref().and_then(|env| env.borrow().get(name)),
        }
    }

    /// Update an existing variable in the nearest scope that declares it.
    ///
    /// Returns `false` when no scope declares `name`; nothing is defined then.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        if let Some(slot) = self.bindings.get_mut(name) {
            *slot = value;
            true
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            false
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name) || self.enclosing.as_ref().is_some_and(|env| env.borrow().contains(name))
    }
}

/// Create a child environment from a parent reference
pub fn child_env(parent: &EnvRef) -> EnvRef {
    Environment::with_enclosing(Rc::clone(parent)).into_ref()
}
