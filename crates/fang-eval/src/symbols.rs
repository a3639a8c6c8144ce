//! Lexically scoped symbol table.

use std::collections::BTreeMap;

use crate::callable::CallableOverloader;
use crate::value::Value;

/// A single scope level.
#[derive(Debug, Clone, Default)]
struct Scope {
    bindings: BTreeMap<String, Value>,
}

/// Stack of scopes; index 0 is the global scope and is never popped.
///
/// Lookups search from the innermost scope outward. [`SymbolTable::add`]
/// merges functions bound under an existing function name in the same
/// scope into an overload set instead of replacing them.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
        tracing::trace!(depth = self.scopes.len(), "push scope");
    }

    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
        tracing::trace!(depth = self.scopes.len(), "pop scope");
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Drop every scope above `depth`, keeping at least the global scope.
    pub fn truncate(&mut self, depth: usize) {
        self.scopes.truncate(depth.max(1));
    }

    /// Bind in the current scope, overload-merging functions.
    pub fn add(&mut self, name: &str, value: Value) {
        let index = self.scopes.len() - 1;
        self.add_in(index, name, value);
    }

    /// Bind in the global scope, overload-merging functions.
    pub fn add_global(&mut self, name: &str, value: Value) {
        self.add_in(0, name, value);
    }

    fn add_in(&mut self, index: usize, name: &str, value: Value) {
        let Some(scope) = self.scopes.get_mut(index) else {
            return;
        };
        let merged = match scope.bindings.get(name) {
            Some(existing) if existing.is_callable() && value.is_callable() => {
                let overloader: CallableOverloader = [existing.clone(), value].into_iter().collect();
                tracing::trace!(name, overloads = overloader.len(), "merge overload");
                Value::new_const(overloader)
            }
            _ => value,
        };
        scope.bindings.insert(name.to_string(), merged);
    }

    /// Bind in the current scope, replacing any binding of the same name.
    pub fn define(&mut self, name: &str, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.bindings.insert(name.to_string(), value);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.bindings.get(name))
    }

    pub fn lookup_current_scope(&self, name: &str) -> Option<&Value> {
        self.scopes.last()?.bindings.get(name)
    }

    pub fn lookup_global(&self, name: &str) -> Option<&Value> {
        self.scopes.first()?.bindings.get(name)
    }

    /// Every binding of `name`, innermost first.
    pub fn get_all_matches(&self, name: &str) -> Vec<Value> {
        self.scopes
            .iter()
            .rev()
            .filter_map(|scope| scope.bindings.get(name).cloned())
            .collect()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// The nearest binding of `name`, created as void in the current scope
    /// when absent.
    pub fn entry(&mut self, name: &str) -> &mut Value {
        let index = self
            .scopes
            .iter()
            .rposition(|scope| scope.bindings.contains_key(name))
            .unwrap_or(self.scopes.len() - 1);
        self.scopes[index].bindings.entry(name.to_string()).or_default()
    }

    /// Global binding of `name`, created as void when absent.
    pub fn global_entry(&mut self, name: &str) -> &mut Value {
        self.scopes[0].bindings.entry(name.to_string()).or_default()
    }

    /// Rebind `name` in the first scope that defines it, or bind it in the
    /// global scope. Returns whether an existing binding was replaced.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(slot) = scope.bindings.get_mut(name) {
                *slot = value;
                return true;
            }
        }
        self.scopes[0].bindings.insert(name.to_string(), value);
        false
    }

    /// Names bound in the global scope.
    pub fn global_names(&self) -> impl Iterator<Item = &str> {
        self.scopes[0].bindings.keys().map(String::as_str)
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
