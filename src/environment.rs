use compact_str::{CompactString, ToCompactString};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::value::Value;

/// A scoped name-to-value mapping with an optional enclosing environment.
///
/// The handle is cheap to clone and every clone aliases the same scope, so
/// a closure observes later writes to its captured environment. `get` walks
/// the chain outward; `set` writes the local scope only.
#[derive(Debug, Clone)]
pub struct Environment {
    inner: Arc<Mutex<EnvironmentImpl>>,
}

#[derive(Debug)]
struct EnvironmentImpl {
    store: HashMap<CompactString, Value>,
    outer: Option<Environment>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(EnvironmentImpl {
                store: HashMap::new(),
                outer: None,
            })),
        }
    }

    /// A fresh scope enclosed over this one.
    pub fn new_scope(&self) -> Self {
        Self {
            inner: Arc::new(Mutex::new(EnvironmentImpl {
                store: HashMap::new(),
                outer: Some(self.clone()),
            })),
        }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        let inner = self.inner.lock().unwrap();
        if let Some(value) = inner.store.get(name) {
            Some(value.clone())
        } else if let Some(outer) = &inner.outer {
            outer.get(name)
        } else {
            None
        }
    }

    pub fn set(&self, name: &str, value: Value) {
        let mut inner = self.inner.lock().unwrap();
        inner.store.insert(name.to_compact_string(), value);
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
