//! State Store - screen-scoped named values with change notification.
//!
//! One store per screen. Keys are written by two-way bindings and event
//! handlers, read by the expression evaluator and the binding renderer.
//! Reads of never-written keys fall back to a documented per-type default
//! (`0` / `false` / `""`).
//!
//! Change notification is a frame-granular version stamp: every write that
//! actually changes a value bumps it, so a caller can compare stamps across
//! a frame to learn whether anything moved.

use std::collections::HashMap;

use crate::types::Value;

/// Mapping from state key to tagged value, owned by one screen.
#[derive(Debug, Default)]
pub struct StateStore {
    values: HashMap<String, Value>,
    version: u64,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strict read: `None` for keys that were never written.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Read a number, defaulting to `0` for missing keys.
    ///
    /// Non-number values also read as `0`; the evaluator reports those as
    /// type mismatches where the distinction matters.
    pub fn number(&self, key: &str) -> f64 {
        match self.values.get(key) {
            Some(Value::Number(n)) => *n,
            _ => 0.0,
        }
    }

    /// Read a boolean, defaulting to `false` for missing keys.
    pub fn boolean(&self, key: &str) -> bool {
        match self.values.get(key) {
            Some(Value::Bool(b)) => *b,
            _ => false,
        }
    }

    /// Read a string, defaulting to `""` for missing keys.
    pub fn text(&self, key: &str) -> &str {
        match self.values.get(key) {
            Some(Value::Str(s)) => s,
            _ => "",
        }
    }

    /// Write a value. Returns whether the stored value actually changed.
    ///
    /// Unchanged writes do not bump the version stamp, so a handler that
    /// re-asserts the current value is not observed as a change.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        let key = key.into();
        let value = value.into();
        if self.values.get(&key) == Some(&value) {
            return false;
        }
        self.values.insert(key, value);
        self.version += 1;
        true
    }

    /// Current change stamp. Monotonically increasing per changing write.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of keys that have been written at least once.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
