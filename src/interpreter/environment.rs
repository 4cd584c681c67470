use crate::interpreter::value::Value;

use std::collections::{BTreeMap, HashMap};

/// Values supplied by the caller, visible to every fragment as `context`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    values: BTreeMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Context::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut context = Context::new();
        for (key, value) in iter {
            context.insert(key, value);
        }
        context
    }
}

impl From<Context> for Value {
    fn from(context: Context) -> Self {
        Value::Object(context.values)
    }
}

/// The scope chain threaded through one template run. The bottom frame
/// holds globals and `context`; fragments and blocks push frames on top.
#[derive(Debug, Clone)]
pub struct Environment {
    frames: Vec<HashMap<String, Value>>,
    // active lambda calls
    calls: usize,
}

impl Environment {
    pub fn new(globals: HashMap<String, Value>) -> Self {
        Environment {
            frames: vec![globals],
            calls: 0,
        }
    }

    pub fn push_scope(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// The global frame is never popped.
    pub fn pop_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Run `f` inside a fresh frame, popped again whatever `f` returns.
    pub fn scoped<T, E>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E> {
        self.push_scope();
        let result = f(self);
        self.pop_scope();
        result
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Number of function calls currently running.
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Like [`Environment::scoped`], counted as one active call.
    pub fn call_frame<T, E>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E> {
        self.calls += 1;
        let result = self.scoped(f);
        self.calls -= 1;
        result
    }

    /// Bind in the innermost frame, shadowing outer bindings.
    pub fn declare(&mut self, name: impl Into<String>, value: Value) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.into(), value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.frames
            .iter_mut()
            .rev()
            .find_map(|frame| frame.get_mut(name))
    }
}
