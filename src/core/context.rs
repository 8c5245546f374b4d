//! Pipeline context - state shared by the actions of one run

use crate::action::ActionError;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

/// A typed handle to one context entry
///
/// The producer and the consumer of a value share the same key constant, so
/// the value type is fixed at compile time and lookups never need a cast at
/// the call site.
pub struct ContextKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ContextKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for ContextKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ContextKey<T> {}

impl<T> fmt::Debug for ContextKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContextKey").field(&self.name).finish()
    }
}

impl<T> fmt::Display for ContextKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Execution context for a single pipeline run
///
/// Created fresh for every run and dropped when the run ends. Besides the
/// values handed from one action to the next, it records which pipelines are
/// currently running on this call path so that sub-pipeline invocation can
/// refuse to re-enter one of them.
#[derive(Default)]
pub struct Context {
    values: HashMap<&'static str, Box<dyn Any + Send + Sync>>,
    chain: Vec<String>,
}

impl Context {
    /// Create an empty context that is not attached to any pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the root context of a top-level pipeline run
    pub fn for_pipeline(name: &str) -> Self {
        Self {
            values: HashMap::new(),
            chain: vec![name.to_string()],
        }
    }

    /// Create the context of a sub-pipeline run started from `parent`
    ///
    /// No values are inherited. Fails if `name` is already running further up
    /// the chain.
    pub fn nested(parent: &Context, name: &str) -> Result<Self, ActionError> {
        if parent.chain.iter().any(|running| running == name) {
            let mut chain = parent.chain.clone();
            chain.push(name.to_string());
            return Err(ActionError::CycleDetected { chain });
        }

        let mut chain = parent.chain.clone();
        chain.push(name.to_string());
        Ok(Self {
            values: HashMap::new(),
            chain,
        })
    }

    /// Store a value, replacing any previous value under the same key
    pub fn store_value<T: Any + Send + Sync>(&mut self, key: &ContextKey<T>, value: T) {
        self.values.insert(key.name, Box::new(value));
    }

    /// Get a value, or `None` if nothing was stored under the key
    pub fn get_value<T: Any + Send + Sync>(&self, key: &ContextKey<T>) -> Option<&T> {
        self.values.get(key.name).and_then(|value| value.downcast_ref::<T>())
    }

    pub fn contains<T: Any + Send + Sync>(&self, key: &ContextKey<T>) -> bool {
        self.get_value(key).is_some()
    }

    /// Names of the pipelines running on this call path, outermost first
    pub fn chain(&self) -> &[String] {
        &self.chain
    }

    pub fn current_pipeline(&self) -> Option<&str> {
        self.chain.last().map(String::as_str)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.values.keys().collect();
        keys.sort();
        f.debug_struct("Context")
            .field("keys", &keys)
            .field("chain", &self.chain)
            .finish()
    }
}
