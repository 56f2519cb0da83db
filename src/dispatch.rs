//! Method dispatcher: the RPC surface gitbuf exposes to the host.
//!
//! The host invokes the plugin with a string method name and positional
//! JSON arguments; the dispatcher routes the call to the registered handler
//! and serializes the return value back. Features register their methods at
//! startup via [`register_all`] (or individually for embedders that only
//! want a subset).

use crate::error::{GitbufError, Result};
use crate::host::Host;
use serde_json::Value;
use std::collections::HashMap;

/// A registered method handler.
pub type Handler = Box<dyn Fn(&dyn Host, &[Value]) -> Result<Value> + Send + Sync>;

/// Registry mapping method names to handlers.
#[derive(Default)]
pub struct Dispatcher {
    handlers: HashMap<String, Handler>,
}

impl Dispatcher {
    /// Create an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under a method name.
    ///
    /// Registering the same name twice replaces the previous handler.
    pub fn register<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&dyn Host, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.handlers.insert(name.into(), Box::new(handler));
    }

    /// Invoke a method by name with positional arguments.
    pub fn dispatch(&self, host: &dyn Host, method: &str, args: &[Value]) -> Result<Value> {
        let handler = self.handlers.get(method).ok_or_else(|| {
            GitbufError::Validation(format!("unknown method '{}'", method))
        })?;
        handler(host, args)
    }

    /// Names of all registered methods, sorted.
    pub fn methods(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Register every feature shipped with the crate.
pub fn register_all(dispatcher: &mut Dispatcher) {
    crate::component::worktree::register(dispatcher);
    crate::branch::register(dispatcher);
}
