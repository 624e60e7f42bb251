//! Worker registry - maps logical worker names to task handlers.
//!
//! Workers are external collaborators (research, script, render, validate
//! functions) registered once at startup. Re-registering a name replaces the
//! prior handler.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::domain::Message;
use crate::error::Result;

/// A handler capable of consuming a task payload and producing a result.
///
/// Implementations must be stateless with respect to the bus: the processing
/// loop invokes one handler at a time, but a handler body may run its own
/// internal concurrency.
#[async_trait]
pub trait Worker: Send + Sync {
    /// Execute the task carried by a message and return the result payload.
    async fn handle(&self, message: &Message) -> Result<Value>;
}

/// Adapter turning an async closure into a Worker. Mostly useful in tests and
/// for one-off endpoints that don't warrant a named type.
pub struct FnWorker {
    handler: Box<dyn Fn(Message) -> BoxFuture<'static, Result<Value>> + Send + Sync>,
}

impl FnWorker {
    /// Wrap a closure returning a boxed future.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(Message) -> BoxFuture<'static, Result<Value>> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
        }
    }
}

#[async_trait]
impl Worker for FnWorker {
    async fn handle(&self, message: &Message) -> Result<Value> {
        (self.handler)(message.clone()).await
    }
}

/// Name -> handler map shared between senders and the processing loop.
#[derive(Default)]
pub struct WorkerRegistry {
    handlers: RwLock<HashMap<String, Arc<dyn Worker>>>,
}

impl WorkerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a name to a handler, replacing any prior binding
    pub fn register(&self, name: impl Into<String>, worker: Arc<dyn Worker>) {
        let name = name.into();
        let replaced = self.handlers.write().unwrap().insert(name.clone(), worker);
        if replaced.is_some() {
            tracing::info!(worker = %name, "Replaced registered worker");
        } else {
            tracing::info!(worker = %name, "Registered worker");
        }
    }

    /// Look up the handler bound to a name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Worker>> {
        self.handlers.read().unwrap().get(name).cloned()
    }

    /// Check whether a name has a handler bound
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.read().unwrap().contains_key(name)
    }

    /// All registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.read().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered workers
    pub fn len(&self) -> usize {
        self.handlers.read().unwrap().len()
    }

    /// True if no workers are registered
    pub fn is_empty(&self) -> bool {
        self.handlers.read().unwrap().is_empty()
    }
}
